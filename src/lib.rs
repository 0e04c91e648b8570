pub mod cluster;
pub mod error;
pub mod handlers;
pub mod map;
pub mod models;
pub mod resolve;
pub mod state;
pub mod store;
pub mod utils;

// Re-export commonly used items (avoiding ambiguous re-exports)
pub use cluster::{ClusterConfig, ClusterIndex, ClusterNode, LatLngBounds};
pub use error::AppError;
pub use map::{MapController, MapView, NavState, TileLayerConfig, ZOOM_LADDER};
pub use models::{
    Alumnus, CreateCuratedLocation, CuratedLocation, LocationSource, ResolvedLocation,
    ResolvedPoint, UnmappedGroup, UnmappedStudent,
};
pub use resolve::{
    build_resolution_context, build_unmapped_groups, resolve_points, resolve_to_location,
    should_count_as_unmapped, GeocodedName, Geocoder, HttpGeocoder, NoopGeocoder,
    ResolutionContext,
};
pub use state::{load_from_records, reload_dataset, AppConfig, AppState, MapSnapshot, MapState};
pub use utils::{is_non_college, is_valid_coordinate, normalize_institution};
