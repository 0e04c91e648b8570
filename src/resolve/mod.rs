pub mod context;
pub mod geocoder;
pub mod resolver;
pub mod unmapped;

pub use context::{build_resolution_context, ResolutionContext};
pub use geocoder::{GeocodedName, Geocoder, HttpGeocoder, NoopGeocoder};
pub use resolver::{resolve_points, resolve_to_location};
pub use unmapped::{build_unmapped_groups, should_count_as_unmapped};
