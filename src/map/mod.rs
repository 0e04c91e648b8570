pub mod controller;
pub mod navigation;
pub mod viewport;

pub use controller::{MapController, NavState, FLY_DURATION, REDRAW_DEBOUNCE};
pub use navigation::{plan_cluster_click, ClickPlan, ZOOM_LADDER};
pub use viewport::{MapView, TileLayerConfig};
