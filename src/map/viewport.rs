//! The map-view seam.
//!
//! The core never talks to a concrete map widget; it sees this trait. The
//! server-rendered page drives a Leaflet map through the JSON API instead,
//! so the trait's implementors live in embedded frontends and tests.

use std::time::Duration;

use crate::cluster::LatLngBounds;

/// Minimal surface of an interactive map widget.
pub trait MapView: Send + Sync {
    fn bounds(&self) -> LatLngBounds;
    fn zoom(&self) -> f64;
    fn max_zoom(&self) -> f64;
    /// Animate to `(lat, lon)` at `zoom` over `duration`.
    fn fly_to(&self, center: (f64, f64), zoom: f64, duration: Duration);
}

/// Tile-provider settings handed to whatever renders the base map.
#[derive(Debug, Clone)]
pub struct TileLayerConfig {
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileLayerConfig {
    fn default() -> Self {
        Self {
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
        }
    }
}
