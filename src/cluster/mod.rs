pub mod index;

pub use index::{ClusterConfig, ClusterIndex, ClusterNode, LatLngBounds};
