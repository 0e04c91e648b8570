//! Spatial cluster index over the resolved alumni points.
//!
//! Greedy radius clustering in web-mercator space, one level per integer
//! zoom: points are clustered at the configured max zoom first, then each
//! level's output feeds the next zoom out. Every level is backed by an
//! `rstar` R-tree for the viewport range queries. The index is rebuilt from
//! scratch whenever the point set changes and is never mutated in place.

use std::collections::HashSet;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicU32, Ordering};

use rstar::{primitives::GeomWithData, RTree, AABB};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ResolvedPoint;

/// Clustering knobs.
#[derive(Debug, Clone, Copy)]
pub struct ClusterConfig {
    /// Cluster radius in pixels at tile extent.
    pub radius_px: f64,
    /// Tile extent in pixels.
    pub extent: f64,
    /// Zoom past which points are never merged.
    pub max_zoom: u8,
    /// Minimum combined point count to form a cluster.
    pub min_points: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            radius_px: 60.0,
            extent: 256.0,
            max_zoom: 16,
            min_points: 2,
        }
    }
}

/// Geographic bounding box of the current viewport.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct LatLngBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// One entry of the draw list: an individual alumnus marker or a cluster.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClusterNode {
    Point {
        alumnus_id: Uuid,
        latitude: f64,
        longitude: f64,
    },
    Cluster {
        cluster_id: u64,
        latitude: f64,
        longitude: f64,
        point_count: usize,
        /// Zoom at which this cluster first splits.
        expansion_zoom: u8,
    },
}

enum NodeKind {
    Leaf(ResolvedPoint),
    Cluster { children: Vec<usize> },
}

struct Node {
    x: f64,
    y: f64,
    count: usize,
    /// Zoom level this node first appears at (leaves: base zoom).
    zoom: u8,
    kind: NodeKind,
}

/// Each rebuild gets a fresh epoch so cluster ids handed to a client before
/// a rebuild can never alias a node in the new index.
static EPOCH: AtomicU32 = AtomicU32::new(1);

pub struct ClusterIndex {
    epoch: u32,
    config: ClusterConfig,
    nodes: Vec<Node>,
    /// `levels[z]` holds the node ids visible at zoom `z`;
    /// `levels[max_zoom + 1]` is the unclustered base level.
    levels: Vec<RTree<GeomWithData<[f64; 2], usize>>>,
}

impl ClusterIndex {
    pub fn build(points: &[ResolvedPoint], config: ClusterConfig) -> Self {
        let epoch = EPOCH.fetch_add(1, Ordering::Relaxed);
        let base_zoom = config.max_zoom + 1;

        let mut nodes: Vec<Node> = points
            .iter()
            .map(|p| Node {
                x: lng_x(p.longitude),
                y: lat_y(p.latitude),
                count: 1,
                zoom: base_zoom,
                kind: NodeKind::Leaf(p.clone()),
            })
            .collect();

        let mut levels: Vec<RTree<GeomWithData<[f64; 2], usize>>> =
            (0..=base_zoom as usize).map(|_| RTree::new()).collect();

        let mut current: Vec<usize> = (0..nodes.len()).collect();
        levels[base_zoom as usize] = level_tree(&nodes, &current);

        for z in (0..=config.max_zoom).rev() {
            current = cluster_level(&mut nodes, &current, z, &config);
            levels[z as usize] = level_tree(&nodes, &current);
        }

        Self {
            epoch,
            config,
            nodes,
            levels,
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Nodes intersecting the viewport at the given zoom. Zoom is clamped to
    /// the base level; a box crossing the antimeridian is split in two.
    pub fn get_clusters(&self, bounds: LatLngBounds, zoom: f64) -> Vec<ClusterNode> {
        let z = (zoom.floor().max(0.0) as u8).min(self.config.max_zoom + 1);
        let tree = &self.levels[z as usize];

        let y_min = lat_y(bounds.north);
        let y_max = lat_y(bounds.south);
        let x_west = lng_x(bounds.west);
        let x_east = lng_x(bounds.east);

        let envelopes = if x_west <= x_east {
            vec![AABB::from_corners([x_west, y_min], [x_east, y_max])]
        } else {
            vec![
                AABB::from_corners([x_west, y_min], [1.0, y_max]),
                AABB::from_corners([0.0, y_min], [x_east, y_max]),
            ]
        };

        let mut out = Vec::new();
        for envelope in envelopes {
            for entry in tree.locate_in_envelope(&envelope) {
                out.push(self.to_cluster_node(entry.data));
            }
        }
        out
    }

    /// Zoom at which the cluster first splits. `None` for stale or unknown
    /// ids and for leaf nodes.
    pub fn expansion_zoom(&self, cluster_id: u64) -> Option<u8> {
        let node = self.cluster(cluster_id)?;
        Some(node.zoom + 1)
    }

    /// Geographic center of a cluster, for the click-to-zoom animation.
    pub fn cluster_center(&self, cluster_id: u64) -> Option<(f64, f64)> {
        let node = self.cluster(cluster_id)?;
        Some((y_lat(node.y), x_lng(node.x)))
    }

    /// Direct contents of a cluster, one level down.
    pub fn children(&self, cluster_id: u64) -> Option<Vec<ClusterNode>> {
        let node = self.cluster(cluster_id)?;
        match &node.kind {
            NodeKind::Cluster { children } => {
                Some(children.iter().map(|&c| self.to_cluster_node(c)).collect())
            }
            NodeKind::Leaf(_) => None,
        }
    }

    /// Every individual point inside a cluster, however deep. Used by the
    /// list view so coincident points all show up.
    pub fn leaves(&self, cluster_id: u64) -> Option<Vec<ResolvedPoint>> {
        self.cluster(cluster_id)?;
        let (_, idx) = decode_id(cluster_id);
        let mut out = Vec::new();
        self.collect_leaves(idx, &mut out);
        Some(out)
    }

    fn collect_leaves(&self, idx: usize, out: &mut Vec<ResolvedPoint>) {
        match &self.nodes[idx].kind {
            NodeKind::Leaf(point) => out.push(point.clone()),
            NodeKind::Cluster { children } => {
                for &child in children {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    /// Resolve a public cluster id to its node, rejecting ids minted by a
    /// previous build.
    fn cluster(&self, cluster_id: u64) -> Option<&Node> {
        let (epoch, idx) = decode_id(cluster_id);
        if epoch != self.epoch {
            return None;
        }
        let node = self.nodes.get(idx)?;
        match node.kind {
            NodeKind::Cluster { .. } => Some(node),
            NodeKind::Leaf(_) => None,
        }
    }

    fn to_cluster_node(&self, idx: usize) -> ClusterNode {
        let node = &self.nodes[idx];
        match &node.kind {
            NodeKind::Leaf(point) => ClusterNode::Point {
                alumnus_id: point.alumnus_id,
                latitude: point.latitude,
                longitude: point.longitude,
            },
            NodeKind::Cluster { .. } => ClusterNode::Cluster {
                cluster_id: encode_id(self.epoch, idx),
                latitude: y_lat(node.y),
                longitude: x_lng(node.x),
                point_count: node.count,
                expansion_zoom: node.zoom + 1,
            },
        }
    }
}

/// Cluster one level's nodes at zoom `z`, returning the node ids visible at
/// that zoom. Unmerged nodes carry over as-is.
fn cluster_level(
    nodes: &mut Vec<Node>,
    current: &[usize],
    z: u8,
    config: &ClusterConfig,
) -> Vec<usize> {
    let radius = config.radius_px / (config.extent * f64::powi(2.0, z as i32));
    let r2 = radius * radius;

    let tree = level_tree(nodes, current);
    let mut visited: HashSet<usize> = HashSet::with_capacity(current.len());
    let mut next = Vec::with_capacity(current.len());

    for &id in current {
        if visited.contains(&id) {
            continue;
        }
        visited.insert(id);

        let neighbors: Vec<usize> = tree
            .locate_within_distance([nodes[id].x, nodes[id].y], r2)
            .map(|entry| entry.data)
            .filter(|nid| *nid != id && !visited.contains(nid))
            .collect();

        let total: usize = nodes[id].count + neighbors.iter().map(|&n| nodes[n].count).sum::<usize>();

        if neighbors.is_empty() || total < config.min_points {
            next.push(id);
            continue;
        }

        let mut children = vec![id];
        children.extend(neighbors.iter().copied());
        for &n in &neighbors {
            visited.insert(n);
        }

        // Count-weighted centroid.
        let (mut wx, mut wy) = (0.0, 0.0);
        for &c in &children {
            wx += nodes[c].x * nodes[c].count as f64;
            wy += nodes[c].y * nodes[c].count as f64;
        }

        let new_id = nodes.len();
        nodes.push(Node {
            x: wx / total as f64,
            y: wy / total as f64,
            count: total,
            zoom: z,
            kind: NodeKind::Cluster { children },
        });
        next.push(new_id);
    }

    next
}

fn level_tree(nodes: &[Node], ids: &[usize]) -> RTree<GeomWithData<[f64; 2], usize>> {
    RTree::bulk_load(
        ids.iter()
            .map(|&id| GeomWithData::new([nodes[id].x, nodes[id].y], id))
            .collect(),
    )
}

fn encode_id(epoch: u32, idx: usize) -> u64 {
    ((epoch as u64) << 32) | idx as u64
}

fn decode_id(id: u64) -> (u32, usize) {
    ((id >> 32) as u32, (id & 0xffff_ffff) as usize)
}

// Spherical-mercator projection onto the unit square.

fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

fn lat_y(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocationSource;

    fn point(lat: f64, lon: f64) -> ResolvedPoint {
        ResolvedPoint {
            alumnus_id: Uuid::new_v4(),
            latitude: lat,
            longitude: lon,
            source: LocationSource::Curated,
        }
    }

    fn world() -> LatLngBounds {
        LatLngBounds {
            west: -180.0,
            south: -85.0,
            east: 180.0,
            north: 85.0,
        }
    }

    fn first_cluster(nodes: &[ClusterNode]) -> Option<(u64, usize)> {
        nodes.iter().find_map(|n| match n {
            ClusterNode::Cluster {
                cluster_id,
                point_count,
                ..
            } => Some((*cluster_id, *point_count)),
            _ => None,
        })
    }

    #[test]
    fn nearby_points_merge_at_low_zoom() {
        let points = vec![
            point(42.36, -71.06),
            point(42.37, -71.07),
            point(42.35, -71.05),
        ];
        let index = ClusterIndex::build(&points, ClusterConfig::default());

        let nodes = index.get_clusters(world(), 3.0);
        assert_eq!(nodes.len(), 1);
        let (_, count) = first_cluster(&nodes).expect("expected a cluster");
        assert_eq!(count, 3);
    }

    #[test]
    fn distant_points_stay_separate() {
        let points = vec![point(42.36, -71.06), point(34.05, -118.24)];
        let index = ClusterIndex::build(&points, ClusterConfig::default());

        let nodes = index.get_clusters(world(), 10.0);
        assert_eq!(nodes.len(), 2);
        assert!(first_cluster(&nodes).is_none());
    }

    #[test]
    fn projection_round_trips() {
        for (lat, lon) in [(0.0, 0.0), (42.36, -71.06), (-33.87, 151.21)] {
            assert!((y_lat(lat_y(lat)) - lat).abs() < 1e-9);
            assert!((x_lng(lng_x(lon)) - lon).abs() < 1e-9);
        }
    }

    #[test]
    fn viewport_filtering_excludes_out_of_view_points() {
        let points = vec![point(42.36, -71.06), point(34.05, -118.24)];
        let index = ClusterIndex::build(&points, ClusterConfig::default());

        let boston_only = LatLngBounds {
            west: -72.0,
            south: 41.0,
            east: -70.0,
            north: 43.0,
        };
        let nodes = index.get_clusters(boston_only, 10.0);
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn antimeridian_crossing_bounds_query_both_sides() {
        let points = vec![point(-36.85, 174.76), point(21.31, -157.86)];
        let index = ClusterIndex::build(&points, ClusterConfig::default());

        let pacific = LatLngBounds {
            west: 150.0,
            south: -50.0,
            east: -140.0,
            north: 40.0,
        };
        let nodes = index.get_clusters(pacific, 6.0);
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn coincident_points_cluster_even_at_max_zoom() {
        let points = vec![point(42.36, -71.06), point(42.36, -71.06)];
        let config = ClusterConfig::default();
        let index = ClusterIndex::build(&points, config);

        let nodes = index.get_clusters(world(), config.max_zoom as f64);
        let (id, count) = first_cluster(&nodes).expect("coincident points must cluster");
        assert_eq!(count, 2);

        // The cluster only comes apart past the max clustering zoom.
        assert_eq!(index.expansion_zoom(id), Some(config.max_zoom + 1));

        // Past max zoom the base level renders the raw points.
        let base = index.get_clusters(world(), (config.max_zoom + 1) as f64);
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn children_are_one_level_down_and_leaves_are_complete() {
        let points = vec![
            point(42.36, -71.06),
            point(42.36, -71.06),
            point(42.37, -71.07),
        ];
        let index = ClusterIndex::build(&points, ClusterConfig::default());

        let nodes = index.get_clusters(world(), 2.0);
        let (id, count) = first_cluster(&nodes).expect("expected a cluster");
        assert_eq!(count, 3);

        let children = index.children(id).expect("cluster has children");
        assert!(!children.is_empty());

        let leaves = index.leaves(id).expect("cluster has leaves");
        assert_eq!(leaves.len(), 3);
    }

    #[test]
    fn stale_ids_from_a_previous_build_are_rejected() {
        let points = vec![point(42.36, -71.06), point(42.36, -71.06)];
        let old = ClusterIndex::build(&points, ClusterConfig::default());
        let nodes = old.get_clusters(world(), 4.0);
        let (stale_id, _) = first_cluster(&nodes).unwrap();

        let rebuilt = ClusterIndex::build(&points, ClusterConfig::default());
        assert!(rebuilt.expansion_zoom(stale_id).is_none());
        assert!(rebuilt.children(stale_id).is_none());
        assert!(rebuilt.leaves(stale_id).is_none());
    }

    #[test]
    fn empty_point_set_builds_an_empty_index() {
        let index = ClusterIndex::build(&[], ClusterConfig::default());
        assert!(index.get_clusters(world(), 5.0).is_empty());
    }
}
