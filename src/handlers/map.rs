use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::cluster::{ClusterNode, LatLngBounds};
use crate::map::{plan_cluster_click, ClickPlan, ZOOM_LADDER};
use crate::models::ResolvedPoint;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ClustersQuery {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    /// Current integer zoom of the viewport.
    pub zoom: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClustersResponse {
    /// False while no dataset load has completed yet; clients render
    /// nothing (or a placeholder) instead of failing.
    pub ready: bool,
    pub generation: Option<u64>,
    pub clusters: Vec<ClusterNode>,
}

#[utoipa::path(
    get,
    path = "/map/clusters",
    tag = "map",
    params(ClustersQuery),
    responses(
        (status = 200, description = "Draw list for the viewport", body = ClustersResponse)
    )
)]
pub async fn get_clusters(
    State(state): State<AppState>,
    Query(query): Query<ClustersQuery>,
) -> Json<ClustersResponse> {
    let Some(snapshot) = state.map.snapshot() else {
        return Json(ClustersResponse {
            ready: false,
            generation: None,
            clusters: Vec::new(),
        });
    };

    let bounds = LatLngBounds {
        west: query.west,
        south: query.south,
        east: query.east,
        north: query.north,
    };

    Json(ClustersResponse {
        ready: true,
        generation: Some(snapshot.generation),
        clusters: snapshot.index.get_clusters(bounds, query.zoom),
    })
}

#[utoipa::path(
    get,
    path = "/map/clusters/{id}/children",
    tag = "map",
    params(("id" = u64, Path, description = "Cluster id")),
    responses(
        (status = 200, description = "Direct contents, one level down; empty for a stale id", body = Vec<ClusterNode>)
    )
)]
pub async fn get_cluster_children(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Json<Vec<ClusterNode>> {
    let children = state
        .map
        .snapshot()
        .and_then(|snapshot| snapshot.index.children(id))
        .unwrap_or_default();
    Json(children)
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ClickQuery {
    /// Zoom the map was at when the cluster was clicked.
    pub zoom: f64,
}

/// What the client should do in response to a cluster click.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClickResponse {
    /// Animate to the cluster center at this zoom.
    Zoom {
        latitude: f64,
        longitude: f64,
        zoom: f64,
    },
    /// Further zoom would not separate the points; show the members.
    List { members: Vec<ResolvedPoint> },
    /// Stale cluster id or no dataset; do nothing.
    Noop,
}

#[utoipa::path(
    get,
    path = "/map/clusters/{id}/click",
    tag = "map",
    params(("id" = u64, Path, description = "Cluster id"), ClickQuery),
    responses(
        (status = 200, description = "Navigation plan for the click", body = ClickResponse)
    )
)]
pub async fn click_cluster(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<ClickQuery>,
) -> Json<ClickResponse> {
    let Some(snapshot) = state.map.snapshot() else {
        return Json(ClickResponse::Noop);
    };
    let Some(expansion_zoom) = snapshot.index.expansion_zoom(id) else {
        // Index rebuilt since the client drew this cluster.
        return Json(ClickResponse::Noop);
    };

    let plan = plan_cluster_click(
        query.zoom,
        expansion_zoom as f64,
        state.config.map_max_zoom,
        &ZOOM_LADDER,
    );

    let response = match plan {
        ClickPlan::ZoomTo { zoom } => match snapshot.index.cluster_center(id) {
            Some((latitude, longitude)) => ClickResponse::Zoom {
                latitude,
                longitude,
                zoom,
            },
            None => ClickResponse::Noop,
        },
        ClickPlan::OpenList => match snapshot.index.leaves(id) {
            Some(members) => ClickResponse::List { members },
            None => ClickResponse::Noop,
        },
    };

    Json(response)
}
