use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::{reload_dataset, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct ReloadResponse {
    pub generation: u64,
}

/// Explicit rebuild entry point: refetch the roster and curated table,
/// geocode whatever is new, and swap in a fresh cluster index.
#[utoipa::path(
    post,
    path = "/admin/reload",
    tag = "admin",
    responses(
        (status = 200, description = "Dataset reloaded", body = ReloadResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let generation = reload_dataset(&state).await?;
    Ok(Json(ReloadResponse { generation }))
}
