use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppError;
use crate::models::{CreateCuratedLocation, CuratedLocation};
use crate::state::{reload_dataset, AppState};
use crate::store;
use crate::utils::is_valid_coordinate;

#[utoipa::path(
    get,
    path = "/locations",
    tag = "locations",
    responses(
        (status = 200, description = "All curated location mappings", body = Vec<CuratedLocation>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<CuratedLocation>>, AppError> {
    let locations = store::list_curated_locations(&state.pool).await?;
    Ok(Json(locations))
}

#[utoipa::path(
    post,
    path = "/locations",
    tag = "locations",
    request_body = CreateCuratedLocation,
    responses(
        (status = 201, description = "Curated mapping added", body = CuratedLocation),
        (status = 400, description = "Non-finite coordinates"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(new): Json<CreateCuratedLocation>,
) -> Result<(StatusCode, Json<CuratedLocation>), AppError> {
    for v in [new.latitude, new.longitude] {
        if !is_valid_coordinate(v) {
            return Err(AppError::InvalidCoordinate(v));
        }
    }

    let location = store::insert_curated_location(&state.pool, &new).await?;

    // The new mapping should show up on the map without a restart.
    let reload_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = reload_dataset(&reload_state).await {
            tracing::error!("reload after curated add failed: {e}");
        }
    });

    Ok((StatusCode::CREATED, Json(location)))
}
