use axum::extract::State;
use axum::Json;

use crate::models::UnmappedGroup;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/reports/unmapped",
    tag = "reports",
    responses(
        (status = 200, description = "Alumni grouped by unresolved institution name, largest first", body = Vec<UnmappedGroup>)
    )
)]
pub async fn get_unmapped_groups(State(state): State<AppState>) -> Json<Vec<UnmappedGroup>> {
    let groups = state
        .map
        .snapshot()
        .map(|snapshot| snapshot.unmapped.clone())
        .unwrap_or_default();
    Json(groups)
}
