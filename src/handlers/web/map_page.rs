use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::state::AppState;

#[derive(Template)]
#[template(path = "map.html")]
struct MapTemplate {
    tile_url: String,
    attribution: String,
    max_zoom: f64,
}

/// The interactive alumni map page. All data comes from the JSON API; the
/// page itself only needs the tile-provider settings.
pub async fn map_page(State(state): State<AppState>) -> Result<Response, StatusCode> {
    let template = MapTemplate {
        tile_url: state.config.tile.url_template.clone(),
        attribution: state.config.tile.attribution.clone(),
        max_zoom: state.config.map_max_zoom,
    };

    let html = template.render().map_err(|e| {
        tracing::error!("failed to render map page: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Html(html).into_response())
}
