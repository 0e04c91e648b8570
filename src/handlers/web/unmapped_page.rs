use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::models::UnmappedGroup;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "unmapped.html")]
struct UnmappedTemplate {
    ready: bool,
    groups: Vec<UnmappedGroup>,
}

/// Admin page listing institution names awaiting manual curation.
pub async fn unmapped_page(State(state): State<AppState>) -> Result<Response, StatusCode> {
    let snapshot = state.map.snapshot();
    let template = UnmappedTemplate {
        ready: snapshot.is_some(),
        groups: snapshot
            .map(|s| s.unmapped.clone())
            .unwrap_or_default(),
    };

    let html = template.render().map_err(|e| {
        tracing::error!("failed to render unmapped page: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Html(html).into_response())
}
