use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use alumnimap::handlers;
use alumnimap::resolve::{Geocoder, HttpGeocoder, NoopGeocoder};
use alumnimap::state::{reload_dataset, AppConfig, AppState};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::map::get_clusters,
        handlers::map::get_cluster_children,
        handlers::map::click_cluster,
        handlers::locations::list_locations,
        handlers::locations::create_location,
        handlers::reports::get_unmapped_groups,
        handlers::admin::reload,
    ),
    tags(
        (name = "map", description = "Viewport clustering and navigation"),
        (name = "locations", description = "Curated institution locations"),
        (name = "reports", description = "Data-quality reports"),
        (name = "admin", description = "Dataset administration")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), sqlx::Error> {
    dotenv().ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new().connect(&url).await?;

    let geocoder: Arc<dyn Geocoder> = match std::env::var("GEOCODER_URL") {
        Ok(endpoint) => Arc::new(HttpGeocoder::new(endpoint)),
        Err(_) => {
            warn!("GEOCODER_URL not set, unknown institutions will stay unresolved");
            Arc::new(NoopGeocoder)
        }
    };

    let state = AppState::new(pool, geocoder, AppConfig::from_env());

    // Initial dataset load in the background; until it completes the map
    // endpoints report not-ready rather than failing.
    let load_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = reload_dataset(&load_state).await {
            tracing::error!("initial dataset load failed: {e}");
        }
    });

    let app = Router::new()
        // Web pages
        .route("/", get(handlers::web::map_page))
        .route("/admin/unmapped", get(handlers::web::unmapped_page))
        // Map API
        .route("/map/clusters", get(handlers::get_clusters))
        .route("/map/clusters/{id}/children", get(handlers::get_cluster_children))
        .route("/map/clusters/{id}/click", get(handlers::click_cluster))
        // Curated locations
        .route("/locations", get(handlers::list_locations).post(handlers::create_location))
        // Reports and admin
        .route("/reports/unmapped", get(handlers::get_unmapped_groups))
        .route("/admin/reload", post(handlers::reload))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    info!("Server is running on http://{addr}");
    axum::serve(listener, app).await.unwrap();

    Ok(())
}
