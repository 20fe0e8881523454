use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{catalog::CatalogClient, db::WatchlistStore, services::WatchlistService};

pub mod films;
pub mod watchlist;

/// Shared application state: the catalog behind the search page and the
/// state engine behind every watchlist operation.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogClient>,
    pub watchlist: WatchlistService,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogClient>, store: Arc<dyn WatchlistStore>) -> Self {
        Self {
            watchlist: WatchlistService::new(catalog.clone(), store),
            catalog,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/films/search", get(films::search))
        .route("/watchlist/status", get(watchlist::status))
        .route(
            "/watchlist/:collection",
            get(watchlist::list).post(watchlist::classify),
        )
        .route("/watchlist/:collection/:entry_id", delete(watchlist::remove))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
