use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::models::FilmPage;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    query: String,
    #[serde(default = "default_page")]
    page: u32,
}

fn default_page() -> u32 {
    1
}

/// Handler for the film search endpoint.
///
/// Failed upstream searches surface as an empty page, never as an error
/// response; the UI renders the same empty state either way.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<FilmPage> {
    let page = params.page.max(1);
    Json(state.catalog.search(&params.query, page).await)
}
