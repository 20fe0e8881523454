use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Collection, Film, TransitionResult, WatchlistPage},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub film: Film,
    pub user_id: Uuid,
    /// Collection to move the film out of once it has landed in the target
    #[serde(default)]
    pub vacate: Option<Collection>,
}

/// Classifies a film into the target collection.
pub async fn classify(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
    Json(request): Json<ClassifyRequest>,
) -> Json<TransitionResult> {
    Json(
        state
            .watchlist
            .classify(&request.film, request.user_id, collection, request.vacate)
            .await,
    )
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Uuid,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// One page of a collection, 20 entries in insertion order.
pub async fn list(
    State(state): State<AppState>,
    Path(collection): Path<Collection>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<WatchlistPage>> {
    if params.page < 1 {
        return Err(AppError::InvalidInput(
            "page numbers start at 1".to_string(),
        ));
    }

    let page = state
        .watchlist
        .page(collection, params.user_id, params.page)
        .await?;

    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct RemoveQuery {
    pub user_id: Uuid,
}

/// Removes an entry from a collection.
pub async fn remove(
    State(state): State<AppState>,
    Path((collection, entry_id)): Path<(Collection, i64)>,
    Query(params): Query<RemoveQuery>,
) -> Json<TransitionResult> {
    Json(
        state
            .watchlist
            .remove(entry_id, params.user_id, collection)
            .await,
    )
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub user_id: Uuid,
    pub movie_id: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub collection: Option<Collection>,
    pub entry_id: Option<i64>,
}

/// Reports which collection, if any, holds the film for this user.
///
/// The presentation layer uses this to pick the actions offered next to a
/// film instead of inspecting page paths.
pub async fn status(
    State(state): State<AppState>,
    Query(params): Query<StatusQuery>,
) -> AppResult<Json<StatusResponse>> {
    let found = state
        .watchlist
        .status(params.user_id, params.movie_id)
        .await?;

    let (collection, entry_id) = match found {
        Some((collection, entry)) => (Some(collection), Some(entry.id)),
        None => (None, None),
    };

    Ok(Json(StatusResponse {
        collection,
        entry_id,
    }))
}
