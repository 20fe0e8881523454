use std::sync::Arc;

use uuid::Uuid;

use crate::{
    catalog::CatalogClient,
    db::watchlist::{total_pages, WatchlistStore},
    error::{AppError, AppResult},
    models::{Collection, Film, NewEntry, TransitionResult, WatchlistEntry, WatchlistPage},
};

/// The watchlist state engine.
///
/// Enforces the one-state-per-film rule over the two collections and turns
/// every outcome, store and catalog failures included, into a uniform
/// [`TransitionResult`] for the presentation layer. No raw error crosses
/// this boundary.
#[derive(Clone)]
pub struct WatchlistService {
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn WatchlistStore>,
}

impl WatchlistService {
    pub fn new(catalog: Arc<dyn CatalogClient>, store: Arc<dyn WatchlistStore>) -> Self {
        Self { catalog, store }
    }

    /// Classifies `film` into `target` for `user_id`.
    ///
    /// The duplicate check inspects only the target collection, so a film
    /// already sitting in the opposite collection is left there unless
    /// `vacate` names it. The check is read-then-write; a racing duplicate
    /// gets stopped by the store's uniqueness constraint instead and maps
    /// to an error result.
    ///
    /// When `vacate` is given the film is moved: the target insert happens
    /// first, the source delete after, so the film is never observably
    /// absent from both collections. The brief present-in-both window is
    /// accepted.
    pub async fn classify(
        &self,
        film: &Film,
        user_id: Uuid,
        target: Collection,
        vacate: Option<Collection>,
    ) -> TransitionResult {
        let movie_id = film.external_movie_id();

        match self
            .store
            .find_in_collection(target, user_id, movie_id)
            .await
        {
            Ok(Some(_)) => {
                tracing::debug!(%user_id, movie_id, %target, "Film already classified");
                return TransitionResult::exists(format!(
                    "\"{}\" is already in your {} list",
                    film.title, target
                ));
            }
            Ok(None) => {}
            Err(e) => return classification_failure(e, user_id, movie_id, target),
        }

        // Best-effort enrichment; a failed lookup must not abort the
        // classification.
        let imdb_id = self.catalog.external_id(movie_id).await;

        let entry = NewEntry::snapshot(film, user_id, movie_id, imdb_id);
        if let Err(e) = self.store.insert(target, entry).await {
            return classification_failure(e, user_id, movie_id, target);
        }

        // Vacate only after the insert has landed.
        if let Some(source) = vacate {
            if let Err(e) = self.vacate(source, user_id, movie_id).await {
                return classification_failure(e, user_id, movie_id, target);
            }
        }

        tracing::info!(%user_id, movie_id, %target, "Film classified");
        TransitionResult::success(format!(
            "\"{}\" added to your {} list",
            film.title, target
        ))
    }

    async fn vacate(&self, source: Collection, user_id: Uuid, movie_id: i64) -> AppResult<()> {
        if let Some(entry) = self
            .store
            .find_in_collection(source, user_id, movie_id)
            .await?
        {
            self.store.delete(source, entry.id, user_id).await?;
        }
        Ok(())
    }

    /// Removes an entry the user owns.
    ///
    /// A missing or foreign entry reports a plain error; callers cannot
    /// tell "already gone" from "never existed".
    pub async fn remove(
        &self,
        entry_id: i64,
        user_id: Uuid,
        collection: Collection,
    ) -> TransitionResult {
        match self.store.delete(collection, entry_id, user_id).await {
            Ok(0) => {
                tracing::debug!(%user_id, entry_id, %collection, "Nothing to remove");
                TransitionResult::error("Film not found in your list")
            }
            Ok(_) => {
                tracing::info!(%user_id, entry_id, %collection, "Film removed");
                TransitionResult::success("Film removed from your list")
            }
            Err(e) => {
                tracing::error!(%user_id, entry_id, %collection, error = %e, "Removal failed");
                TransitionResult::error(GENERIC_ERROR)
            }
        }
    }

    /// One page of a collection plus the page arithmetic the UI renders.
    pub async fn page(
        &self,
        collection: Collection,
        user_id: Uuid,
        page: u32,
    ) -> AppResult<WatchlistPage> {
        let entries = self.store.list_page(collection, user_id, page).await?;
        let count = self.store.count(collection, user_id).await?;

        Ok(WatchlistPage {
            entries,
            current_page: page,
            total_pages: total_pages(count),
        })
    }

    /// Which collection, if any, currently holds the film.
    pub async fn status(
        &self,
        user_id: Uuid,
        movie_id: i64,
    ) -> AppResult<Option<(Collection, WatchlistEntry)>> {
        self.store.find_entry(user_id, movie_id).await
    }
}

const GENERIC_ERROR: &str = "Something went wrong, please try again";

fn classification_failure(
    error: AppError,
    user_id: Uuid,
    movie_id: i64,
    target: Collection,
) -> TransitionResult {
    tracing::error!(%user_id, movie_id, %target, error = %error, "Classification failed");
    TransitionResult::error(GENERIC_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MockCatalogClient;
    use crate::db::watchlist::MockWatchlistStore;
    use crate::models::TransitionStatus;
    use chrono::Utc;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn test_film(id: i64, title: &str) -> Film {
        Film {
            id,
            movie_id: None,
            title: title.to_string(),
            overview: Some("overview".to_string()),
            poster_path: Some("/poster.jpg".to_string()),
            release_date: "2010-07-15".parse().ok(),
            vote_average: Some(8.4),
        }
    }

    fn stored_entry(id: i64, user_id: Uuid, movie_id: i64) -> WatchlistEntry {
        WatchlistEntry {
            id,
            user_id,
            movie_id,
            imdb_id: None,
            title: "Inception".to_string(),
            overview: None,
            poster_path: None,
            release_date: None,
            vote_average: None,
            created_at: Utc::now(),
        }
    }

    fn service(
        catalog: MockCatalogClient,
        store: MockWatchlistStore,
    ) -> WatchlistService {
        WatchlistService::new(Arc::new(catalog), Arc::new(store))
    }

    #[tokio::test]
    async fn test_classify_fresh_film_succeeds() {
        let user_id = Uuid::new_v4();
        let film = test_film(27205, "Inception");

        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_external_id()
            .with(eq(27205))
            .return_const(Some("tt1375666".to_string()));

        let mut store = MockWatchlistStore::new();
        store
            .expect_find_in_collection()
            .with(eq(Collection::ToWatch), eq(user_id), eq(27205))
            .returning(|_, _, _| Ok(None));
        store
            .expect_insert()
            .withf(move |collection, entry| {
                *collection == Collection::ToWatch
                    && entry.user_id == user_id
                    && entry.movie_id == 27205
                    && entry.imdb_id.as_deref() == Some("tt1375666")
                    && entry.title == "Inception"
            })
            .returning(|_, _| Ok(1));

        let result = service(catalog, store)
            .classify(&film, user_id, Collection::ToWatch, None)
            .await;

        assert_eq!(result.status, TransitionStatus::Success);
        assert!(result.message.contains("Inception"));
    }

    #[tokio::test]
    async fn test_classify_duplicate_target_is_idempotent() {
        let user_id = Uuid::new_v4();
        let film = test_film(27205, "Inception");

        // No enrichment and no insert may happen on the duplicate path.
        let catalog = MockCatalogClient::new();

        let mut store = MockWatchlistStore::new();
        store
            .expect_find_in_collection()
            .with(eq(Collection::ToWatch), eq(user_id), eq(27205))
            .returning(move |_, uid, mid| Ok(Some(stored_entry(1, uid, mid))));

        let result = service(catalog, store)
            .classify(&film, user_id, Collection::ToWatch, None)
            .await;

        assert_eq!(result.status, TransitionStatus::Exists);
    }

    #[tokio::test]
    async fn test_classify_survives_failed_enrichment() {
        let user_id = Uuid::new_v4();
        let film = test_film(27205, "Inception");

        let mut catalog = MockCatalogClient::new();
        catalog.expect_external_id().return_const(None);

        let mut store = MockWatchlistStore::new();
        store
            .expect_find_in_collection()
            .returning(|_, _, _| Ok(None));
        store
            .expect_insert()
            .withf(|_, entry| entry.imdb_id.is_none())
            .returning(|_, _| Ok(1));

        let result = service(catalog, store)
            .classify(&film, user_id, Collection::Watched, None)
            .await;

        assert_eq!(result.status, TransitionStatus::Success);
    }

    #[tokio::test]
    async fn test_move_inserts_into_target_before_vacating_source() {
        let user_id = Uuid::new_v4();
        let film = test_film(27205, "Inception");

        let mut catalog = MockCatalogClient::new();
        catalog.expect_external_id().return_const(None);

        let mut seq = Sequence::new();
        let mut store = MockWatchlistStore::new();
        store
            .expect_find_in_collection()
            .with(eq(Collection::Watched), eq(user_id), eq(27205))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(None));
        store
            .expect_insert()
            .with(eq(Collection::Watched), mockall::predicate::always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(9));
        store
            .expect_find_in_collection()
            .with(eq(Collection::ToWatch), eq(user_id), eq(27205))
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, uid, mid| Ok(Some(stored_entry(3, uid, mid))));
        store
            .expect_delete()
            .with(eq(Collection::ToWatch), eq(3), eq(user_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(1));

        let result = service(catalog, store)
            .classify(
                &film,
                user_id,
                Collection::Watched,
                Some(Collection::ToWatch),
            )
            .await;

        assert_eq!(result.status, TransitionStatus::Success);
    }

    #[tokio::test]
    async fn test_classify_prefers_stored_movie_id() {
        let user_id = Uuid::new_v4();
        // Film re-read from a watchlist page: `id` is the entry id, the
        // real catalog id lives in `movie_id`.
        let mut film = test_film(42, "Inception");
        film.movie_id = Some(27205);

        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_external_id()
            .with(eq(27205))
            .return_const(None);

        let mut store = MockWatchlistStore::new();
        store
            .expect_find_in_collection()
            .with(eq(Collection::Watched), eq(user_id), eq(27205))
            .returning(|_, _, _| Ok(None));
        store
            .expect_insert()
            .withf(|_, entry| entry.movie_id == 27205)
            .returning(|_, _| Ok(1));

        let result = service(catalog, store)
            .classify(&film, user_id, Collection::Watched, None)
            .await;

        assert_eq!(result.status, TransitionStatus::Success);
    }

    #[tokio::test]
    async fn test_racing_duplicate_maps_conflict_to_error() {
        let user_id = Uuid::new_v4();
        let film = test_film(27205, "Inception");

        let mut catalog = MockCatalogClient::new();
        catalog.expect_external_id().return_const(None);

        let mut store = MockWatchlistStore::new();
        store
            .expect_find_in_collection()
            .returning(|_, _, _| Ok(None));
        store
            .expect_insert()
            .returning(|_, _| Err(AppError::Conflict("film 27205 already in to-watch".into())));

        let result = service(catalog, store)
            .classify(&film, user_id, Collection::ToWatch, None)
            .await;

        assert_eq!(result.status, TransitionStatus::Error);
        // The raw conflict never reaches the caller.
        assert!(!result.message.contains("27205"));
    }

    #[tokio::test]
    async fn test_classify_store_failure_maps_to_error() {
        let user_id = Uuid::new_v4();
        let film = test_film(27205, "Inception");

        let catalog = MockCatalogClient::new();

        let mut store = MockWatchlistStore::new();
        store
            .expect_find_in_collection()
            .returning(|_, _, _| Err(AppError::Database(sqlx::Error::PoolClosed)));

        let result = service(catalog, store)
            .classify(&film, user_id, Collection::ToWatch, None)
            .await;

        assert_eq!(result.status, TransitionStatus::Error);
    }

    #[tokio::test]
    async fn test_remove_owned_entry_succeeds() {
        let user_id = Uuid::new_v4();

        let mut store = MockWatchlistStore::new();
        store
            .expect_delete()
            .with(eq(Collection::ToWatch), eq(7), eq(user_id))
            .returning(|_, _, _| Ok(1));

        let result = service(MockCatalogClient::new(), store)
            .remove(7, user_id, Collection::ToWatch)
            .await;

        assert_eq!(result.status, TransitionStatus::Success);
    }

    #[tokio::test]
    async fn test_remove_missing_or_foreign_entry_fails() {
        let user_id = Uuid::new_v4();

        let mut store = MockWatchlistStore::new();
        store.expect_delete().returning(|_, _, _| Ok(0));

        let result = service(MockCatalogClient::new(), store)
            .remove(7, user_id, Collection::Watched)
            .await;

        assert_eq!(result.status, TransitionStatus::Error);
    }

    #[tokio::test]
    async fn test_page_reports_total_pages() {
        let user_id = Uuid::new_v4();

        let mut store = MockWatchlistStore::new();
        store
            .expect_list_page()
            .with(eq(Collection::ToWatch), eq(user_id), eq(2))
            .returning(move |_, uid, _| {
                Ok((21..=25).map(|i| stored_entry(i, uid, i + 1000)).collect())
            });
        store
            .expect_count()
            .with(eq(Collection::ToWatch), eq(user_id))
            .returning(|_, _| Ok(25));

        let page = service(MockCatalogClient::new(), store)
            .page(Collection::ToWatch, user_id, 2)
            .await
            .unwrap();

        assert_eq!(page.entries.len(), 5);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 2);
    }
}
