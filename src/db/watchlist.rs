use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Collection, NewEntry, WatchlistEntry},
};

/// Entries per watchlist page.
pub const PAGE_SIZE: i64 = 20;

const ENTRY_COLUMNS: &str = "id, user_id, movie_id, imdb_id, title, overview, poster_path, \
                             release_date, vote_average, created_at";

/// Persistent per-user film collections.
///
/// Each collection is its own table with a uniqueness constraint on
/// `(user_id, movie_id)`. That constraint, not the engine's read-then-write
/// duplicate check, is what keeps racing classifications from producing two
/// entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Looks a film up across both collections.
    async fn find_entry(
        &self,
        user_id: Uuid,
        movie_id: i64,
    ) -> AppResult<Option<(Collection, WatchlistEntry)>>;

    async fn find_in_collection(
        &self,
        collection: Collection,
        user_id: Uuid,
        movie_id: i64,
    ) -> AppResult<Option<WatchlistEntry>>;

    /// Inserts a new entry, returning its store-assigned id.
    ///
    /// A duplicate `(user_id, movie_id)` in the same collection fails with
    /// [`AppError::Conflict`].
    async fn insert(&self, collection: Collection, entry: NewEntry) -> AppResult<i64>;

    /// Deletes the entry only if it belongs to `user_id`.
    ///
    /// Returns the number of rows removed; zero when the entry is missing
    /// or owned by someone else.
    async fn delete(&self, collection: Collection, entry_id: i64, user_id: Uuid)
        -> AppResult<u64>;

    /// One page of entries in insertion order, `page` starting at 1.
    async fn list_page(
        &self,
        collection: Collection,
        user_id: Uuid,
        page: u32,
    ) -> AppResult<Vec<WatchlistEntry>>;

    async fn count(&self, collection: Collection, user_id: Uuid) -> AppResult<i64>;
}

/// Number of pages needed to list `count` entries.
pub fn total_pages(count: i64) -> u32 {
    ((count.max(0) + PAGE_SIZE - 1) / PAGE_SIZE) as u32
}

/// Postgres-backed watchlist store.
#[derive(Clone)]
pub struct PgWatchlistStore {
    pool: PgPool,
}

impl PgWatchlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WatchlistStore for PgWatchlistStore {
    async fn find_entry(
        &self,
        user_id: Uuid,
        movie_id: i64,
    ) -> AppResult<Option<(Collection, WatchlistEntry)>> {
        for collection in [Collection::ToWatch, Collection::Watched] {
            if let Some(entry) = self.find_in_collection(collection, user_id, movie_id).await? {
                return Ok(Some((collection, entry)));
            }
        }
        Ok(None)
    }

    async fn find_in_collection(
        &self,
        collection: Collection,
        user_id: Uuid,
        movie_id: i64,
    ) -> AppResult<Option<WatchlistEntry>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = $1 AND movie_id = $2",
            ENTRY_COLUMNS,
            collection.table()
        );

        let entry = sqlx::query_as::<_, WatchlistEntry>(&sql)
            .bind(user_id)
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    async fn insert(&self, collection: Collection, entry: NewEntry) -> AppResult<i64> {
        let sql = format!(
            "INSERT INTO {} (user_id, movie_id, imdb_id, title, overview, poster_path, \
             release_date, vote_average) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
            collection.table()
        );

        let (id,): (i64,) = sqlx::query_as(&sql)
            .bind(entry.user_id)
            .bind(entry.movie_id)
            .bind(&entry.imdb_id)
            .bind(&entry.title)
            .bind(&entry.overview)
            .bind(&entry.poster_path)
            .bind(entry.release_date)
            .bind(entry.vote_average)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(
                    format!("film {} already in {}", entry.movie_id, collection),
                ),
                _ => AppError::from(e),
            })?;

        Ok(id)
    }

    async fn delete(
        &self,
        collection: Collection,
        entry_id: i64,
        user_id: Uuid,
    ) -> AppResult<u64> {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2",
            collection.table()
        );

        let result = sqlx::query(&sql)
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_page(
        &self,
        collection: Collection,
        user_id: Uuid,
        page: u32,
    ) -> AppResult<Vec<WatchlistEntry>> {
        let offset = (i64::from(page.max(1)) - 1) * PAGE_SIZE;
        let sql = format!(
            "SELECT {} FROM {} WHERE user_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            ENTRY_COLUMNS,
            collection.table()
        );

        let entries = sqlx::query_as::<_, WatchlistEntry>(&sql)
            .bind(user_id)
            .bind(PAGE_SIZE)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    async fn count(&self, collection: Collection, user_id: Uuid) -> AppResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE user_id = $1",
            collection.table()
        );

        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_empty() {
        assert_eq!(total_pages(0), 0);
    }

    #[test]
    fn test_total_pages_exact_page() {
        assert_eq!(total_pages(20), 1);
        assert_eq!(total_pages(40), 2);
    }

    #[test]
    fn test_total_pages_partial_page() {
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(21), 2);
        assert_eq!(total_pages(25), 2);
    }
}
