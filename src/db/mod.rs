use sqlx::{postgres::PgPoolOptions, PgPool};

pub mod watchlist;

pub use watchlist::{PgWatchlistStore, WatchlistStore, PAGE_SIZE};

/// Creates a PostgreSQL connection pool and brings the schema up to date.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
