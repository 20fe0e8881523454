use std::sync::Arc;

use cineteca_api::{
    catalog::TmdbCatalog,
    config::Config,
    db::{self, PgWatchlistStore},
    routes::{create_router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cineteca_api=debug,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Connected to database");

    let catalog = Arc::new(TmdbCatalog::new(
        config.tmdb_api_token.clone(),
        config.tmdb_api_url.clone(),
    ));
    let store = Arc::new(PgWatchlistStore::new(pool));

    let app = create_router(AppState::new(catalog, store));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
