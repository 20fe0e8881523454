/// Movie catalog abstraction
///
/// The catalog is read-only enrichment for the watchlist: search feeds the
/// presentation layer, the external-id lookup feeds classification. Neither
/// operation surfaces transport errors to callers. A failed search renders
/// as an empty page and a failed lookup as an absent id, so downstream code
/// never has to handle catalog outages.
use async_trait::async_trait;

use crate::models::FilmPage;

pub mod tmdb;

pub use tmdb::TmdbCatalog;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Searches the catalog by title. `page` starts at 1.
    ///
    /// A transport or upstream error yields an empty page with zero total
    /// pages; callers relying on the page count must treat a failed fetch
    /// as zero pages.
    async fn search(&self, query: &str, page: u32) -> FilmPage;

    /// Resolves the IMDB cross-reference id for a catalog movie id.
    ///
    /// Absence (unknown film, unresolved mapping, upstream failure) is not
    /// an error; enrichment is best-effort.
    async fn external_id(&self, movie_id: i64) -> Option<String>;
}
