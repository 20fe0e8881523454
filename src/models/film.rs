use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A film as returned by a catalog search.
///
/// Transient: never persisted as-is, only snapshotted into a
/// [`WatchlistEntry`](super::WatchlistEntry) at classification time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Film {
    /// Catalog (TMDB) id of the film
    pub id: i64,
    /// Set when the film was re-read from a watchlist page, where `id` holds
    /// the store's entry id instead. Preferred over `id` when classifying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_release_date")]
    pub release_date: Option<NaiveDate>,
    /// Average rating on the 0-10 catalog scale
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl Film {
    /// The external movie id this film refers to.
    pub fn external_movie_id(&self) -> i64 {
        self.movie_id.unwrap_or(self.id)
    }
}

/// TMDB sends `""` for films without a known release date.
fn deserialize_release_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).and_then(|s| s.parse().ok()))
}

/// One page of search results plus the catalog's total page count.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilmPage {
    pub page: u32,
    pub total_pages: u32,
    pub results: Vec<Film>,
}

impl FilmPage {
    /// Empty-state page used for failed or trivial searches.
    pub fn empty(page: u32) -> Self {
        Self {
            page,
            total_pages: 0,
            results: Vec::new(),
        }
    }
}
