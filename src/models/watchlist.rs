use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Film;

/// The two persistent per-user film collections.
///
/// A searched film that belongs to neither is unclassified; a film is never
/// durably in both at once for the same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collection {
    ToWatch,
    Watched,
}

impl Collection {
    /// Table backing this collection.
    pub(crate) fn table(self) -> &'static str {
        match self {
            Collection::ToWatch => "films_to_watch",
            Collection::Watched => "films_watched",
        }
    }

    /// The opposite collection.
    pub fn other(self) -> Self {
        match self {
            Collection::ToWatch => Collection::Watched,
            Collection::Watched => Collection::ToWatch,
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::ToWatch => write!(f, "to-watch"),
            Collection::Watched => write!(f, "watched"),
        }
    }
}

/// A persisted film record in one of the two collections.
///
/// Fields are an immutable snapshot of the film at the moment it was
/// classified; they are not refreshed if the catalog's data changes later.
/// `imdb_id` stays absent when enrichment failed, the entry is still valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct WatchlistEntry {
    /// Store-assigned entry id
    pub id: i64,
    pub user_id: Uuid,
    /// External catalog movie id
    pub movie_id: i64,
    /// Cross-reference id, resolved lazily via the catalog
    pub imdb_id: Option<String>,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub vote_average: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of a film waiting to be inserted into a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub user_id: Uuid,
    pub movie_id: i64,
    pub imdb_id: Option<String>,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub vote_average: Option<f64>,
}

impl NewEntry {
    /// Captures the film's fields at classification time.
    pub fn snapshot(film: &Film, user_id: Uuid, movie_id: i64, imdb_id: Option<String>) -> Self {
        Self {
            user_id,
            movie_id,
            imdb_id,
            title: film.title.clone(),
            overview: film.overview.clone(),
            poster_path: film.poster_path.clone(),
            release_date: film.release_date,
            vote_average: film.vote_average,
        }
    }
}

/// Outcome class of a state-engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionStatus {
    Success,
    /// Film already classified in the target collection; not an error
    Exists,
    Error,
}

/// Uniform result of a state-engine operation, rendered by the presentation
/// layer as a short-lived status notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionResult {
    pub status: TransitionStatus,
    pub message: String,
}

impl TransitionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: TransitionStatus::Success,
            message: message.into(),
        }
    }

    pub fn exists(message: impl Into<String>) -> Self {
        Self {
            status: TransitionStatus::Exists,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: TransitionStatus::Error,
            message: message.into(),
        }
    }
}

/// One page of a collection plus the page arithmetic the UI renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistPage {
    pub entries: Vec<WatchlistEntry>,
    pub current_page: u32,
    pub total_pages: u32,
}
