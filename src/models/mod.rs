pub mod film;
pub mod watchlist;

pub use film::{Film, FilmPage};
pub use watchlist::{
    Collection, NewEntry, TransitionResult, TransitionStatus, WatchlistEntry, WatchlistPage,
};
