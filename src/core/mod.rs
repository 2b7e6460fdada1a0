pub mod error;
pub mod types;

pub use error::{AuthFailure, FilmError, Result};
pub use types::{EARLIEST_FILM_YEAR, Film, FilmDraft, FilmId, FilmPatch, NewFilm, Position};
