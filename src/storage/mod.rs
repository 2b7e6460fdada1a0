pub mod film_store;
pub mod persistence;
pub mod ranking;

pub use film_store::{FilmDocument, FilmStore, StoredFilms};
pub use persistence::{DocumentStore, JsonFileStore, MemoryDocumentStore};
pub use ranking::RankedCollection;
