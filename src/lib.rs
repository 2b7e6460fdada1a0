// ============================================================================
// filmrank Library
// ============================================================================

pub mod auth;
pub mod config;
pub mod core;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use auth::{Account, AccountStore, Claims, TokenIssuer};
pub use config::AppConfig;
pub use core::{AuthFailure, Film, FilmDraft, FilmError, FilmId, FilmPatch, Result};
pub use storage::{
    DocumentStore, FilmDocument, FilmStore, JsonFileStore, MemoryDocumentStore, RankedCollection,
    StoredFilms,
};
pub use web::{AppState, build_router};
