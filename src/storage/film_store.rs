use super::persistence::DocumentStore;
use super::ranking::RankedCollection;
use crate::core::types::validate_position;
use crate::core::{Film, FilmDraft, FilmError, FilmId, FilmPatch, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Persisted form of the film collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFilms {
    pub next_id: FilmId,
    pub films: Vec<Film>,
}

/// Anything the film document may look like on disk.
///
/// Older files hold a bare array of films with no id counter; those are still
/// accepted and rewritten in the current shape on the next mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilmDocument {
    Current(StoredFilms),
    Legacy(Vec<Film>),
}

#[derive(Debug, Clone)]
struct FilmState {
    films: RankedCollection,
    next_id: FilmId,
}

impl FilmState {
    fn from_document(document: FilmDocument) -> Self {
        let (films, stored_next_id) = match document {
            FilmDocument::Current(stored) => (stored.films, stored.next_id),
            FilmDocument::Legacy(films) => (films, 1),
        };
        let films = RankedCollection::from_films(films);
        let next_id = films.max_id().map_or(1, |max| max + 1).max(stored_next_id);
        Self { films, next_id }
    }

    fn to_document(&self) -> FilmDocument {
        FilmDocument::Current(StoredFilms {
            next_id: self.next_id,
            films: self.films.films().to_vec(),
        })
    }
}

/// Owner of the in-memory film collection.
///
/// All access goes through one async mutex. A mutation works on a copy of the
/// state, writes the copy to the document store and only then replaces the
/// live state, so a failed write leaves both memory and disk untouched.
pub struct FilmStore {
    state: Mutex<Option<FilmState>>,
    documents: Arc<dyn DocumentStore<FilmDocument>>,
}

impl FilmStore {
    /// Creates a store that is still loading. Call [`FilmStore::load`] before
    /// it can serve requests.
    pub fn new(documents: Arc<dyn DocumentStore<FilmDocument>>) -> Self {
        Self {
            state: Mutex::new(None),
            documents,
        }
    }

    /// Creates a store and loads it immediately.
    pub async fn open(documents: Arc<dyn DocumentStore<FilmDocument>>) -> Self {
        let store = Self::new(documents);
        store.load().await;
        store
    }

    /// Reads the document and marks the store ready. An unreadable document
    /// yields an empty collection. Returns the number of films loaded.
    pub async fn load(&self) -> usize {
        let state = match self.documents.load().await {
            Ok(Some(document)) => FilmState::from_document(document),
            Ok(None) => {
                info!("no film document found, starting with an empty collection");
                FilmState::from_document(FilmDocument::Legacy(Vec::new()))
            }
            Err(err) => {
                error!(error = %err, "failed to load film document, starting with an empty collection");
                FilmState::from_document(FilmDocument::Legacy(Vec::new()))
            }
        };

        if !state.films.positions_unique() {
            warn!("loaded film collection contains duplicate positions");
        }

        let count = state.films.len();
        *self.state.lock().await = Some(state);
        info!(films = count, "film collection loaded");
        count
    }

    pub async fn is_ready(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Every film, ascending by position.
    pub async fn list(&self) -> Result<Vec<Film>> {
        let guard = self.state.lock().await;
        let state = guard.as_ref().ok_or(FilmError::NotReady)?;
        Ok(state.films.films().to_vec())
    }

    pub async fn get(&self, id: FilmId) -> Result<Film> {
        let guard = self.state.lock().await;
        let state = guard.as_ref().ok_or(FilmError::NotReady)?;
        state
            .films
            .get(id)
            .cloned()
            .ok_or_else(|| FilmError::not_found("Film not found"))
    }

    /// Validates `draft`, assigns the next id and ranks it.
    pub async fn insert(&self, draft: FilmDraft) -> Result<Film> {
        let candidate = draft.validate()?;

        self.mutate(|state| {
            let id = state.next_id;
            state.next_id += 1;

            let position = match candidate.position {
                Some(position) => position,
                None => state.films.append_position()?,
            };
            let film = state.films.insert(candidate.into_film(id, position))?.clone();
            info!(id = film.id, position = film.position, "film created");
            Ok(film)
        })
        .await
    }

    pub async fn update(&self, id: FilmId, patch: FilmPatch) -> Result<Film> {
        if let Some(position) = patch.position {
            validate_position(position)?;
        }

        self.mutate(|state| {
            let film = state.films.update(id, &patch)?;
            info!(id = film.id, position = film.position, "film updated");
            Ok(film)
        })
        .await
    }

    pub async fn remove(&self, id: FilmId) -> Result<Film> {
        self.mutate(|state| {
            let film = state.films.remove(id)?;
            info!(id = film.id, position = film.position, "film deleted");
            Ok(film)
        })
        .await
    }

    async fn mutate<R>(&self, change: impl FnOnce(&mut FilmState) -> Result<R>) -> Result<R> {
        let mut guard = self.state.lock().await;
        let live = guard.as_mut().ok_or(FilmError::NotReady)?;

        let mut working = live.clone();
        let outcome = change(&mut working)?;

        if let Err(err) = self.documents.save(&working.to_document()).await {
            error!(error = %err, "failed to persist film collection, change rolled back");
            return Err(err);
        }

        *live = working;
        Ok(outcome)
    }
}
