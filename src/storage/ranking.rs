//! Rank bookkeeping for the film collection.
//!
//! The collection is kept sorted by `position` after every mutation, so the
//! index of an entry in the backing vector is also its rank order. Insert and
//! update open a slot by shifting everything at or above the requested rank up
//! by one; remove closes the slot by shifting everything after the removed
//! index down by one.

use crate::core::{Film, FilmError, FilmId, FilmPatch, Position, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedCollection {
    films: Vec<Film>,
}

impl RankedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from entries in any order.
    pub fn from_films(mut films: Vec<Film>) -> Self {
        films.sort_by_key(|film| film.position);
        Self { films }
    }

    /// All entries, ascending by position.
    pub fn films(&self) -> &[Film] {
        &self.films
    }

    pub fn len(&self) -> usize {
        self.films.len()
    }

    pub fn get(&self, id: FilmId) -> Option<&Film> {
        self.films.iter().find(|film| film.id == id)
    }

    pub fn max_id(&self) -> Option<FilmId> {
        self.films.iter().map(|film| film.id).max()
    }

    /// Rank one past the current last entry.
    pub fn append_position(&self) -> Result<Position> {
        match self.films.last() {
            Some(film) => next_position(film.position),
            None => Ok(1),
        }
    }

    fn is_occupied(&self, position: Position, except: Option<FilmId>) -> bool {
        self.films
            .iter()
            .any(|film| film.position == position && Some(film.id) != except)
    }

    /// Moves every entry at or above `position` up by one. Fails without
    /// touching anything if the highest of them has no rank left above it.
    fn shift_up_from(&mut self, position: Position, except: Option<FilmId>) -> Result<()> {
        let highest = self
            .films
            .iter()
            .filter(|film| film.position >= position && Some(film.id) != except)
            .map(|film| film.position)
            .max();
        if let Some(highest) = highest {
            next_position(highest)?;
        }

        for film in self
            .films
            .iter_mut()
            .filter(|film| film.position >= position && Some(film.id) != except)
        {
            film.position += 1;
        }
        Ok(())
    }

    /// Places `film` at its requested position.
    ///
    /// When the position is taken, the occupant and every entry ranked after
    /// it move up by one. An unoccupied position is stored as requested, even
    /// if that leaves a gap.
    pub fn insert(&mut self, film: Film) -> Result<&Film> {
        if self.is_occupied(film.position, None) {
            self.shift_up_from(film.position, None)?;
        }

        let id = film.id;
        self.films.push(film);
        self.films.sort_by_key(|film| film.position);

        let index = self
            .films
            .iter()
            .position(|film| film.id == id)
            .unwrap_or(self.films.len() - 1);
        Ok(&self.films[index])
    }

    /// Merges `patch` into the entry with `id` and returns the result.
    pub fn update(&mut self, id: FilmId, patch: &FilmPatch) -> Result<Film> {
        let index = self.index_of(id)?;

        if let Some(position) = patch.position {
            if self.is_occupied(position, Some(id)) {
                self.shift_up_from(position, Some(id))?;
            }
        }

        patch.apply_payload(&mut self.films[index]);
        if let Some(position) = patch.position {
            self.films[index].position = position;
            self.films.sort_by_key(|film| film.position);
        }

        self.get(id)
            .cloned()
            .ok_or_else(|| FilmError::Internal(format!("film {id} vanished during update")))
    }

    /// Removes the entry with `id` and decrements the position of every
    /// entry stored after it.
    pub fn remove(&mut self, id: FilmId) -> Result<Film> {
        let index = self.index_of(id)?;
        let removed = self.films.remove(index);

        for film in &mut self.films[index..] {
            film.position -= 1;
        }

        Ok(removed)
    }

    fn index_of(&self, id: FilmId) -> Result<usize> {
        self.films
            .iter()
            .position(|film| film.id == id)
            .ok_or_else(|| FilmError::not_found("Film not found"))
    }

    /// True when no two entries share a position.
    pub fn positions_unique(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.films.len());
        self.films.iter().all(|film| seen.insert(film.position))
    }

    /// True when positions are exactly `1..=len`.
    pub fn is_dense(&self) -> bool {
        self.films
            .iter()
            .zip(1..)
            .all(|(film, expected)| film.position == expected)
    }
}

fn next_position(position: Position) -> Result<Position> {
    position
        .checked_add(1)
        .ok_or_else(|| FilmError::validation("Invalid position"))
}
