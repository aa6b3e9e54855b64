//! Non-repeating random playback over a catalog snapshot.
//!
//! A `RotationEngine` owns the song list loaded at session start and hands out
//! songs uniformly at random, never repeating one until every song has been
//! played in the current rotation epoch. When the catalog is exhausted the
//! played set is cleared and the next draw is made over the whole catalog,
//! which can pick the song that was just playing.

use std::collections::HashSet;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::{debug, warn};

use crate::{
    error::RotationError,
    types::{Song, SongId},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No songs were loaded; every selection yields nothing.
    Empty,
    Active,
}

pub struct RotationEngine<R = StdRng> {
    catalog: Vec<Song>,
    played: HashSet<SongId>,
    current: Option<usize>,
    history: Vec<usize>,
    epoch: u64,
    rng: R,
}

impl RotationEngine<StdRng> {
    pub fn initialize(catalog: Vec<Song>) -> Self {
        Self::initialize_with_rng(catalog, StdRng::from_entropy())
    }
}

impl<R: Rng> RotationEngine<R> {
    /// Takes ownership of the catalog snapshot and picks the first song.
    pub fn initialize_with_rng(catalog: Vec<Song>, rng: R) -> Self {
        let mut engine = Self {
            catalog,
            played: HashSet::new(),
            current: None,
            history: Vec::new(),
            epoch: 0,
            rng,
        };

        if engine.catalog.is_empty() {
            warn!("rotation started with an empty catalog");
        } else {
            engine.current = engine.select_next();
        }
        engine
    }

    pub fn state(&self) -> EngineState {
        if self.catalog.is_empty() {
            EngineState::Empty
        } else {
            EngineState::Active
        }
    }

    pub fn current(&self) -> Option<&Song> {
        self.current.map(|idx| &self.catalog[idx])
    }

    /// Like `current`, but reports the degraded empty state as an error.
    pub fn now_playing(&self) -> Result<&Song, RotationError> {
        self.current().ok_or(RotationError::EmptyCatalog)
    }

    /// Archives the current song and moves on to a fresh pick.
    pub fn advance(&mut self) -> Option<&Song> {
        if let Some(idx) = self.current {
            self.history.push(idx);
        }
        if let Some(next) = self.select_next() {
            self.current = Some(next);
        }
        self.current()
    }

    /// Reopens a song by id without counting it as a play.
    pub fn select_by_id(&mut self, id: SongId) -> Result<&Song, RotationError> {
        let idx = self
            .catalog
            .iter()
            .position(|song| song.id == id)
            .ok_or(RotationError::SongNotFound(id))?;

        self.current = Some(idx);
        Ok(&self.catalog[idx])
    }

    /// Previously presented songs, oldest first.
    pub fn history(&self) -> Vec<&Song> {
        self.history.iter().map(|&idx| &self.catalog[idx]).collect()
    }

    pub fn played(&self) -> &HashSet<SongId> {
        &self.played
    }

    pub fn catalog(&self) -> &[Song] {
        &self.catalog
    }

    /// Number of exhaustion resets so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn select_next(&mut self) -> Option<usize> {
        if self.catalog.is_empty() {
            return None;
        }

        let available: Vec<usize> = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, song)| !self.played.contains(&song.id))
            .map(|(idx, _)| idx)
            .collect();

        let pick = match available.choose(&mut self.rng) {
            Some(&idx) => idx,
            None => {
                self.played.clear();
                self.epoch += 1;
                debug!("catalog exhausted, starting rotation epoch {}", self.epoch);
                self.rng.gen_range(0..self.catalog.len())
            }
        };

        let song = &self.catalog[pick];
        debug!("selected song {} ({})", song.id, song.title);
        self.played.insert(song.id);
        Some(pick)
    }
}
