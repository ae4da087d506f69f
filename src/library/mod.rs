// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord library, jam workspace and saved jams.
//!
//! Each service is a thin view over one [`Store`] collection: it reads the
//! whole collection, changes it, and writes it back, so every mutation is
//! published to subscribers by the store.

pub mod builder;
pub mod model;
pub mod reference;

pub use builder::{ChordDraft, ValidationError};
pub use model::{ids, ChordVoicing, FretValue, IdGenerator, InvalidFret, Jam, VoicingKind};

use thiserror::Error;
use tracing::info;

use crate::music::transpose::{CapoOutOfRange, MAX_CAPO_FRET};
use crate::store::{Collection, Store, StoreError};

/// Failures of library operations
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Capo(#[from] CapoOutOfRange),

    #[error("no record with id {0:?}")]
    NotFound(String),

    #[error("a record with id {0:?} already exists")]
    DuplicateId(String),

    #[error("position {index} is out of range for {len} chords")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, LibraryError>;

/// The user's custom chords
#[derive(Debug, Clone, Copy)]
pub struct ChordLibrary<'s> {
    store: &'s Store,
}

impl<'s> ChordLibrary<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    /// Every chord, in insertion order
    pub fn list(&self) -> Result<Vec<ChordVoicing>> {
        Ok(self.store.get(Collection::CustomChords)?)
    }

    pub fn get(&self, id: &str) -> Result<ChordVoicing> {
        self.list()?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    pub fn add(&self, chord: ChordVoicing) -> Result<()> {
        let mut chords = self.list()?;
        if chords.iter().any(|c| c.id == chord.id) {
            return Err(LibraryError::DuplicateId(chord.id));
        }
        info!(id = %chord.id, name = %chord.name, "chord added");
        chords.push(chord);
        self.save(&chords)
    }

    /// Validate a draft and add the result under a fresh id
    pub fn add_draft(&self, draft: &ChordDraft) -> Result<ChordVoicing> {
        let chord = draft.build(ids().next_id())?;
        self.add(chord.clone())?;
        Ok(chord)
    }

    /// Replace the whole record with the same id
    pub fn replace(&self, chord: ChordVoicing) -> Result<()> {
        let mut chords = self.list()?;
        let slot = chords
            .iter_mut()
            .find(|c| c.id == chord.id)
            .ok_or_else(|| LibraryError::NotFound(chord.id.clone()))?;
        *slot = chord;
        self.save(&chords)
    }

    /// Remove and return a chord. Saved jams keep their own copies.
    pub fn delete(&self, id: &str) -> Result<ChordVoicing> {
        let mut chords = self.list()?;
        let index = chords
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        let removed = chords.remove(index);
        self.save(&chords)?;
        info!(id, "chord deleted");
        Ok(removed)
    }

    /// Chords whose name or quality contains `term`, or whose root label
    /// equals it, ignoring case. `"c"` finds C chords but not C# ones.
    pub fn search(&self, term: &str) -> Result<Vec<ChordVoicing>> {
        let term = term.trim().to_lowercase();
        Ok(self
            .list()?
            .into_iter()
            .filter(|c| {
                term.is_empty()
                    || c.name.to_lowercase().contains(&term)
                    || c.root_note.to_lowercase() == term
                    || c.chord_quality.to_lowercase().contains(&term)
            })
            .collect())
    }

    /// Copy a built-in reference shape into the library under a fresh id
    pub fn copy_reference(&self, voicing_name: &str) -> Result<ChordVoicing> {
        let (chord, voicing) = reference::find_voicing(voicing_name)
            .ok_or_else(|| LibraryError::NotFound(voicing_name.to_string()))?;
        let record = voicing.to_chord_voicing(chord, ids().next_id());
        self.add(record.clone())?;
        Ok(record)
    }

    pub fn filter_by_voicing(&self, voicing: VoicingKind) -> Result<Vec<ChordVoicing>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|c| c.chord_voicing == voicing)
            .collect())
    }

    fn save(&self, chords: &[ChordVoicing]) -> Result<()> {
        Ok(self.store.put(Collection::CustomChords, chords)?)
    }
}

/// The ordered chords currently being arranged
#[derive(Debug, Clone, Copy)]
pub struct Workspace<'s> {
    store: &'s Store,
}

impl<'s> Workspace<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    pub fn chords(&self) -> Result<Vec<ChordVoicing>> {
        Ok(self.store.get(Collection::Workspace)?)
    }

    /// Append a copy of a library chord. The copy gets the id
    /// `<originalId>-<timestamp>` so one chord can appear more than once.
    pub fn add_from_library(&self, library_id: &str) -> Result<ChordVoicing> {
        let original = ChordLibrary::new(self.store).get(library_id)?;
        self.push(&original)
    }

    /// Append a copy of any voicing
    pub fn push(&self, chord: &ChordVoicing) -> Result<ChordVoicing> {
        let copy = chord.with_id(format!("{}-{}", chord.id, ids().next_millis()));
        let mut chords = self.chords()?;
        chords.push(copy.clone());
        self.save(&chords)?;
        Ok(copy)
    }

    /// Remove by workspace id
    pub fn remove(&self, id: &str) -> Result<ChordVoicing> {
        let mut chords = self.chords()?;
        let index = chords
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        let removed = chords.remove(index);
        self.save(&chords)?;
        Ok(removed)
    }

    /// Move the chord at `from` so that it ends up at `to`
    pub fn move_chord(&self, from: usize, to: usize) -> Result<()> {
        let mut chords = self.chords()?;
        let len = chords.len();
        for index in [from, to] {
            if index >= len {
                return Err(LibraryError::OutOfRange { index, len });
            }
        }
        if from != to {
            let chord = chords.remove(from);
            chords.insert(to, chord);
            self.save(&chords)?;
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.save(&[])
    }

    /// Replace the workspace contents
    pub fn set(&self, chords: &[ChordVoicing]) -> Result<()> {
        self.save(chords)
    }

    /// Progression tokens in order, space separated, as a saved jam would
    /// print them
    pub fn progression(&self) -> Result<String> {
        Ok(self
            .chords()?
            .iter()
            .map(ChordVoicing::progression_token)
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn save(&self, chords: &[ChordVoicing]) -> Result<()> {
        Ok(self.store.put(Collection::Workspace, chords)?)
    }
}

/// Saved jams
#[derive(Debug, Clone, Copy)]
pub struct JamBook<'s> {
    store: &'s Store,
}

impl<'s> JamBook<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    /// Snapshot the workspace as a new jam
    pub fn save_workspace(&self, name: &str, capo_fret: u8) -> Result<Jam> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingJamName.into());
        }
        if capo_fret > MAX_CAPO_FRET {
            return Err(CapoOutOfRange(capo_fret).into());
        }
        let chords = Workspace::new(self.store).chords()?;
        if chords.is_empty() {
            return Err(ValidationError::EmptyWorkspace.into());
        }

        let created_at = ids().next_millis();
        let jam = Jam {
            id: created_at.to_string(),
            name: name.to_string(),
            chords,
            capo_fret,
            created_at,
        };
        let mut jams = self.list()?;
        jams.push(jam.clone());
        self.save(&jams)?;
        info!(id = %jam.id, name = %jam.name, chords = jam.chords.len(), "jam saved");
        Ok(jam)
    }

    pub fn list(&self) -> Result<Vec<Jam>> {
        Ok(self.store.get(Collection::SavedJams)?)
    }

    pub fn get(&self, id: &str) -> Result<Jam> {
        self.list()?
            .into_iter()
            .find(|j| j.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    pub fn delete(&self, id: &str) -> Result<Jam> {
        let mut jams = self.list()?;
        let index = jams
            .iter()
            .position(|j| j.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        let removed = jams.remove(index);
        self.save(&jams)?;
        Ok(removed)
    }

    pub fn rename(&self, id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingJamName.into());
        }
        let mut jams = self.list()?;
        let jam = jams
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        jam.name = name.to_string();
        self.save(&jams)
    }

    /// Replace the workspace with a jam's chords; returns the jam's capo fret
    pub fn load_into_workspace(&self, id: &str) -> Result<u8> {
        let jam = self.get(id)?;
        Workspace::new(self.store).set(&jam.chords)?;
        Ok(jam.capo_fret)
    }

    /// Shapes to finger for a saved jam
    pub fn fingered_progression(&self, id: &str) -> Result<String> {
        Ok(self.get(id)?.fingered_progression())
    }

    fn save(&self, jams: &[Jam]) -> Result<()> {
        Ok(self.store.put(Collection::SavedJams, jams)?)
    }
}
