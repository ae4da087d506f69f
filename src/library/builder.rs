// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! In-progress chord form.

use thiserror::Error;

use crate::music::fretboard::{FRET_COUNT, STRING_COUNT};
use crate::music::pitch::PitchClass;

use super::model::{muted_strings, ChordVoicing, FretValue, VoicingKind, MAX_POSITION};

/// A required field was left empty. The form being validated is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please enter a display name")]
    MissingName,
    #[error("please select a root note")]
    MissingRoot,
    #[error("please select a chord quality")]
    MissingQuality,
    #[error("please select a chord voicing")]
    MissingVoicing,
    #[error("please enter a jam name")]
    MissingJamName,
    #[error("add at least one chord to the workspace first")]
    EmptyWorkspace,
    #[error("string {0} does not exist (0-5)")]
    NoSuchString(usize),
    #[error("fret {0} is off the fretboard")]
    NoSuchFret(u8),
    #[error("starting position {0} is out of range (1-{max})", max = MAX_POSITION)]
    PositionOutOfRange(u8),
}

/// Chord builder state: labels, position, and the six strings being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordDraft {
    pub name: String,
    pub root: Option<PitchClass>,
    pub quality: Option<String>,
    pub voicing: Option<VoicingKind>,
    position: u8,
    frets: [FretValue; STRING_COUNT],
    fingering: [FretValue; STRING_COUNT],
}

impl Default for ChordDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            root: None,
            quality: None,
            voicing: None,
            position: 1,
            frets: muted_strings(),
            fingering: muted_strings(),
        }
    }
}

impl ChordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing voicing, for editing
    pub fn from_voicing(chord: &ChordVoicing) -> Self {
        Self {
            name: chord.name.clone(),
            root: chord.root(),
            quality: Some(chord.chord_quality.clone()).filter(|q| !q.is_empty()),
            voicing: Some(chord.chord_voicing),
            position: chord.position.clamp(1, MAX_POSITION),
            frets: chord.frets,
            fingering: chord.fingering,
        }
    }

    pub fn frets(&self) -> &[FretValue; STRING_COUNT] {
        &self.frets
    }

    pub fn fingering(&self) -> &[FretValue; STRING_COUNT] {
        &self.fingering
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn set_position(&mut self, position: u8) -> Result<(), ValidationError> {
        if !(1..=MAX_POSITION).contains(&position) {
            return Err(ValidationError::PositionOutOfRange(position));
        }
        self.position = position;
        Ok(())
    }

    /// Press a fret. Pressing the fret already held mutes the string.
    pub fn toggle_fret(&mut self, string: usize, fret: u8) -> Result<(), ValidationError> {
        check_string(string)?;
        if fret == 0 || fret > FRET_COUNT {
            return Err(ValidationError::NoSuchFret(fret));
        }
        if self.frets[string] == FretValue::Fretted(fret) {
            self.frets[string] = FretValue::Muted;
            self.fingering[string] = FretValue::Muted;
        } else {
            self.frets[string] = FretValue::Fretted(fret);
            self.fingering[string] = FretValue::Fretted(1);
        }
        Ok(())
    }

    /// Click the nut: muted becomes open, anything else becomes muted
    pub fn cycle_nut(&mut self, string: usize) -> Result<(), ValidationError> {
        check_string(string)?;
        let next = match self.frets[string] {
            FretValue::Muted => FretValue::Open,
            FretValue::Open | FretValue::Fretted(_) => FretValue::Muted,
        };
        self.frets[string] = next;
        self.fingering[string] = next;
        Ok(())
    }

    /// Mute every string
    pub fn clear_fretboard(&mut self) {
        self.frets = muted_strings();
        self.fingering = muted_strings();
    }

    /// Enter a whole shape, low string first, as if each string had been
    /// clicked in turn. On error the fretboard is left as it was.
    pub fn set_shape(&mut self, shape: &[FretValue; STRING_COUNT]) -> Result<(), ValidationError> {
        let mut next = self.clone();
        next.clear_fretboard();
        for (string, fret) in shape.iter().enumerate() {
            match *fret {
                FretValue::Muted => {}
                FretValue::Open => next.cycle_nut(string)?,
                FretValue::Fretted(n) => next.toggle_fret(string, n)?,
            }
        }
        *self = next;
        Ok(())
    }

    /// Validate and produce a voicing. On error the draft is left as it was.
    pub fn build(&self, id: impl Into<String>) -> Result<ChordVoicing, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let root = self.root.ok_or(ValidationError::MissingRoot)?;
        let quality = self
            .quality
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(ValidationError::MissingQuality)?;
        let voicing = self.voicing.ok_or(ValidationError::MissingVoicing)?;

        Ok(ChordVoicing {
            id: id.into(),
            name: name.to_string(),
            root_note: root.label().to_string(),
            chord_quality: quality.to_string(),
            chord_voicing: voicing,
            frets: self.frets,
            fingering: self.fingering,
            position: self.position,
        })
    }

    /// Back to an empty form, as after a successful save
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn check_string(string: usize) -> Result<(), ValidationError> {
    if string < STRING_COUNT {
        Ok(())
    } else {
        Err(ValidationError::NoSuchString(string))
    }
}
