// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord and progression transposition, including capo charts.
//!
//! Capo convention used throughout the crate: a progression is stored as it
//! *sounds*. With the capo on fret `F` the shapes to finger are the progression
//! transposed by `-F`; playing those shapes with the capo on transposes them
//! back up by `+F`.

use std::fmt;

use thiserror::Error;

use super::chord_name::ChordName;
use super::pitch::{PitchClass, Semitones};

/// Highest capo fret accepted. Fret 12 sounds the same pitch classes as no
/// capo at all.
pub const MAX_CAPO_FRET: u8 = 11;

/// Transpose a single chord symbol. Text without a recognisable root is
/// returned unchanged. The suffix after the root is kept verbatim, so
/// `"Gsus4"` up two is `"Asus4"`.
pub fn transpose(chord: &str, semitones: Semitones) -> String {
    let name = ChordName::parse(chord);
    match name.root {
        Some(root) => format!("{}{}", root.transpose(semitones), name.suffix),
        None => chord.to_string(),
    }
}

/// Transpose every whitespace-separated chord in a progression. Runs of
/// whitespace collapse to a single space.
pub fn transpose_progression(progression: &str, semitones: Semitones) -> String {
    progression
        .split_whitespace()
        .map(|chord| transpose(chord, semitones))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Transpose a progression from one key root to another (always upward,
/// pitch classes wrap)
pub fn transpose_to_key(progression: &str, from: PitchClass, to: PitchClass) -> String {
    transpose_progression(progression, from.interval_to(to) as Semitones)
}

/// Error for an out-of-range capo position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("capo fret {0} is out of range (0-{max})", max = MAX_CAPO_FRET)]
pub struct CapoOutOfRange(pub u8);

/// A progression paired with a capo position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapoChart {
    original: String,
    capo: u8,
}

impl CapoChart {
    /// Create a chart for a sounding progression and capo fret
    pub fn new(original: impl Into<String>, capo: u8) -> Result<Self, CapoOutOfRange> {
        if capo > MAX_CAPO_FRET {
            return Err(CapoOutOfRange(capo));
        }
        Ok(Self {
            original: original.into(),
            capo,
        })
    }

    /// The progression as written (sounding pitch)
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Capo fret
    pub fn capo(&self) -> u8 {
        self.capo
    }

    /// Chord shapes to finger with the capo on
    pub fn fingered(&self) -> String {
        transpose_progression(&self.original, -(self.capo as Semitones))
    }

    /// What the fingered shapes sound like with the capo on
    pub fn sounding(&self) -> String {
        transpose_progression(&self.fingered(), self.capo as Semitones)
    }
}

impl fmt::Display for CapoChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.capo == 0 {
            write!(f, "{} (no capo)", self.original)
        } else {
            write!(
                f,
                "With capo on fret {}, play {} to sound like {}",
                self.capo,
                self.fingered(),
                self.sounding()
            )
        }
    }
}
