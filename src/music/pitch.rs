// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch classes and enharmonic spelling.
//!
//! The twelve chromatic notes are spelled with sharps by default. Five flat
//! spellings (`Db`, `Eb`, `Gb`, `Ab`, `Bb`) are accepted on input and can be
//! rewritten to their sharp equivalent with [`normalize_enharmonic`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semitone offset type
pub type Semitones = i32;

/// Canonical sharp spellings in chromatic order
pub const SHARP_LABELS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat spellings in chromatic order (naturals repeated)
pub const FLAT_LABELS: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Sharp/flat pairs for the five black keys
const ENHARMONIC_PAIRS: [(&str, &str); 5] = [
    ("C#", "Db"),
    ("D#", "Eb"),
    ("F#", "Gb"),
    ("G#", "Ab"),
    ("A#", "Bb"),
];

/// A chromatic pitch class (0-11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    #[serde(rename = "C#")]
    Cs, // C# / Db
    D,
    #[serde(rename = "D#")]
    Ds, // D# / Eb
    E,
    F,
    #[serde(rename = "F#")]
    Fs, // F# / Gb
    G,
    #[serde(rename = "G#")]
    Gs, // G# / Ab
    A,
    #[serde(rename = "A#")]
    As, // A# / Bb
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Get the chromatic index (0-11)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Get pitch class from a chromatic index, wrapping at 12
    pub fn from_index(index: u8) -> Self {
        PitchClass::ALL[(index % 12) as usize]
    }

    /// Parse one of the 17 conventional spellings (naturals, sharps and the
    /// five common flats). Case-sensitive: `"bb"` is not B-flat.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if let Some(i) = SHARP_LABELS.iter().position(|&l| l == label) {
            return Some(PitchClass::ALL[i]);
        }
        FLAT_LABELS
            .iter()
            .position(|&l| l == label)
            .map(|i| PitchClass::ALL[i])
    }

    /// Transpose by semitones (either direction)
    pub fn transpose(self, semitones: Semitones) -> Self {
        let index = (self.index() as i32 + semitones.rem_euclid(12)).rem_euclid(12);
        PitchClass::from_index(index as u8)
    }

    /// Get interval in semitones to another pitch class (ascending)
    pub fn interval_to(self, other: PitchClass) -> u8 {
        (other.index() as i16 - self.index() as i16).rem_euclid(12) as u8
    }

    /// Canonical (sharp) label
    pub fn label(self) -> &'static str {
        SHARP_LABELS[self.index() as usize]
    }

    /// Flat label, for display in flat keys
    pub fn flat_label(self) -> &'static str {
        FLAT_LABELS[self.index() as usize]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Index of a note label, if it is one of the 17 recognised spellings
pub fn index_of(label: &str) -> Option<u8> {
    PitchClass::from_label(label).map(PitchClass::index)
}

/// Canonical sharp label for an index (wraps at 12)
pub fn label_of(index: u8) -> &'static str {
    SHARP_LABELS[(index % 12) as usize]
}

/// Split the leading root token (`[A-G]` with an optional `#` or `b`) from a
/// note or chord label. Returns `None` when the text does not start with a
/// note letter.
pub fn split_root(text: &str) -> Option<(&str, &str)> {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, 'A'..='G')) => {}
        _ => return None,
    }
    let end = match chars.next() {
        Some((i, '#')) | Some((i, 'b')) => i + 1,
        Some((i, _)) => i,
        None => text.len(),
    };
    Some(text.split_at(end))
}

/// Rewrite a leading flat spelling (`Db`, `Eb`, `Gb`, `Ab`, `Bb`) to its sharp
/// equivalent. Anything after the root (a chord suffix, say) is kept verbatim
/// and labels without one of those five roots come back unchanged.
pub fn normalize_enharmonic(label: &str) -> String {
    respell(label, |root| {
        ENHARMONIC_PAIRS
            .iter()
            .find(|(_, flat)| *flat == root)
            .map(|(sharp, _)| *sharp)
    })
}

/// Inverse of [`normalize_enharmonic`]: rewrite a leading sharp root to its
/// flat partner (`C#`→`Db`, `D#`→`Eb`, `F#`→`Gb`, `G#`→`Ab`, `A#`→`Bb`).
pub fn flat_spelling(label: &str) -> String {
    respell(label, |root| {
        ENHARMONIC_PAIRS
            .iter()
            .find(|(sharp, _)| *sharp == root)
            .map(|(_, flat)| *flat)
    })
}

fn respell(label: &str, swap: impl Fn(&str) -> Option<&'static str>) -> String {
    match split_root(label) {
        Some((root, rest)) => match swap(root) {
            Some(replacement) => format!("{}{}", replacement, rest),
            None => label.to_string(),
        },
        None => label.to_string(),
    }
}
