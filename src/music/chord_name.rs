// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord symbol parsing.
//!
//! A chord symbol is a root token (`[A-G]` plus an optional `#`/`b`) followed
//! by a free-text suffix. The suffix is scanned for quality markers in a fixed
//! priority order so that `maj7` is never read as minor and `dim` never
//! donates its `m`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pitch::{split_root, PitchClass};

/// Chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Dominant7,
    Maj7,
    Min7,
    Sus2,
    Sus4,
    Power,
    Custom,
}

/// Triad colour used when comparing against diatonic key tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Triad {
    Major,
    Minor,
    Diminished,
}

impl ChordQuality {
    /// Every quality, in the order the chord builder offers them
    pub const ALL: [ChordQuality; 11] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Maj7,
        ChordQuality::Min7,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
        ChordQuality::Dominant7,
        ChordQuality::Power,
        ChordQuality::Custom,
    ];

    /// Infer a quality from the text following the root.
    ///
    /// Markers are checked in priority order: `maj`/`Maj`, `m`/`min`
    /// (`m7`/`min7` refine to [`ChordQuality::Min7`]), `dim`, `aug`, `7`.
    /// After those come `sus2`, `sus4`/`sus` and a bare `5`. No marker means
    /// a plain major triad.
    pub fn from_suffix(suffix: &str) -> Self {
        if suffix.contains("maj") || suffix.contains("Maj") {
            return ChordQuality::Maj7;
        }
        if has_minor_marker(suffix) {
            return if suffix.contains('7') {
                ChordQuality::Min7
            } else {
                ChordQuality::Minor
            };
        }
        if suffix.contains("dim") {
            return ChordQuality::Diminished;
        }
        if suffix.contains("aug") || suffix.starts_with('+') {
            return ChordQuality::Augmented;
        }
        if suffix.contains('7') {
            return ChordQuality::Dominant7;
        }
        if suffix.contains("sus2") {
            return ChordQuality::Sus2;
        }
        if suffix.contains("sus") {
            return ChordQuality::Sus4;
        }
        if suffix == "5" {
            return ChordQuality::Power;
        }
        ChordQuality::Major
    }

    /// Parse a chord-builder quality label ("Major", "Min7", "Power Chord", ...).
    /// Extended chords ("9", "13") and anything unrecognised are `Custom`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "major" | "maj" => ChordQuality::Major,
            "minor" | "min" => ChordQuality::Minor,
            "maj7" => ChordQuality::Maj7,
            "min7" | "m7" => ChordQuality::Min7,
            "diminished" | "dim" => ChordQuality::Diminished,
            "augmented" | "aug" => ChordQuality::Augmented,
            "sus2" => ChordQuality::Sus2,
            "sus4" | "sus" => ChordQuality::Sus4,
            "7" | "dominant7" | "dom7" => ChordQuality::Dominant7,
            "power chord" | "power" | "5" => ChordQuality::Power,
            _ => ChordQuality::Custom,
        }
    }

    /// Builder label for this quality
    pub fn label(self) -> &'static str {
        match self {
            ChordQuality::Major => "Major",
            ChordQuality::Minor => "Minor",
            ChordQuality::Diminished => "Diminished",
            ChordQuality::Augmented => "Augmented",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Maj7 => "Maj7",
            ChordQuality::Min7 => "Min7",
            ChordQuality::Sus2 => "Sus2",
            ChordQuality::Sus4 => "Sus4",
            ChordQuality::Power => "Power Chord",
            ChordQuality::Custom => "Custom",
        }
    }

    /// Conventional chord-symbol suffix
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major | ChordQuality::Custom => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Maj7 => "maj7",
            ChordQuality::Min7 => "m7",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Power => "5",
        }
    }

    /// Collapse to a diatonic triad colour. Only plain major, minor and
    /// diminished chords have one.
    pub fn triad(self) -> Option<Triad> {
        match self {
            ChordQuality::Major => Some(Triad::Major),
            ChordQuality::Minor => Some(Triad::Minor),
            ChordQuality::Diminished => Some(Triad::Diminished),
            _ => None,
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `m` or `min` that is not part of `maj` or `dim`
fn has_minor_marker(suffix: &str) -> bool {
    suffix.match_indices('m').any(|(i, _)| {
        let before = &suffix[..i];
        let after = &suffix[i..];
        !before.ends_with("di") && !after.starts_with("maj")
    })
}

/// A chord symbol split into root and suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordName<'a> {
    /// Root pitch class, `None` when the text has no recognisable root
    pub root: Option<PitchClass>,
    /// The literal root token as written (`"Bb"`, `"F#"`), empty when opaque
    pub root_text: &'a str,
    /// Everything after the root token, verbatim. The whole text when opaque.
    pub suffix: &'a str,
    /// Inferred quality
    pub quality: ChordQuality,
}

impl<'a> ChordName<'a> {
    /// Parse a chord symbol. Never fails; unrecognised text comes back opaque.
    pub fn parse(text: &'a str) -> Self {
        match split_root(text) {
            Some((root_text, suffix)) => match PitchClass::from_label(root_text) {
                Some(root) => ChordName {
                    root: Some(root),
                    root_text,
                    suffix,
                    quality: ChordQuality::from_suffix(suffix),
                },
                None => Self::opaque(text),
            },
            None => Self::opaque(text),
        }
    }

    fn opaque(text: &'a str) -> Self {
        ChordName {
            root: None,
            root_text: "",
            suffix: text,
            quality: ChordQuality::Major,
        }
    }

    /// Whether a root was recognised
    pub fn is_parsed(&self) -> bool {
        self.root.is_some()
    }
}

/// Build a chord symbol ("C#m", "Gsus4") from a root and quality
pub fn chord_symbol(root: PitchClass, quality: ChordQuality) -> String {
    format!("{}{}", root, quality.suffix())
}
