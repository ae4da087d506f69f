// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Built-in reference chord sheets.
//!
//! A read-only catalog of common voicings (open, barre, power and octave
//! shapes) that can be browsed by name and voicing type, or copied into the
//! user's chord library.

use crate::music::chord_name::ChordQuality;
use crate::music::fretboard::STRING_COUNT;
use crate::music::pitch::PitchClass;

use super::model::{ChordVoicing, FretValue, VoicingKind};

const X: FretValue = FretValue::Muted;

const fn f(n: u8) -> FretValue {
    if n == 0 {
        FretValue::Open
    } else {
        FretValue::Fretted(n)
    }
}

/// One shape of a reference chord. Fingering uses finger numbers 1-4, with
/// `x` for strings that are muted or played open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceVoicing {
    pub name: &'static str,
    pub kind: VoicingKind,
    /// Low E to high e
    pub frets: [FretValue; STRING_COUNT],
    pub fingering: [FretValue; STRING_COUNT],
    /// Starting fret for barre shapes
    pub position: Option<u8>,
}

/// A chord and its reference shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceChord {
    pub name: &'static str,
    pub root: PitchClass,
    pub quality: ChordQuality,
    pub voicings: &'static [ReferenceVoicing],
}

impl ReferenceVoicing {
    /// Library record for this shape. Power shapes take the power-chord
    /// quality; the rest take the chord's own.
    pub fn to_chord_voicing(&self, chord: &ReferenceChord, id: impl Into<String>) -> ChordVoicing {
        let quality = match self.kind {
            VoicingKind::Power => ChordQuality::Power,
            _ => chord.quality,
        };
        ChordVoicing {
            id: id.into(),
            name: self.name.to_string(),
            root_note: chord.root.label().to_string(),
            chord_quality: quality.label().to_string(),
            chord_voicing: self.kind,
            frets: self.frets,
            fingering: self.fingering,
            position: self.position.unwrap_or(1),
        }
    }
}

pub static REFERENCE_CHORDS: [ReferenceChord; 6] = [
    ReferenceChord {
        name: "C Major",
        root: PitchClass::C,
        quality: ChordQuality::Major,
        voicings: &[
            ReferenceVoicing {
                name: "Open C",
                kind: VoicingKind::Open,
                frets: [X, f(3), f(2), f(0), f(1), f(0)],
                fingering: [X, f(3), f(2), X, f(1), X],
                position: None,
            },
            ReferenceVoicing {
                name: "C Barre (8th fret)",
                kind: VoicingKind::Barre,
                frets: [f(8), f(8), f(10), f(10), f(9), f(8)],
                fingering: [f(1), f(1), f(3), f(4), f(2), f(1)],
                position: Some(8),
            },
            ReferenceVoicing {
                name: "C Power Chord",
                kind: VoicingKind::Power,
                frets: [X, f(3), f(5), f(5), X, X],
                fingering: [X, f(1), f(3), f(4), X, X],
                position: None,
            },
        ],
    },
    ReferenceChord {
        name: "G Major",
        root: PitchClass::G,
        quality: ChordQuality::Major,
        voicings: &[
            ReferenceVoicing {
                name: "Open G",
                kind: VoicingKind::Open,
                frets: [f(3), f(2), f(0), f(0), f(3), f(3)],
                fingering: [f(3), f(1), X, X, f(3), f(4)],
                position: None,
            },
            ReferenceVoicing {
                name: "G Barre (3rd fret)",
                kind: VoicingKind::Barre,
                frets: [f(3), f(5), f(5), f(4), f(3), f(3)],
                fingering: [f(1), f(3), f(4), f(2), f(1), f(1)],
                position: Some(3),
            },
            ReferenceVoicing {
                name: "G Power Chord",
                kind: VoicingKind::Power,
                frets: [f(3), f(5), f(5), X, X, X],
                fingering: [f(1), f(3), f(4), X, X, X],
                position: None,
            },
        ],
    },
    ReferenceChord {
        name: "A Minor",
        root: PitchClass::A,
        quality: ChordQuality::Minor,
        voicings: &[
            ReferenceVoicing {
                name: "Open Am",
                kind: VoicingKind::Open,
                frets: [X, f(0), f(2), f(2), f(1), f(0)],
                fingering: [X, X, f(2), f(3), f(1), X],
                position: None,
            },
            ReferenceVoicing {
                name: "Am Barre (5th fret)",
                kind: VoicingKind::Barre,
                frets: [f(5), f(7), f(7), f(5), f(5), f(5)],
                fingering: [f(1), f(3), f(4), f(1), f(1), f(1)],
                position: Some(5),
            },
            ReferenceVoicing {
                name: "Am Power Chord",
                kind: VoicingKind::Power,
                frets: [X, f(0), f(2), f(2), X, X],
                fingering: [X, X, f(1), f(2), X, X],
                position: None,
            },
        ],
    },
    ReferenceChord {
        name: "F Major",
        root: PitchClass::F,
        quality: ChordQuality::Major,
        voicings: &[
            ReferenceVoicing {
                name: "F Barre (1st fret)",
                kind: VoicingKind::Barre,
                frets: [f(1), f(3), f(3), f(2), f(1), f(1)],
                fingering: [f(1), f(3), f(4), f(2), f(1), f(1)],
                position: Some(1),
            },
            ReferenceVoicing {
                name: "F Power Chord",
                kind: VoicingKind::Power,
                frets: [f(1), f(3), f(3), X, X, X],
                fingering: [f(1), f(3), f(4), X, X, X],
                position: None,
            },
            ReferenceVoicing {
                name: "Easy F",
                kind: VoicingKind::Open,
                frets: [f(1), X, f(3), f(2), f(1), f(1)],
                fingering: [f(1), X, f(4), f(3), f(1), f(1)],
                position: None,
            },
        ],
    },
    ReferenceChord {
        name: "D Major",
        root: PitchClass::D,
        quality: ChordQuality::Major,
        voicings: &[
            ReferenceVoicing {
                name: "Open D",
                kind: VoicingKind::Open,
                frets: [X, X, f(0), f(2), f(3), f(2)],
                fingering: [X, X, X, f(1), f(3), f(2)],
                position: None,
            },
            ReferenceVoicing {
                name: "D Barre (10th fret)",
                kind: VoicingKind::Barre,
                frets: [f(10), f(12), f(12), f(11), f(10), f(10)],
                fingering: [f(1), f(3), f(4), f(2), f(1), f(1)],
                position: Some(10),
            },
            ReferenceVoicing {
                name: "D Power Chord",
                kind: VoicingKind::Power,
                frets: [X, X, f(0), f(2), f(3), X],
                fingering: [X, X, X, f(1), f(2), X],
                position: None,
            },
        ],
    },
    ReferenceChord {
        name: "E Major",
        root: PitchClass::E,
        quality: ChordQuality::Major,
        voicings: &[
            ReferenceVoicing {
                name: "Open E",
                kind: VoicingKind::Open,
                frets: [f(0), f(2), f(2), f(1), f(0), f(0)],
                fingering: [X, f(2), f(3), f(1), X, X],
                position: None,
            },
            ReferenceVoicing {
                name: "E Barre (12th fret)",
                kind: VoicingKind::Barre,
                frets: [f(12), f(14), f(14), f(13), f(12), f(12)],
                fingering: [f(1), f(3), f(4), f(2), f(1), f(1)],
                position: Some(12),
            },
            ReferenceVoicing {
                name: "E Power Chord",
                kind: VoicingKind::Power,
                frets: [f(0), f(2), f(2), X, X, X],
                fingering: [X, f(1), f(2), X, X, X],
                position: None,
            },
        ],
    },
];

/// A reference chord with the shapes that passed a voicing filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMatch {
    pub chord: &'static ReferenceChord,
    pub voicings: Vec<&'static ReferenceVoicing>,
}

/// Chords whose name contains `term` (ignoring case), keeping only shapes of
/// the given kind. Chords left with no shapes are dropped.
pub fn browse(term: &str, kind: Option<VoicingKind>) -> Vec<ReferenceMatch> {
    let term = term.trim().to_lowercase();
    REFERENCE_CHORDS
        .iter()
        .filter(|chord| chord.name.to_lowercase().contains(&term))
        .map(|chord| ReferenceMatch {
            chord,
            voicings: chord
                .voicings
                .iter()
                .filter(|v| kind.map_or(true, |k| v.kind == k))
                .collect(),
        })
        .filter(|m| !m.voicings.is_empty())
        .collect()
}

/// Look up a shape by its exact name, ignoring case ("open am")
pub fn find_voicing(name: &str) -> Option<(&'static ReferenceChord, &'static ReferenceVoicing)> {
    let name = name.trim();
    REFERENCE_CHORDS.iter().find_map(|chord| {
        chord
            .voicings
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .map(|v| (chord, v))
    })
}
