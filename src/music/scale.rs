// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale definitions and the built-in scale sheets.
//!
//! Provides scale types with their interval sets, rooted scales, the
//! authored catalog of fretboard scale charts and a registry for custom
//! scales loaded from configuration.

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::pitch::{PitchClass, Semitones};

/// Scale types supported by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    // Major scale and modes
    Major,        // Ionian
    Dorian,       // Minor with raised 6th
    Phrygian,     // Minor with lowered 2nd
    Lydian,       // Major with raised 4th
    Mixolydian,   // Major with lowered 7th
    NaturalMinor, // Aeolian
    Locrian,      // Diminished

    // Other minor scales
    HarmonicMinor,
    MelodicMinor, // Ascending form

    // Pentatonic scales
    MajorPentatonic,
    MinorPentatonic,

    // Blues
    Blues,
    MajorBlues,

    // Symmetric scales
    WholeTone,
    Chromatic,

    // Custom scale from intervals
    Custom,
}

impl ScaleType {
    /// Get the intervals (semitones from root) for this scale type
    pub fn intervals(self) -> Vec<u8> {
        match self {
            ScaleType::Major => vec![0, 2, 4, 5, 7, 9, 11],
            ScaleType::Dorian => vec![0, 2, 3, 5, 7, 9, 10],
            ScaleType::Phrygian => vec![0, 1, 3, 5, 7, 8, 10],
            ScaleType::Lydian => vec![0, 2, 4, 6, 7, 9, 11],
            ScaleType::Mixolydian => vec![0, 2, 4, 5, 7, 9, 10],
            ScaleType::NaturalMinor => vec![0, 2, 3, 5, 7, 8, 10],
            ScaleType::Locrian => vec![0, 1, 3, 5, 6, 8, 10],

            ScaleType::HarmonicMinor => vec![0, 2, 3, 5, 7, 8, 11],
            ScaleType::MelodicMinor => vec![0, 2, 3, 5, 7, 9, 11],

            ScaleType::MajorPentatonic => vec![0, 2, 4, 7, 9],
            ScaleType::MinorPentatonic => vec![0, 3, 5, 7, 10],

            ScaleType::Blues => vec![0, 3, 5, 6, 7, 10],
            ScaleType::MajorBlues => vec![0, 2, 3, 4, 7, 9],

            ScaleType::WholeTone => vec![0, 2, 4, 6, 8, 10],
            ScaleType::Chromatic => vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],

            ScaleType::Custom => vec![], // Custom scales define their own
        }
    }

    /// Parse scale type from string
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        match s.as_str() {
            "major" | "ionian" => Some(ScaleType::Major),
            "dorian" => Some(ScaleType::Dorian),
            "phrygian" => Some(ScaleType::Phrygian),
            "lydian" => Some(ScaleType::Lydian),
            "mixolydian" => Some(ScaleType::Mixolydian),
            "minor" | "naturalminor" | "aeolian" => Some(ScaleType::NaturalMinor),
            "locrian" => Some(ScaleType::Locrian),
            "harmonicminor" => Some(ScaleType::HarmonicMinor),
            "melodicminor" => Some(ScaleType::MelodicMinor),
            "majorpentatonic" | "pentatonicmajor" => Some(ScaleType::MajorPentatonic),
            "minorpentatonic" | "pentatonicminor" | "pentatonic" => Some(ScaleType::MinorPentatonic),
            "blues" | "minorblues" => Some(ScaleType::Blues),
            "majorblues" => Some(ScaleType::MajorBlues),
            "wholetone" => Some(ScaleType::WholeTone),
            "chromatic" => Some(ScaleType::Chromatic),
            _ => None,
        }
    }

    /// Get a human-readable name for this scale type
    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "Major",
            ScaleType::Dorian => "Dorian",
            ScaleType::Phrygian => "Phrygian",
            ScaleType::Lydian => "Lydian",
            ScaleType::Mixolydian => "Mixolydian",
            ScaleType::NaturalMinor => "Natural Minor",
            ScaleType::Locrian => "Locrian",
            ScaleType::HarmonicMinor => "Harmonic Minor",
            ScaleType::MelodicMinor => "Melodic Minor",
            ScaleType::MajorPentatonic => "Major Pentatonic",
            ScaleType::MinorPentatonic => "Minor Pentatonic",
            ScaleType::Blues => "Blues",
            ScaleType::MajorBlues => "Major Blues",
            ScaleType::WholeTone => "Whole Tone",
            ScaleType::Chromatic => "Chromatic",
            ScaleType::Custom => "Custom",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Step legend for a set of intervals ("W-W-H-W-W-W-H").
///
/// Each gap between consecutive tones, including the wrap back to the
/// octave, is written as `H` (one semitone), `W` (two) or `<n>H`.
pub fn step_pattern(intervals: &[u8]) -> String {
    if intervals.is_empty() {
        return String::new();
    }
    let mut steps = Vec::with_capacity(intervals.len());
    for (i, &from) in intervals.iter().enumerate() {
        let to = intervals.get(i + 1).copied().unwrap_or(12);
        steps.push(match to.saturating_sub(from) {
            1 => "H".to_string(),
            2 => "W".to_string(),
            n => format!("{}H", n),
        });
    }
    steps.join("-")
}

/// A complete scale with root and type
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    root: PitchClass,
    scale_type: ScaleType,
    intervals: Vec<u8>,
    notes: Vec<PitchClass>,
}

impl Scale {
    /// Create a new scale from root and type
    pub fn new(root: PitchClass, scale_type: ScaleType) -> Self {
        Self::build(root, scale_type, scale_type.intervals())
    }

    /// Create a custom scale from root and intervals
    pub fn custom(root: PitchClass, intervals: Vec<u8>) -> Self {
        Self::build(root, ScaleType::Custom, intervals)
    }

    fn build(root: PitchClass, scale_type: ScaleType, intervals: Vec<u8>) -> Self {
        let notes = intervals
            .iter()
            .map(|&i| root.transpose(i as Semitones))
            .collect();

        Self {
            root,
            scale_type,
            intervals,
            notes,
        }
    }

    /// Get the root note
    pub fn root(&self) -> PitchClass {
        self.root
    }

    /// Get the scale type
    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Get the intervals (semitones from root)
    pub fn intervals(&self) -> &[u8] {
        &self.intervals
    }

    /// Get the notes in this scale
    pub fn notes(&self) -> &[PitchClass] {
        &self.notes
    }

    /// Get the number of notes in this scale
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Check if this scale is empty (shouldn't happen normally)
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Check if a note is in this scale
    pub fn contains(&self, note: PitchClass) -> bool {
        self.notes.contains(&note)
    }

    /// Step legend for this scale
    pub fn step_pattern(&self) -> String {
        step_pattern(&self.intervals)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.scale_type)
    }
}

/// Frets past the starting fret covered by a box position
pub const POSITION_SPAN: u8 = 4;

/// One fingering position of a scale chart: a window of frets and the
/// interval offsets played inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalePosition {
    /// Position number (1-based)
    pub number: u8,
    /// Lowest fret of the position
    pub start_fret: u8,
    /// Highest fret of the position
    pub end_fret: u8,
    /// Interval offsets (from the root) played in this position
    pub pattern: Vec<u8>,
}

impl ScalePosition {
    /// Frets of the window, inclusive
    pub fn frets(&self) -> RangeInclusive<u8> {
        self.start_fret..=self.end_fret
    }

    pub fn covers(&self, fret: u8) -> bool {
        self.frets().contains(&fret)
    }
}

/// A named scale with its fretboard positions
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleChart {
    name: String,
    scale: Scale,
    positions: Vec<ScalePosition>,
}

impl ScaleChart {
    /// Create a chart from inclusive `(start, end)` fret windows, one per
    /// position. Every position plays the whole scale inside its window.
    pub fn new(name: impl Into<String>, scale: Scale, windows: &[(u8, u8)]) -> Self {
        let positions = windows
            .iter()
            .enumerate()
            .map(|(i, &(start_fret, end_fret))| ScalePosition {
                number: i as u8 + 1,
                start_fret,
                end_fret,
                pattern: scale.intervals().to_vec(),
            })
            .collect();
        Self {
            name: name.into(),
            scale,
            positions,
        }
    }

    /// Box positions for any scale: one window of `POSITION_SPAN` frets
    /// starting on each scale tone of the lowest string, lowest first
    pub fn boxes(name: impl Into<String>, scale: Scale, lowest_string: PitchClass) -> Self {
        let mut starts: Vec<u8> = scale
            .notes()
            .iter()
            .map(|&note| lowest_string.interval_to(note))
            .collect();
        starts.sort_unstable();
        starts.dedup();
        let windows: Vec<(u8, u8)> = starts
            .into_iter()
            .map(|start| (start, start + POSITION_SPAN))
            .collect();
        Self::new(name, scale, &windows)
    }

    /// Chart name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying scale
    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    /// Positions in order
    pub fn positions(&self) -> &[ScalePosition] {
        &self.positions
    }

    /// Position by 1-based number
    pub fn position(&self, number: u8) -> Option<&ScalePosition> {
        self.positions.iter().find(|p| p.number == number)
    }
}

/// The built-in scale sheets
pub fn catalog() -> Vec<ScaleChart> {
    vec![
        ScaleChart::new(
            "C Major Scale (Ionian)",
            Scale::new(PitchClass::C, ScaleType::Major),
            &[(0, 3), (2, 5)],
        ),
        ScaleChart::new(
            "A Minor Scale (Natural Minor)",
            Scale::new(PitchClass::A, ScaleType::NaturalMinor),
            &[(0, 3), (5, 8)],
        ),
        ScaleChart::new(
            "G Major Pentatonic",
            Scale::new(PitchClass::G, ScaleType::MajorPentatonic),
            &[(2, 5), (7, 10)],
        ),
        ScaleChart::new(
            "E Minor Pentatonic",
            Scale::new(PitchClass::E, ScaleType::MinorPentatonic),
            &[(0, 3), (12, 15)],
        ),
        ScaleChart::new(
            "C Major Pentatonic",
            Scale::new(PitchClass::C, ScaleType::MajorPentatonic),
            &[(0, 3), (7, 10)],
        ),
        ScaleChart::new(
            "A Blues Scale",
            Scale::new(PitchClass::A, ScaleType::Blues),
            &[(0, 3), (5, 8)],
        ),
    ]
}

/// Find catalog charts whose name contains the search text (case-insensitive)
pub fn search_catalog(term: &str) -> Vec<ScaleChart> {
    let term = term.to_lowercase();
    catalog()
        .into_iter()
        .filter(|chart| chart.name.to_lowercase().contains(&term))
        .collect()
}

/// Custom scale definitions that can be loaded from config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomScaleDefinition {
    /// Name of the scale
    pub name: String,
    /// Intervals from root (semitones)
    pub intervals: Vec<u8>,
}

impl CustomScaleDefinition {
    /// Create a scale from this definition
    pub fn to_scale(&self, root: PitchClass) -> Scale {
        Scale::custom(root, self.intervals.clone())
    }

    /// Intervals must start at the root, ascend, and stay within the octave
    pub fn is_valid(&self) -> bool {
        self.intervals.first() == Some(&0)
            && self.intervals.windows(2).all(|w| w[0] < w[1])
            && self.intervals.iter().all(|&i| i < 12)
    }
}

/// Registry for custom scale definitions
#[derive(Debug, Clone, Default)]
pub struct ScaleRegistry {
    custom_scales: HashMap<String, CustomScaleDefinition>,
}

impl ScaleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom scale. Invalid interval sets are rejected.
    pub fn register(&mut self, def: CustomScaleDefinition) -> bool {
        if !def.is_valid() {
            tracing::warn!(scale = %def.name, "ignoring custom scale with invalid intervals");
            return false;
        }
        self.custom_scales.insert(def.name.clone(), def);
        true
    }

    /// Get a scale by name (checks custom first, then built-in)
    pub fn get_scale(&self, root: PitchClass, name: &str) -> Option<Scale> {
        if let Some(def) = self.custom_scales.get(name) {
            return Some(def.to_scale(root));
        }

        ScaleType::parse(name).map(|st| Scale::new(root, st))
    }

    /// List all available scale names
    pub fn available_scales(&self) -> Vec<String> {
        let mut names: Vec<String> = self.custom_scales.keys().cloned().collect();

        let built_in = [
            "major",
            "dorian",
            "phrygian",
            "lydian",
            "mixolydian",
            "minor",
            "locrian",
            "harmonic_minor",
            "melodic_minor",
            "major_pentatonic",
            "minor_pentatonic",
            "blues",
            "major_blues",
            "whole_tone",
            "chromatic",
        ];

        names.extend(built_in.iter().map(|s| s.to_string()));
        names.sort();
        names.dedup();
        names
    }
}
