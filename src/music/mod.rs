// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities for Corduroy.
//!
//! Pitch classes and enharmonic spelling, chord-symbol parsing,
//! transposition and capo charts, diatonic key matching, scales and
//! fretboard projection.

pub mod chord_name;
pub mod fretboard;
pub mod keys;
pub mod pitch;
pub mod scale;
pub mod transpose;

pub use chord_name::{chord_symbol, ChordName, ChordQuality, Triad};
pub use fretboard::{position_cells, FretCell, PositionCache, StringCells, Tuning, FRET_COUNT};
pub use keys::{chords_in_key, keys_containing, matches_degree, DegreeMatch, DiatonicKey, NamedChord};
pub use pitch::{flat_spelling, index_of, label_of, normalize_enharmonic, PitchClass, Semitones};
pub use scale::{catalog, CustomScaleDefinition, Scale, ScaleChart, ScalePosition, ScaleRegistry, ScaleType};
pub use transpose::{transpose, transpose_progression, CapoChart, CapoOutOfRange, MAX_CAPO_FRET};
