// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Fretboard projection of scales.
//!
//! Computes which (string, fret) cells of a six-string neck belong to a scale
//! position. Pure and deterministic; [`PositionCache`] memoises results for
//! views that redraw often.

use std::collections::HashMap;

use super::pitch::{PitchClass, Semitones};
use super::scale::ScaleChart;

/// Highest fret shown (the window is 0..=FRET_COUNT)
pub const FRET_COUNT: u8 = 15;

/// Number of strings
pub const STRING_COUNT: usize = 6;

/// Open-string pitch classes, low string first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tuning {
    pub name: &'static str,
    pub strings: [PitchClass; STRING_COUNT],
}

impl Tuning {
    /// Standard tuning, E A D G B E
    pub const STANDARD: Tuning = Tuning {
        name: "Standard",
        strings: [
            PitchClass::E,
            PitchClass::A,
            PitchClass::D,
            PitchClass::G,
            PitchClass::B,
            PitchClass::E,
        ],
    };

    /// Pitch class sounding at a fret. `string` 0 is the low string.
    pub fn note_at(&self, string: usize, fret: u8) -> Option<PitchClass> {
        self.strings
            .get(string)
            .map(|open| open.transpose(fret as Semitones))
    }

    /// String names as printed above a chord box ("E A D G B e")
    pub fn string_names(&self) -> [String; STRING_COUNT] {
        let mut names = self.strings.map(|pc| pc.to_string());
        names[STRING_COUNT - 1] = names[STRING_COUNT - 1].to_lowercase();
        names
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning::STANDARD
    }
}

/// One highlighted cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FretCell {
    pub fret: u8,
    pub note: PitchClass,
    pub is_root: bool,
}

/// Highlighted cells on one string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringCells {
    /// String index, 0 = low string
    pub string: usize,
    /// Open-string pitch class
    pub open: PitchClass,
    /// Cells in ascending fret order
    pub cells: Vec<FretCell>,
}

/// Cells of a scale position in standard tuning.
///
/// A fret is kept when its pitch class is in the scale (`root + interval`) and
/// its offset from the root is one of the position's pattern offsets.
pub fn position_cells(root: PitchClass, intervals: &[u8], pattern: &[u8]) -> Vec<StringCells> {
    position_cells_with_tuning(&Tuning::STANDARD, root, intervals, pattern)
}

/// [`position_cells`] for an arbitrary tuning
pub fn position_cells_with_tuning(
    tuning: &Tuning,
    root: PitchClass,
    intervals: &[u8],
    pattern: &[u8],
) -> Vec<StringCells> {
    let scale_notes: Vec<PitchClass> = intervals
        .iter()
        .map(|&i| root.transpose(i as Semitones))
        .collect();

    tuning
        .strings
        .iter()
        .enumerate()
        .map(|(string, &open)| {
            let cells = (0..=FRET_COUNT)
                .filter_map(|fret| {
                    let note = open.transpose(fret as Semitones);
                    if !scale_notes.contains(&note) {
                        return None;
                    }
                    if !pattern.contains(&root.interval_to(note)) {
                        return None;
                    }
                    Some(FretCell {
                        fret,
                        note,
                        is_root: note == root,
                    })
                })
                .collect();
            StringCells { string, open, cells }
        })
        .collect()
}

/// Cells for a numbered position of a chart, limited to the position's
/// fret window
pub fn chart_cells(chart: &ScaleChart, position: u8) -> Option<Vec<StringCells>> {
    let position = chart.position(position)?;
    let mut strings = position_cells(
        chart.scale().root(),
        chart.scale().intervals(),
        &position.pattern,
    );
    for string in &mut strings {
        string.cells.retain(|cell| position.covers(cell.fret));
    }
    Some(strings)
}

type CacheKey = (PitchClass, Vec<u8>, Vec<u8>);

/// Memoised [`position_cells`], keyed by root, scale and position pattern
#[derive(Debug, Default)]
pub struct PositionCache {
    entries: HashMap<CacheKey, Vec<StringCells>>,
}

impl PositionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells for a position, computed on first request
    pub fn get(&mut self, root: PitchClass, intervals: &[u8], pattern: &[u8]) -> &[StringCells] {
        self.entries
            .entry((root, intervals.to_vec(), pattern.to_vec()))
            .or_insert_with(|| position_cells(root, intervals, pattern))
    }

    /// Number of cached positions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached position
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::scale::catalog;

    const MINOR_PENTATONIC: [u8; 5] = [0, 3, 5, 7, 10];

    #[test]
    fn test_note_at() {
        let t = Tuning::STANDARD;
        assert_eq!(t.note_at(0, 0), Some(PitchClass::E));
        assert_eq!(t.note_at(0, 5), Some(PitchClass::A));
        assert_eq!(t.note_at(4, 1), Some(PitchClass::C));
        assert_eq!(t.note_at(6, 0), None);
    }

    #[test]
    fn test_string_names() {
        assert_eq!(Tuning::STANDARD.string_names().join(" "), "E A D G B e");
    }

    #[test]
    fn test_e_minor_pentatonic_roots() {
        let strings = position_cells(PitchClass::E, &MINOR_PENTATONIC, &MINOR_PENTATONIC);
        assert_eq!(strings.len(), 6);

        for outer in [0, 5] {
            let open = strings[outer].cells.first().unwrap();
            assert_eq!(open.fret, 0);
            assert!(open.is_root);
        }

        // Low E string: E G A B D E G A B D (0 3 5 7 10 12 15)
        let frets: Vec<u8> = strings[0].cells.iter().map(|c| c.fret).collect();
        assert_eq!(frets, vec![0, 3, 5, 7, 10, 12, 15]);
        assert!(strings[0].cells.iter().filter(|c| c.is_root).count() == 2);
    }

    #[test]
    fn test_cells_stay_in_window() {
        let strings = position_cells(PitchClass::C, &[0, 2, 4, 5, 7, 9, 11], &[0, 2, 4, 5, 7, 9, 11]);
        for s in &strings {
            assert!(s.cells.iter().all(|c| c.fret <= FRET_COUNT));
            assert!(s.cells.windows(2).all(|w| w[0].fret < w[1].fret));
        }
    }

    #[test]
    fn test_pattern_restricts_cells() {
        // Only root and fifth
        let strings = position_cells(PitchClass::A, &MINOR_PENTATONIC, &[0, 7]);
        for s in &strings {
            for cell in &s.cells {
                assert!(cell.note == PitchClass::A || cell.note == PitchClass::E);
            }
        }
        assert!(strings[0].cells.iter().any(|c| c.fret == 5 && c.is_root));
    }

    #[test]
    fn test_pattern_outside_scale_is_ignored() {
        // The tritone is not in the scale, so it never appears
        let strings = position_cells(PitchClass::E, &MINOR_PENTATONIC, &[6]);
        assert!(strings.iter().all(|s| s.cells.is_empty()));
    }

    #[test]
    fn test_chart_cells() {
        let charts = catalog();
        let blues = charts.iter().find(|c| c.name() == "A Blues Scale").unwrap();

        let open = chart_cells(blues, 1).unwrap();
        assert!(open[1].cells.iter().any(|c| c.fret == 0 && c.is_root));
        assert!(open.iter().flat_map(|s| &s.cells).all(|c| c.fret <= 3));

        let fifth = chart_cells(blues, 2).unwrap();
        assert!(fifth[0].cells.iter().any(|c| c.fret == 5 && c.is_root));
        // Low E string: A at 5, C at 8
        let low: Vec<u8> = fifth[0].cells.iter().map(|c| c.fret).collect();
        assert_eq!(low, vec![5, 8]);
        assert!(chart_cells(blues, 9).is_none());
    }

    #[test]
    fn test_catalog_positions_differ() {
        for chart in catalog() {
            let first = chart_cells(&chart, 1).unwrap();
            let second = chart_cells(&chart, 2).unwrap();
            assert_ne!(first, second, "{}", chart.name());
            for (number, strings) in [(1, &first), (2, &second)] {
                let position = chart.position(number).unwrap();
                assert!(strings
                    .iter()
                    .flat_map(|s| &s.cells)
                    .all(|c| position.covers(c.fret)));
            }
        }
    }

    #[test]
    fn test_c_major_open_position_matches_sheet() {
        let charts = catalog();
        let c_major = &charts[0];
        let strings = chart_cells(c_major, 1).unwrap();
        let frets: Vec<Vec<u8>> = strings
            .iter()
            .map(|s| s.cells.iter().map(|c| c.fret).collect())
            .collect();
        assert_eq!(
            frets,
            vec![
                vec![0, 1, 3],
                vec![0, 2, 3],
                vec![0, 2, 3],
                vec![0, 2],
                vec![0, 1, 3],
                vec![0, 1, 3],
            ]
        );
    }

    #[test]
    fn test_position_cache() {
        let mut cache = PositionCache::new();
        assert!(cache.is_empty());

        let first = cache.get(PitchClass::E, &MINOR_PENTATONIC, &MINOR_PENTATONIC).to_vec();
        let again = cache.get(PitchClass::E, &MINOR_PENTATONIC, &MINOR_PENTATONIC).to_vec();
        assert_eq!(first, again);
        assert_eq!(cache.len(), 1);

        cache.get(PitchClass::G, &MINOR_PENTATONIC, &MINOR_PENTATONIC);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
