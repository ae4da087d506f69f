// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Diatonic key table and key matching.
//!
//! Thirty keys (fifteen major, fifteen relative natural minor) each list their
//! seven diatonic triads in scale-degree order. A bare letter is a major triad,
//! a trailing `m` a minor triad and a trailing `dim` a diminished triad.
//! Spellings stay within the seventeen recognised note names, so theoretical
//! notes such as `E#` or `Cb` are written as their practical equivalents.

use super::chord_name::{ChordName, ChordQuality, Triad};
use super::pitch::{normalize_enharmonic, PitchClass};

/// Roman numerals for a major key
pub const MAJOR_NUMERALS: [&str; 7] = ["I", "ii", "iii", "IV", "V", "vi", "vii°"];

/// Roman numerals for a natural minor key
pub const MINOR_NUMERALS: [&str; 7] = ["i", "ii°", "III", "iv", "v", "VI", "VII"];

/// A key and its seven diatonic chords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiatonicKey {
    /// Key name ("C", "F#m")
    pub name: &'static str,
    /// Tonic pitch class
    pub root: PitchClass,
    /// Natural minor rather than major
    pub is_minor: bool,
    /// Degree chords I..VII (or i..VII)
    pub degree_chords: [&'static str; 7],
}

const fn major(name: &'static str, root: PitchClass, degree_chords: [&'static str; 7]) -> DiatonicKey {
    DiatonicKey {
        name,
        root,
        is_minor: false,
        degree_chords,
    }
}

const fn minor(name: &'static str, root: PitchClass, degree_chords: [&'static str; 7]) -> DiatonicKey {
    DiatonicKey {
        name,
        root,
        is_minor: true,
        degree_chords,
    }
}

/// All keys. Majors first, then their relative minors in the same order.
pub static KEYS: [DiatonicKey; 30] = [
    major("C", PitchClass::C, ["C", "Dm", "Em", "F", "G", "Am", "Bdim"]),
    major("G", PitchClass::G, ["G", "Am", "Bm", "C", "D", "Em", "F#dim"]),
    major("D", PitchClass::D, ["D", "Em", "F#m", "G", "A", "Bm", "C#dim"]),
    major("A", PitchClass::A, ["A", "Bm", "C#m", "D", "E", "F#m", "G#dim"]),
    major("E", PitchClass::E, ["E", "F#m", "G#m", "A", "B", "C#m", "D#dim"]),
    major("B", PitchClass::B, ["B", "C#m", "D#m", "E", "F#", "G#m", "A#dim"]),
    major("F#", PitchClass::Fs, ["F#", "G#m", "A#m", "B", "C#", "D#m", "Fdim"]),
    major("C#", PitchClass::Cs, ["C#", "D#m", "Fm", "F#", "G#", "A#m", "Cdim"]),
    major("F", PitchClass::F, ["F", "Gm", "Am", "Bb", "C", "Dm", "Edim"]),
    major("Bb", PitchClass::As, ["Bb", "Cm", "Dm", "Eb", "F", "Gm", "Adim"]),
    major("Eb", PitchClass::Ds, ["Eb", "Fm", "Gm", "Ab", "Bb", "Cm", "Ddim"]),
    major("Ab", PitchClass::Gs, ["Ab", "Bbm", "Cm", "Db", "Eb", "Fm", "Gdim"]),
    major("Db", PitchClass::Cs, ["Db", "Ebm", "Fm", "Gb", "Ab", "Bbm", "Cdim"]),
    major("Gb", PitchClass::Fs, ["Gb", "Abm", "Bbm", "B", "Db", "Ebm", "Fdim"]),
    major("Cb", PitchClass::B, ["B", "Dbm", "Ebm", "E", "Gb", "Abm", "Bbdim"]),
    minor("Am", PitchClass::A, ["Am", "Bdim", "C", "Dm", "Em", "F", "G"]),
    minor("Em", PitchClass::E, ["Em", "F#dim", "G", "Am", "Bm", "C", "D"]),
    minor("Bm", PitchClass::B, ["Bm", "C#dim", "D", "Em", "F#m", "G", "A"]),
    minor("F#m", PitchClass::Fs, ["F#m", "G#dim", "A", "Bm", "C#m", "D", "E"]),
    minor("C#m", PitchClass::Cs, ["C#m", "D#dim", "E", "F#m", "G#m", "A", "B"]),
    minor("G#m", PitchClass::Gs, ["G#m", "A#dim", "B", "C#m", "D#m", "E", "F#"]),
    minor("D#m", PitchClass::Ds, ["D#m", "Fdim", "F#", "G#m", "A#m", "B", "C#"]),
    minor("A#m", PitchClass::As, ["A#m", "Cdim", "C#", "D#m", "Fm", "F#", "G#"]),
    minor("Dm", PitchClass::D, ["Dm", "Edim", "F", "Gm", "Am", "Bb", "C"]),
    minor("Gm", PitchClass::G, ["Gm", "Adim", "Bb", "Cm", "Dm", "Eb", "F"]),
    minor("Cm", PitchClass::C, ["Cm", "Ddim", "Eb", "Fm", "Gm", "Ab", "Bb"]),
    minor("Fm", PitchClass::F, ["Fm", "Gdim", "Ab", "Bbm", "Cm", "Db", "Eb"]),
    minor("Bbm", PitchClass::As, ["Bbm", "Cdim", "Db", "Ebm", "Fm", "Gb", "Ab"]),
    minor("Ebm", PitchClass::Ds, ["Ebm", "Fdim", "Gb", "Abm", "Bbm", "B", "Db"]),
    minor("Abm", PitchClass::Gs, ["Abm", "Bbdim", "B", "Dbm", "Ebm", "E", "Gb"]),
];

const RELATIVE_OFFSET: usize = 15;

impl DiatonicKey {
    /// Look a key up by name. Exact names win; otherwise the name is compared
    /// after enharmonic normalisation, so `"A#"` finds `"Bb"`.
    pub fn find(name: &str) -> Option<&'static DiatonicKey> {
        let name = name.trim();
        KEYS.iter().find(|k| k.name == name).or_else(|| {
            let wanted = normalize_enharmonic(name);
            KEYS.iter().find(|k| normalize_enharmonic(k.name) == wanted)
        })
    }

    /// Roman numerals for this key's degrees
    pub fn numerals(&self) -> &'static [&'static str; 7] {
        if self.is_minor {
            &MINOR_NUMERALS
        } else {
            &MAJOR_NUMERALS
        }
    }

    /// Relative major/minor
    pub fn relative(&self) -> &'static DiatonicKey {
        let index = KEYS
            .iter()
            .position(|k| k.name == self.name)
            .unwrap_or_default();
        if index < RELATIVE_OFFSET {
            &KEYS[index + RELATIVE_OFFSET]
        } else {
            &KEYS[index - RELATIVE_OFFSET]
        }
    }
}

/// Triad colour of a degree-chord string from the key table
pub fn degree_triad(degree_chord: &str) -> Triad {
    if degree_chord.ends_with("dim") {
        Triad::Diminished
    } else if degree_chord.ends_with('m') {
        Triad::Minor
    } else {
        Triad::Major
    }
}

/// Anything that can be matched against a key's degree chords
pub trait NamedChord {
    /// Display name ("My Custom C", "Dm")
    fn name(&self) -> &str;

    /// Root pitch class, if known
    fn root_note(&self) -> Option<PitchClass>;

    /// Chord quality
    fn quality(&self) -> ChordQuality;
}

impl NamedChord for str {
    fn name(&self) -> &str {
        self
    }

    fn root_note(&self) -> Option<PitchClass> {
        ChordName::parse(self).root
    }

    fn quality(&self) -> ChordQuality {
        ChordName::parse(self).quality
    }
}

impl<T: NamedChord + ?Sized> NamedChord for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn root_note(&self) -> Option<PitchClass> {
        (**self).root_note()
    }

    fn quality(&self) -> ChordQuality {
        (**self).quality()
    }
}

/// Whether a chord satisfies a degree chord.
///
/// Tried in order: case-insensitive name match, structured match of
/// `(root, triad colour)`, then name match after enharmonic normalisation.
pub fn matches_degree<C: NamedChord + ?Sized>(chord: &C, degree_chord: &str) -> bool {
    let name = chord.name().trim();
    if name.eq_ignore_ascii_case(degree_chord) {
        return true;
    }

    let target = ChordName::parse(degree_chord);
    if let (Some(root), Some(target_root), Some(triad)) =
        (chord.root_note(), target.root, chord.quality().triad())
    {
        if root == target_root && triad == degree_triad(degree_chord) {
            return true;
        }
    }

    normalize_enharmonic(name) == normalize_enharmonic(degree_chord)
}

/// Library chords that satisfy one scale degree
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeMatch<'a, C> {
    /// Scale degree, 1-based
    pub degree: usize,
    /// Roman numeral
    pub numeral: &'static str,
    /// Degree chord from the key table
    pub chord: &'static str,
    /// Every matching library chord, in library order
    pub matches: Vec<&'a C>,
}

/// Group library chords under each degree of a key. Returns `None` for an
/// unknown key name. A chord may appear under more than one degree.
pub fn chords_in_key<'a, C: NamedChord>(
    library: &'a [C],
    key_name: &str,
) -> Option<Vec<DegreeMatch<'a, C>>> {
    let key = DiatonicKey::find(key_name)?;
    let matches = key
        .degree_chords
        .iter()
        .zip(key.numerals().iter())
        .enumerate()
        .map(|(i, (&chord, &numeral))| DegreeMatch {
            degree: i + 1,
            numeral,
            chord,
            matches: library.iter().filter(|c| matches_degree(*c, chord)).collect(),
        })
        .collect();
    Some(matches)
}

/// Keys in which a chord appears, with the degree (1-based) it occupies
pub fn keys_containing<C: NamedChord + ?Sized>(chord: &C) -> Vec<(&'static DiatonicKey, usize)> {
    KEYS.iter()
        .filter_map(|key| {
            key.degree_chords
                .iter()
                .position(|degree| matches_degree(chord, degree))
                .map(|i| (key, i + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestChord {
        name: &'static str,
        root: Option<PitchClass>,
        quality: ChordQuality,
    }

    impl NamedChord for TestChord {
        fn name(&self) -> &str {
            self.name
        }

        fn root_note(&self) -> Option<PitchClass> {
            self.root
        }

        fn quality(&self) -> ChordQuality {
            self.quality
        }
    }

    fn chord(name: &'static str, root: PitchClass, quality: ChordQuality) -> TestChord {
        TestChord {
            name,
            root: Some(root),
            quality,
        }
    }

    #[test]
    fn test_table_shape() {
        assert_eq!(KEYS.len(), 30);
        assert_eq!(KEYS.iter().filter(|k| k.is_minor).count(), 15);
    }

    #[test]
    fn test_table_is_diatonic() {
        use Triad::*;
        let major_steps = [0, 2, 4, 5, 7, 9, 11];
        let major_triads = [Major, Minor, Minor, Major, Major, Minor, Diminished];
        let minor_steps = [0, 2, 3, 5, 7, 8, 10];
        let minor_triads = [Minor, Diminished, Major, Minor, Minor, Major, Major];

        for key in KEYS.iter() {
            let (steps, triads) = if key.is_minor {
                (minor_steps, minor_triads)
            } else {
                (major_steps, major_triads)
            };
            for (i, degree) in key.degree_chords.iter().enumerate() {
                let parsed = ChordName::parse(degree);
                assert_eq!(
                    parsed.root,
                    Some(key.root.transpose(steps[i])),
                    "key {} degree {}",
                    key.name,
                    i + 1
                );
                assert_eq!(degree_triad(degree), triads[i], "key {} degree {}", key.name, i + 1);
            }
        }
    }

    #[test]
    fn test_find_key() {
        assert_eq!(DiatonicKey::find("C").map(|k| k.name), Some("C"));
        assert_eq!(DiatonicKey::find("F#m").map(|k| k.name), Some("F#m"));
        assert_eq!(DiatonicKey::find("Gb").map(|k| k.name), Some("Gb"));
        assert_eq!(DiatonicKey::find("A#").map(|k| k.name), Some("Bb"));
        assert_eq!(DiatonicKey::find("Ebm").map(|k| k.name), Some("Ebm"));
        assert!(DiatonicKey::find("H").is_none());
    }

    #[test]
    fn test_relative_keys() {
        let c = DiatonicKey::find("C").unwrap();
        assert_eq!(c.relative().name, "Am");
        assert_eq!(c.relative().relative().name, "C");
        assert_eq!(DiatonicKey::find("Cb").unwrap().relative().name, "Abm");
    }

    #[test]
    fn test_numerals() {
        assert_eq!(DiatonicKey::find("G").unwrap().numerals()[4], "V");
        assert_eq!(DiatonicKey::find("Em").unwrap().numerals()[1], "ii°");
    }

    #[test]
    fn test_matches_by_name_case_insensitive() {
        let c = chord("dm", PitchClass::D, ChordQuality::Custom);
        assert!(matches_degree(&c, "Dm"));
    }

    #[test]
    fn test_matches_structurally() {
        let c = chord("My Custom C", PitchClass::C, ChordQuality::Major);
        assert!(matches_degree(&c, "C"));
        assert!(!matches_degree(&c, "Cm"));

        let b = chord("B half", PitchClass::B, ChordQuality::Diminished);
        assert!(matches_degree(&b, "Bdim"));
    }

    #[test]
    fn test_matches_enharmonic_name() {
        assert!(matches_degree("A#m", "Bbm"));
        assert!(matches_degree("Db", "C#"));
        assert!(!matches_degree("Db", "D"));
    }

    #[test]
    fn test_seventh_does_not_match_triad_structurally() {
        let c = chord("Big G", PitchClass::G, ChordQuality::Dominant7);
        assert!(!matches_degree(&c, "G"));
    }

    #[test]
    fn test_chords_in_key_c() {
        let library = vec![
            chord("Dm", PitchClass::D, ChordQuality::Minor),
            chord("D", PitchClass::D, ChordQuality::Major),
        ];
        let degrees = chords_in_key(&library, "C").unwrap();
        assert_eq!(degrees.len(), 7);
        assert_eq!(degrees[1].numeral, "ii");
        assert_eq!(degrees[1].matches.len(), 1);
        assert_eq!(degrees[1].matches[0].name, "Dm");

        let placed_d = degrees
            .iter()
            .flat_map(|d| d.matches.iter())
            .filter(|c| c.name == "D")
            .count();
        assert_eq!(placed_d, 0);
    }

    #[test]
    fn test_chords_in_key_collects_all_voicings() {
        let library = vec![
            chord("Am", PitchClass::A, ChordQuality::Minor),
            chord("Am barre", PitchClass::A, ChordQuality::Minor),
            chord("G", PitchClass::G, ChordQuality::Major),
        ];
        let degrees = chords_in_key(&library, "C").unwrap();
        assert_eq!(degrees[5].matches.len(), 2);
        assert_eq!(degrees[4].matches.len(), 1);
    }

    #[test]
    fn test_chords_in_unknown_key() {
        let library: Vec<TestChord> = Vec::new();
        assert!(chords_in_key(&library, "Q").is_none());
    }

    #[test]
    fn test_keys_containing() {
        let keys = keys_containing("Em");
        let names: Vec<&str> = keys.iter().map(|(k, _)| k.name).collect();
        assert!(names.contains(&"C"));
        assert!(names.contains(&"G"));
        assert!(names.contains(&"Em"));
        assert!(!names.contains(&"F"));

        let (_, degree) = keys.iter().find(|(k, _)| k.name == "C").unwrap();
        assert_eq!(*degree, 3);
    }
}
