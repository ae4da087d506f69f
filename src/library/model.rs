// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Persisted records: chord voicings and jams.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::music::chord_name::{chord_symbol, ChordName, ChordQuality};
use crate::music::fretboard::{Tuning, STRING_COUNT};
use crate::music::keys::NamedChord;
use crate::music::pitch::{PitchClass, Semitones};
use crate::music::transpose::{transpose, MAX_CAPO_FRET};

/// Highest fret a voicing may use
pub const MAX_FRET: u8 = 24;

/// Highest starting position offered by the builder
pub const MAX_POSITION: u8 = 12;

/// What one string does in a voicing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FretValue {
    /// Not played ("x")
    #[default]
    Muted,
    /// Played open ("0")
    Open,
    /// Fretted at the given fret ("1".."24")
    Fretted(u8),
}

/// A fret string that is neither "x", "0" nor a fret number in range
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid fret value {0:?}; expected \"x\", \"0\" or a fret number up to {max}", max = MAX_FRET)]
pub struct InvalidFret(pub String);

impl FretValue {
    /// Value for a fret number, where 0 is the open string
    pub fn at(fret: u8) -> Self {
        if fret == 0 {
            FretValue::Open
        } else {
            FretValue::Fretted(fret)
        }
    }

    /// Fret number sounded, `None` when muted
    pub fn fret(self) -> Option<u8> {
        match self {
            FretValue::Muted => None,
            FretValue::Open => Some(0),
            FretValue::Fretted(n) => Some(n),
        }
    }

    pub fn is_muted(self) -> bool {
        self == FretValue::Muted
    }
}

impl FromStr for FretValue {
    type Err = InvalidFret;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(FretValue::Muted),
            "0" => Ok(FretValue::Open),
            other => match other.parse::<u8>() {
                Ok(n) if (1..=MAX_FRET).contains(&n) => Ok(FretValue::Fretted(n)),
                _ => Err(InvalidFret(s.to_string())),
            },
        }
    }
}

impl TryFrom<String> for FretValue {
    type Error = InvalidFret;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FretValue> for String {
    fn from(value: FretValue) -> Self {
        value.to_string()
    }
}

impl fmt::Display for FretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FretValue::Muted => f.write_str("x"),
            FretValue::Open => f.write_str("0"),
            FretValue::Fretted(n) => write!(f, "{}", n),
        }
    }
}

/// All six strings muted
pub fn muted_strings() -> [FretValue; STRING_COUNT] {
    [FretValue::Muted; STRING_COUNT]
}

/// Voicing style chosen in the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VoicingKind {
    Open,
    Barre,
    Power,
    Octave,
    Triad,
    #[default]
    Custom,
}

impl VoicingKind {
    pub const ALL: [VoicingKind; 6] = [
        VoicingKind::Open,
        VoicingKind::Barre,
        VoicingKind::Power,
        VoicingKind::Octave,
        VoicingKind::Triad,
        VoicingKind::Custom,
    ];

    /// Parse a voicing label, case-insensitively
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "open" => Some(VoicingKind::Open),
            "barre" | "bar" => Some(VoicingKind::Barre),
            "power" => Some(VoicingKind::Power),
            "octave" => Some(VoicingKind::Octave),
            "triad" => Some(VoicingKind::Triad),
            "custom" => Some(VoicingKind::Custom),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoicingKind::Open => "Open",
            VoicingKind::Barre => "Barre",
            VoicingKind::Power => "Power",
            VoicingKind::Octave => "Octave",
            VoicingKind::Triad => "Triad",
            VoicingKind::Custom => "Custom",
        }
    }
}

impl From<String> for VoicingKind {
    fn from(label: String) -> Self {
        VoicingKind::parse(&label).unwrap_or_default()
    }
}

impl From<VoicingKind> for String {
    fn from(kind: VoicingKind) -> Self {
        kind.label().to_string()
    }
}

impl fmt::Display for VoicingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ids were written as numbers by some older exports
fn id_from_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(n) => n.to_string(),
    })
}

fn default_position() -> u8 {
    1
}

/// A user-authored chord voicing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordVoicing {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    /// Root note label as entered ("C#", "Bb")
    #[serde(default)]
    pub root_note: String,
    /// Quality label as entered ("Major", "Min7", "Power Chord")
    #[serde(default)]
    pub chord_quality: String,
    #[serde(default)]
    pub chord_voicing: VoicingKind,
    /// Low E to high e
    pub frets: [FretValue; STRING_COUNT],
    #[serde(default = "muted_strings")]
    pub fingering: [FretValue; STRING_COUNT],
    /// Starting fret shown in the diagram
    #[serde(default = "default_position")]
    pub position: u8,
}

impl ChordVoicing {
    /// Parsed root, if the label is a recognised note name
    pub fn root(&self) -> Option<PitchClass> {
        PitchClass::from_label(&self.root_note)
    }

    /// Conventional chord symbol ("C#m7"), falling back to the display name
    /// when the root is not recognised
    pub fn symbol(&self) -> String {
        match self.root() {
            Some(root) => chord_symbol(root, self.quality()),
            None => self.name.clone(),
        }
    }

    /// Lowest fretted (non-open) fret, if any
    pub fn first_played_fret(&self) -> Option<u8> {
        self.frets
            .iter()
            .filter_map(|f| match f {
                FretValue::Fretted(n) => Some(*n),
                _ => None,
            })
            .min()
    }

    pub fn has_open_strings(&self) -> bool {
        self.frets.contains(&FretValue::Open)
    }

    /// Number of strings sounded
    pub fn played_strings(&self) -> usize {
        self.frets.iter().filter(|f| !f.is_muted()).count()
    }

    /// Pitch class each string sounds, low to high; `None` for muted strings
    pub fn sounding_notes(&self, tuning: &Tuning) -> [Option<PitchClass>; STRING_COUNT] {
        let mut notes = [None; STRING_COUNT];
        for (string, fret) in self.frets.iter().enumerate() {
            notes[string] = fret.fret().and_then(|f| tuning.note_at(string, f));
        }
        notes
    }

    /// Token used when the voicing appears in a progression: the name when
    /// it is itself a single chord symbol, otherwise the symbol built from
    /// root and quality ("My Custom C" gives "C")
    pub fn progression_token(&self) -> String {
        if ChordName::parse(&self.name).is_parsed() && !self.name.contains(char::is_whitespace) {
            self.name.clone()
        } else {
            self.symbol()
        }
    }

    /// Whether the diagram position lies in 1..=MAX_POSITION
    pub fn is_in_range(&self) -> bool {
        (1..=MAX_POSITION).contains(&self.position)
    }

    /// Copy of this voicing under a new id
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }
}

impl NamedChord for ChordVoicing {
    fn name(&self) -> &str {
        &self.name
    }

    fn root_note(&self) -> Option<PitchClass> {
        self.root()
    }

    fn quality(&self) -> ChordQuality {
        ChordQuality::from_label(&self.chord_quality)
    }
}

/// A saved progression: an ordered snapshot of voicings plus capo position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jam {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub name: String,
    pub chords: Vec<ChordVoicing>,
    #[serde(default)]
    pub capo_fret: u8,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub created_at: u64,
}

impl Jam {
    /// Sounding progression as chord symbols
    pub fn progression(&self) -> String {
        self.chords
            .iter()
            .map(ChordVoicing::progression_token)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Shapes to finger with the capo on: each chord moved down by the capo fret
    pub fn fingered_chords(&self) -> Vec<String> {
        self.chords
            .iter()
            .map(|c| transpose(&c.progression_token(), -(self.capo_fret as Semitones)))
            .collect()
    }

    /// [`Jam::fingered_chords`] joined with single spaces
    pub fn fingered_progression(&self) -> String {
        self.fingered_chords().join(" ")
    }

    /// Capo within 0..=MAX_CAPO_FRET and every chord in range
    pub fn is_in_range(&self) -> bool {
        self.capo_fret <= MAX_CAPO_FRET && self.chords.iter().all(ChordVoicing::is_in_range)
    }
}


/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Creation-time ids, strictly increasing within the process
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Next id: the current millisecond, bumped past the previous id if the
    /// clock has not moved on
    pub fn next_millis(&self) -> u64 {
        let now = now_millis();
        let mut previous = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(previous + 1);
            match self
                .last
                .compare_exchange_weak(previous, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => previous = actual,
            }
        }
    }

    pub fn next_id(&self) -> String {
        self.next_millis().to_string()
    }
}

static IDS: IdGenerator = IdGenerator::new();

/// Process-wide id generator
pub fn ids() -> &'static IdGenerator {
    &IDS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_major() -> ChordVoicing {
        ChordVoicing {
            id: "1".into(),
            name: "My Custom C".into(),
            root_note: "C".into(),
            chord_quality: "Major".into(),
            chord_voicing: VoicingKind::Open,
            frets: ["x", "3", "2", "0", "1", "0"].map(|f| f.parse().unwrap()),
            fingering: ["x", "3", "2", "0", "1", "0"].map(|f| f.parse().unwrap()),
            position: 1,
        }
    }

    #[test]
    fn test_fret_value_parse() {
        assert_eq!("x".parse::<FretValue>().unwrap(), FretValue::Muted);
        assert_eq!("0".parse::<FretValue>().unwrap(), FretValue::Open);
        assert_eq!("12".parse::<FretValue>().unwrap(), FretValue::Fretted(12));
        assert!("25".parse::<FretValue>().is_err());
        assert!("-1".parse::<FretValue>().is_err());
        assert!("open".parse::<FretValue>().is_err());
    }

    #[test]
    fn test_fret_value_json() {
        let json = serde_json::to_string(&[FretValue::Muted, FretValue::Open, FretValue::Fretted(3)])
            .unwrap();
        assert_eq!(json, r#"["x","0","3"]"#);
        let result: Result<Vec<FretValue>, _> = serde_json::from_str(r#"["q"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_voicing_json_field_names() {
        let json = serde_json::to_value(c_major()).unwrap();
        assert_eq!(json["rootNote"], "C");
        assert_eq!(json["chordQuality"], "Major");
        assert_eq!(json["chordVoicing"], "Open");
        assert_eq!(json["frets"][0], "x");
        assert_eq!(json["position"], 1);
    }

    #[test]
    fn test_voicing_accepts_numeric_id_and_defaults() {
        let json = r#"{"id": 1700000000000, "name": "Em", "frets": ["0","2","2","0","0","0"]}"#;
        let chord: ChordVoicing = serde_json::from_str(json).unwrap();
        assert_eq!(chord.id, "1700000000000");
        assert_eq!(chord.fingering, muted_strings());
        assert_eq!(chord.position, 1);
        assert_eq!(chord.chord_voicing, VoicingKind::Custom);
    }

    #[test]
    fn test_voicing_requires_six_frets() {
        let json = r#"{"id": "1", "name": "Em", "frets": ["0","2","2"]}"#;
        assert!(serde_json::from_str::<ChordVoicing>(json).is_err());
    }

    #[test]
    fn test_voicing_queries() {
        let chord = c_major();
        assert_eq!(chord.root(), Some(PitchClass::C));
        assert_eq!(chord.symbol(), "C");
        assert_eq!(chord.first_played_fret(), Some(1));
        assert!(chord.has_open_strings());
        assert_eq!(chord.played_strings(), 5);

        let notes = chord.sounding_notes(&Tuning::STANDARD);
        assert_eq!(notes[0], None);
        assert_eq!(notes[1], Some(PitchClass::C));
        assert_eq!(notes[2], Some(PitchClass::E));
        assert_eq!(notes[3], Some(PitchClass::G));
    }

    #[test]
    fn test_voicing_named_chord() {
        let chord = c_major();
        assert_eq!(NamedChord::name(&chord), "My Custom C");
        assert_eq!(chord.root_note(), Some(PitchClass::C));
        assert_eq!(NamedChord::quality(&chord), ChordQuality::Major);
    }

    #[test]
    fn test_jam_progressions() {
        let mut g = c_major();
        g.name = "G".into();
        g.root_note = "G".into();
        let jam = Jam {
            id: "10".into(),
            name: "Test".into(),
            chords: vec![c_major(), g],
            capo_fret: 2,
            created_at: 0,
        };
        assert_eq!(jam.progression(), "C G");
        assert_eq!(jam.fingered_progression(), "A# F");
    }

    #[test]
    fn test_octave_voicing_kind() {
        assert_eq!(VoicingKind::parse("OCTAVE"), Some(VoicingKind::Octave));
        assert_eq!(String::from(VoicingKind::Octave), "Octave");
        assert_eq!(VoicingKind::from("shell".to_string()), VoicingKind::Custom);
    }

    #[test]
    fn test_progression_token() {
        let mut chord = c_major();
        assert_eq!(chord.progression_token(), "C");
        chord.name = "Cadd9".into();
        assert_eq!(chord.progression_token(), "Cadd9");
        chord.root_note = "?".into();
        chord.name = "Mystery chord".into();
        assert_eq!(chord.progression_token(), "Mystery chord");
    }

    #[test]
    fn test_range_checks() {
        let mut chord = c_major();
        assert!(chord.is_in_range());
        chord.position = 0;
        assert!(!chord.is_in_range());
        chord.position = MAX_POSITION + 1;
        assert!(!chord.is_in_range());

        let mut jam = Jam {
            id: "1".into(),
            name: "J".into(),
            chords: vec![c_major()],
            capo_fret: MAX_CAPO_FRET,
            created_at: 0,
        };
        assert!(jam.is_in_range());
        jam.capo_fret = 40;
        assert!(!jam.is_in_range());
        jam.capo_fret = 0;
        jam.chords.push(chord);
        assert!(!jam.is_in_range());
    }

    #[test]
    fn test_id_generator_unique() {
        let ids = IdGenerator::new();
        let a = ids.next_millis();
        let b = ids.next_millis();
        let c = ids.next_millis();
        assert!(a < b && b < c);
    }
}
