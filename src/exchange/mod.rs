// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! JSON import and export of the chord library and saved jams.
//!
//! Exports write a collection verbatim to a dated `.json` file. Imports
//! accept a JSON array, keep the elements that look like records, and merge
//! them into the collection, skipping ids that are already present. A file
//! that is not an array, or that has no usable element, leaves the store
//! untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::library::{ChordVoicing, Jam};
use crate::music::fretboard::STRING_COUNT;
use crate::store::{Collection, Store, StoreError};

/// Import/export failures
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("import file must contain a JSON array")]
    NotAnArray,

    #[error("import file has no valid {0}")]
    NoValidEntries(&'static str),

    #[error("import file is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("could not access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Outcome of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    /// New records merged into the collection
    pub added: usize,
    /// Valid records whose id was already present (or repeated in the file)
    pub skipped_existing: usize,
    /// Elements that failed shape or range validation
    pub rejected: usize,
}

/// A record type that can be exchanged as a JSON array
trait Exchangeable: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
    const FILE_PREFIX: &'static str;
    const NOUN: &'static str;

    fn id(&self) -> &str;

    /// Minimal structural check before full decoding
    fn has_shape(object: &serde_json::Map<String, Value>) -> bool;

    /// Range checks on the decoded record
    fn is_valid(&self) -> bool;
}

fn has_id_and_name(object: &serde_json::Map<String, Value>) -> bool {
    let id_ok = matches!(object.get("id"), Some(Value::String(s)) if !s.is_empty())
        || matches!(object.get("id"), Some(Value::Number(_)));
    let name_ok = matches!(object.get("name"), Some(Value::String(_)));
    id_ok && name_ok
}

impl Exchangeable for ChordVoicing {
    const COLLECTION: Collection = Collection::CustomChords;
    const FILE_PREFIX: &'static str = "guitar-chords";
    const NOUN: &'static str = "chords";

    fn id(&self) -> &str {
        &self.id
    }

    fn has_shape(object: &serde_json::Map<String, Value>) -> bool {
        has_id_and_name(object)
            && matches!(object.get("frets"), Some(Value::Array(frets)) if frets.len() == STRING_COUNT)
    }

    fn is_valid(&self) -> bool {
        self.is_in_range()
    }
}

impl Exchangeable for Jam {
    const COLLECTION: Collection = Collection::SavedJams;
    const FILE_PREFIX: &'static str = "corduroy-jams";
    const NOUN: &'static str = "jams";

    fn id(&self) -> &str {
        &self.id
    }

    fn has_shape(object: &serde_json::Map<String, Value>) -> bool {
        has_id_and_name(object) && matches!(object.get("chords"), Some(Value::Array(_)))
    }

    fn is_valid(&self) -> bool {
        self.is_in_range()
    }
}

/// File name an export made on `date` is written to
pub fn chords_export_name(date: &str) -> String {
    format!("{}-{}.json", ChordVoicing::FILE_PREFIX, date)
}

/// File name a jam export made on `date` is written to
pub fn jams_export_name(date: &str) -> String {
    format!("{}-{}.json", Jam::FILE_PREFIX, date)
}

/// Write the chord library to `dir/guitar-chords-<date>.json`
pub fn export_chords(store: &Store, dir: &Path, date: &str) -> Result<PathBuf> {
    export::<ChordVoicing>(store, dir, date)
}

/// Write saved jams to `dir/corduroy-jams-<date>.json`
pub fn export_jams(store: &Store, dir: &Path, date: &str) -> Result<PathBuf> {
    export::<Jam>(store, dir, date)
}

fn export<T: Exchangeable>(store: &Store, dir: &Path, date: &str) -> Result<PathBuf> {
    let records: Vec<T> = store.get(T::COLLECTION)?;
    let json = serde_json::to_string_pretty(&records)?;
    fs::create_dir_all(dir).map_err(|source| ExchangeError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format!("{}-{}.json", T::FILE_PREFIX, date));
    fs::write(&path, json).map_err(|source| ExchangeError::Io {
        path: path.clone(),
        source,
    })?;
    info!(?path, records = records.len(), "exported {}", T::NOUN);
    Ok(path)
}

/// Merge chords from a JSON array into the library
pub fn import_chords(store: &Store, json: &str) -> Result<ImportReport> {
    import::<ChordVoicing>(store, json)
}

/// Merge jams from a JSON array into the saved jams
pub fn import_jams(store: &Store, json: &str) -> Result<ImportReport> {
    import::<Jam>(store, json)
}

pub fn import_chords_file(store: &Store, path: &Path) -> Result<ImportReport> {
    import_chords(store, &read_file(path)?)
}

pub fn import_jams_file(store: &Store, path: &Path) -> Result<ImportReport> {
    import_jams(store, &read_file(path)?)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ExchangeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn import<T: Exchangeable>(store: &Store, json: &str) -> Result<ImportReport> {
    let Value::Array(elements) = serde_json::from_str::<Value>(json)? else {
        return Err(ExchangeError::NotAnArray);
    };

    let mut report = ImportReport::default();
    let mut incoming: Vec<T> = Vec::new();
    for element in elements {
        let shaped = matches!(&element, Value::Object(object) if T::has_shape(object));
        let decoded = if shaped {
            serde_json::from_value::<T>(element)
                .ok()
                .filter(T::is_valid)
        } else {
            None
        };
        match decoded {
            Some(record) => incoming.push(record),
            None => report.rejected += 1,
        }
    }
    if incoming.is_empty() {
        return Err(ExchangeError::NoValidEntries(T::NOUN));
    }

    let mut records: Vec<T> = store.get(T::COLLECTION)?;
    for record in incoming {
        if records.iter().any(|r| r.id() == record.id()) {
            report.skipped_existing += 1;
        } else {
            records.push(record);
            report.added += 1;
        }
    }

    if report.added > 0 {
        store.put(T::COLLECTION, &records)?;
    }
    debug!(?report, "import merged into {}", T::COLLECTION);
    info!(
        added = report.added,
        skipped = report.skipped_existing,
        rejected = report.rejected,
        "imported {}",
        T::NOUN
    );
    Ok(report)
}

/// Today's UTC date as `YYYY-MM-DD`
pub fn today_iso() -> String {
    let days = crate::library::model::now_millis() / 86_400_000;
    let (year, month, day) = civil_from_days(days as i64);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

/// Proleptic Gregorian date for a count of days since 1970-01-01
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{ChordLibrary, JamBook, Workspace};
    use tempfile::tempdir;

    const CHORDS: &str = r#"[
        {"id": "1", "name": "C", "rootNote": "C", "chordQuality": "Major",
         "chordVoicing": "Open", "frets": ["x","3","2","0","1","0"],
         "fingering": ["x","3","2","0","1","0"], "position": 1},
        {"id": "2", "name": "Em", "frets": ["0","2","2","0","0","0"]},
        {"id": "3", "name": "Broken", "frets": ["0","2"]},
        {"name": "No id", "frets": ["0","2","2","0","0","0"]},
        "not an object"
    ]"#;

    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
    }

    #[test]
    fn test_today_iso_shape() {
        let today = today_iso();
        assert_eq!(today.len(), 10);
        assert_eq!(&today[4..5], "-");
        assert_eq!(&today[7..8], "-");
    }

    #[test]
    fn test_import_chords_report() {
        let store = Store::in_memory();
        let report = import_chords(&store, CHORDS).unwrap();
        assert_eq!(
            report,
            ImportReport {
                added: 2,
                skipped_existing: 0,
                rejected: 3
            }
        );
        assert_eq!(ChordLibrary::new(&store).list().unwrap().len(), 2);
    }

    #[test]
    fn test_import_is_idempotent() {
        let store = Store::in_memory();
        import_chords(&store, CHORDS).unwrap();
        let second = import_chords(&store, CHORDS).unwrap();
        assert_eq!(second.added, 0);
        assert_eq!(second.skipped_existing, 2);
        assert_eq!(ChordLibrary::new(&store).list().unwrap().len(), 2);
    }

    #[test]
    fn test_import_duplicate_ids_within_file() {
        let store = Store::in_memory();
        let json = r#"[
            {"id": "1", "name": "C", "frets": ["x","3","2","0","1","0"]},
            {"id": "1", "name": "C again", "frets": ["x","3","2","0","1","0"]}
        ]"#;
        let report = import_chords(&store, json).unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.skipped_existing, 1);
    }

    #[test]
    fn test_bad_import_leaves_store_unmodified() {
        let store = Store::in_memory();
        import_chords(&store, CHORDS).unwrap();
        let sub = store.subscribe(None);

        assert!(matches!(
            import_chords(&store, r#"{"id": "9"}"#),
            Err(ExchangeError::NotAnArray)
        ));
        assert!(matches!(
            import_chords(&store, r#"[{"id": "9", "name": "x"}]"#),
            Err(ExchangeError::NoValidEntries("chords"))
        ));
        assert!(matches!(import_chords(&store, "[1,"), Err(ExchangeError::Json(_))));
        assert!(matches!(import_chords(&store, "[]"), Err(ExchangeError::NoValidEntries(_))));

        assert_eq!(ChordLibrary::new(&store).list().unwrap().len(), 2);
        assert!(sub.recv_all().is_empty());
    }

    #[test]
    fn test_import_jams_requires_chords_array() {
        let store = Store::in_memory();
        let json = r#"[
            {"id": "100", "name": "Jam", "chords": [], "capoFret": 2, "createdAt": 100},
            {"id": "101", "name": "No chords"}
        ]"#;
        let report = import_jams(&store, json).unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(JamBook::new(&store).get("100").unwrap().capo_fret, 2);
    }

    #[test]
    fn test_import_rejects_out_of_range_records() {
        let store = Store::in_memory();
        let jams = r#"[
            {"id": "1", "name": "J", "chords": [], "capoFret": 40, "createdAt": 1},
            {"id": "2", "name": "K", "chords": [], "capoFret": 11, "createdAt": 2},
            {"id": "3", "name": "L", "capoFret": 0, "createdAt": 3,
             "chords": [{"id": "c", "name": "C", "frets": ["x","3","2","0","1","0"], "position": 0}]}
        ]"#;
        let report = import_jams(&store, jams).unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.rejected, 2);
        assert_eq!(JamBook::new(&store).list().unwrap()[0].id, "2");

        let chords = r#"[
            {"id": "1", "name": "C", "frets": ["x","3","2","0","1","0"], "position": 13},
            {"id": "2", "name": "D", "frets": ["x","x","0","2","3","2"], "position": 12}
        ]"#;
        let report = import_chords(&store, chords).unwrap();
        assert_eq!((report.added, report.rejected), (1, 1));

        let all_bad = r#"[{"id": "9", "name": "J", "chords": [], "capoFret": 40}]"#;
        assert!(matches!(
            import_jams(&store, all_bad),
            Err(ExchangeError::NoValidEntries("jams"))
        ));
    }

    #[test]
    fn test_export_then_import_elsewhere() {
        let dir = tempdir().unwrap();
        let source = Store::in_memory();
        import_chords(&source, CHORDS).unwrap();
        Workspace::new(&source).add_from_library("1").unwrap();
        JamBook::new(&source).save_workspace("Set", 1).unwrap();

        let chords_path = export_chords(&source, dir.path(), "2026-10-19").unwrap();
        let jams_path = export_jams(&source, dir.path(), "2026-10-19").unwrap();
        assert_eq!(chords_path.file_name().unwrap(), "guitar-chords-2026-10-19.json");
        assert_eq!(jams_path.file_name().unwrap(), jams_export_name("2026-10-19").as_str());

        let target = Store::in_memory();
        assert_eq!(import_chords_file(&target, &chords_path).unwrap().added, 2);
        assert_eq!(import_jams_file(&target, &jams_path).unwrap().added, 1);
        assert_eq!(
            ChordLibrary::new(&target).list().unwrap(),
            ChordLibrary::new(&source).list().unwrap()
        );
    }

    #[test]
    fn test_import_missing_file() {
        let dir = tempdir().unwrap();
        let store = Store::in_memory();
        let result = import_chords_file(&store, &dir.path().join("nope.json"));
        assert!(matches!(result, Err(ExchangeError::Io { .. })));
    }
}
