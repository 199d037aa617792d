//! Merge-safe JSON persistence for annotation records.
//!
//! Annotation files are shared between sessions and occasionally opened in
//! editors while a collection run is live, so every write path here re-reads
//! the file, merges by record identity, and retries once on a locked file.

use crate::models::Record;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON error for {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("{path} is still locked after retry; close the file and rerun")]
    Locked { path: String },
}

/// Delay before the single retry when the target file is locked by another
/// application (spreadsheet software keeps exclusive locks on open files).
const LOCK_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Read a record list from `path`.
///
/// Never fails: a missing file yields an empty list, and an unreadable or
/// malformed file is reported on stderr and likewise yields an empty list so
/// a damaged sidecar cannot abort a collection session.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Warning: could not read {}: {e}", path.display());
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Warning: malformed JSON in {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Write `entries` to `path` as pretty-printed JSON.
///
/// With `merge` set, existing records are read back first and new entries
/// are appended; duplicates by [`Record::dedup_key`] keep the earliest
/// occurrence, so a record already on disk always wins over a re-detected
/// one. Output is sorted canonically regardless of input order, which makes
/// the write idempotent: merging the same entries twice produces
/// byte-identical files.
pub fn write_records<T>(path: &Path, entries: &[T], merge: bool) -> Result<(), StoreError>
where
    T: Record + Serialize + DeserializeOwned,
{
    let mut combined: Vec<T> = if merge {
        read_records(path)
    } else {
        Vec::new()
    };
    combined.extend(entries.iter().cloned());
    let deduped = sorted_entries(dedup(combined));

    let json = serde_json::to_string_pretty(&deduped).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })?;
    write_with_retry(path, &json)
}

/// Read a single JSON value (dictionary, lemma table) from `path`, falling
/// back to `T::default()` under the same never-fail policy as
/// [`read_records`].
pub fn read_value<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Warning: could not read {}: {e}", path.display());
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Warning: malformed JSON in {}: {e}", path.display());
            T::default()
        }
    }
}

/// Write a single JSON value, replacing the file. Shares the lock-retry
/// policy with [`write_records`].
pub fn write_value<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.display().to_string(),
        source,
    })?;
    write_with_retry(path, &json)
}

/// Union-merge a flat string list (ignored lemmas) with whatever is already
/// on disk, written sorted.
pub fn write_string_set_merged(
    path: &Path,
    values: &std::collections::BTreeSet<String>,
) -> Result<(), StoreError> {
    let mut merged: std::collections::BTreeSet<String> =
        read_records::<String>(path).into_iter().collect();
    merged.extend(values.iter().cloned());
    let list: Vec<&String> = merged.iter().collect();
    write_value(path, &list)
}

fn write_with_retry(path: &Path, json: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
    }
    match fs::write(path, json) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            eprintln!(
                "{} appears to be open in another application, retrying...",
                path.display()
            );
            thread::sleep(LOCK_RETRY_DELAY);
            match fs::write(path, json) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(StoreError::Locked {
                    path: path.display().to_string(),
                }),
                Err(source) => Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                }),
            }
        }
        Err(source) => Err(StoreError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Keep the first occurrence of each dedup key, preserving input order
/// otherwise.
pub fn dedup<T: Record>(entries: Vec<T>) -> Vec<T> {
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.dedup_key()))
        .collect()
}

/// Canonical order: verse number first, then naming text, case-insensitive.
pub fn sorted_entries<T: Record>(mut entries: Vec<T>) -> Vec<T> {
    entries.sort_by_key(Record::sort_key);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryStatus, NamingEntry};
    use crate::verse::VerseNumber;
    use tempfile::TempDir;

    fn entry(verse: &str, figure: &str, naming: &str) -> NamingEntry {
        NamingEntry {
            named_figure: figure.to_string(),
            verse: VerseNumber::parse(verse),
            self_naming: String::new(),
            naming_figure: String::new(),
            descriptor: naming.to_string(),
            narrator_label: String::new(),
            status: EntryStatus::Confirmed,
            collocation: String::new(),
        }
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let got: Vec<NamingEntry> = read_records(&dir.path().join("nope.json"));
        assert!(got.is_empty());
    }

    #[test]
    fn test_read_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let got: Vec<NamingEntry> = read_records(&path);
        assert!(got.is_empty());
    }

    #[test]
    fn test_merge_write_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("namings.json");
        let entries = vec![entry("12", "Kriemhilt", "diu schoene"), entry("3", "Hagen", "helt")];

        write_records(&path, &entries, true).unwrap();
        let first = fs::read_to_string(&path).unwrap();

        write_records(&path, &entries, true).unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
        let loaded: Vec<NamingEntry> = read_records(&path);
        assert_eq!(loaded.len(), 2);
        // Sorted by verse, so the Hagen record comes first.
        assert_eq!(loaded[0].named_figure, "Hagen");
    }

    #[test]
    fn test_existing_record_wins_over_new() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("namings.json");

        let mut original = entry("12", "Kriemhilt", "diu schoene");
        original.naming_figure = "Hagen".to_string();
        write_records(&path, &[original], true).unwrap();

        // Same identity under normalization, different attribution.
        let mut redetected = entry("12,00", "kriemhilt", "diu schœne");
        redetected.naming_figure = "Gunther".to_string();
        write_records(&path, &[redetected], true).unwrap();

        let loaded: Vec<NamingEntry> = read_records(&path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].naming_figure, "Hagen");
    }

    #[test]
    fn test_overwrite_mode_drops_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("namings.json");
        write_records(&path, &[entry("1", "A", "x")], true).unwrap();
        write_records(&path, &[entry("2", "B", "y")], false).unwrap();

        let loaded: Vec<NamingEntry> = read_records(&path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].named_figure, "B");
    }

    #[test]
    fn test_string_set_merge_is_a_union() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ignored_lemmas.json");
        let first: std::collections::BTreeSet<String> =
            ["unde".to_string(), "der".to_string()].into_iter().collect();
        write_string_set_merged(&path, &first).unwrap();

        let second: std::collections::BTreeSet<String> =
            ["der".to_string(), "ein".to_string()].into_iter().collect();
        write_string_set_merged(&path, &second).unwrap();

        let loaded: Vec<String> = read_records(&path);
        assert_eq!(loaded, vec!["der", "ein", "unde"]);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("Parzival").join("namings.json");
        write_records(&path, &[entry("1", "A", "x")], true).unwrap();
        assert!(path.exists());
    }
}
