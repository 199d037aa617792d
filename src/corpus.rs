//! In-memory verse corpus.
//!
//! The corpus is consumed as a plain JSON sequence of lines,
//! `[{"n": <number|string>, "segments": ["…", "…"]}]`, produced upstream
//! from the TEI edition. Line order in the file is the reading order and
//! is preserved; verse numbers are not assumed dense or strictly
//! monotonic (prologue lines and editorial insertions break both).

use crate::normalize::normalize;
use crate::verse::{VerseNumber, VERSE_TOLERANCE};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("corpus {path} contains no verses")]
    Empty { path: String },
}

#[derive(Debug, Clone, Deserialize)]
struct RawLine {
    #[serde(rename = "n")]
    number: VerseNumber,
    #[serde(default)]
    segments: Vec<String>,
}

/// A single verse line, with its text pre-normalized once at load time.
#[derive(Debug, Clone)]
pub struct VerseRecord {
    pub number: VerseNumber,
    pub raw_text: String,
    pub normalized_text: String,
}

/// An ordered sequence of verse lines.
#[derive(Debug, Clone)]
pub struct Corpus {
    verses: Vec<VerseRecord>,
}

impl Corpus {
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let raw = fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let lines: Vec<RawLine> =
            serde_json::from_str(&raw).map_err(|source| CorpusError::Json {
                path: path.display().to_string(),
                source,
            })?;
        if lines.is_empty() {
            return Err(CorpusError::Empty {
                path: path.display().to_string(),
            });
        }
        Ok(Self::from_lines(lines))
    }

    /// Build a corpus directly from `(number, text)` pairs.
    pub fn from_verses(verses: Vec<(VerseNumber, String)>) -> Self {
        Self::from_lines(
            verses
                .into_iter()
                .map(|(number, text)| RawLine {
                    number,
                    segments: vec![text],
                })
                .collect(),
        )
    }

    fn from_lines(lines: Vec<RawLine>) -> Self {
        let verses = lines
            .into_iter()
            .map(|line| {
                let raw_text = line
                    .segments
                    .iter()
                    .map(String::as_str)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                let normalized_text = normalize(&raw_text);
                VerseRecord {
                    number: line.number,
                    raw_text,
                    normalized_text,
                }
            })
            .collect();
        Corpus { verses }
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn verses(&self) -> &[VerseRecord] {
        &self.verses
    }

    pub fn get(&self, index: usize) -> Option<&VerseRecord> {
        self.verses.get(index)
    }

    /// First verse with the given number, under tolerant equality.
    pub fn find_by_number(&self, number: VerseNumber) -> Option<&VerseRecord> {
        self.verses
            .iter()
            .find(|v| v.number.same_as(number, VERSE_TOLERANCE))
    }

    /// Where a resumed walk starts: the first line whose verse number is
    /// strictly greater than the checkpoint. Falls back to the beginning
    /// when no such line exists (fresh run, or checkpoint from a longer
    /// corpus variant).
    pub fn resume_index(&self, last_processed: VerseNumber) -> usize {
        if !last_processed.is_valid() {
            return 0;
        }
        self.verses
            .iter()
            .position(|v| v.number.is_valid() && v.number.value() > last_processed.value())
            .unwrap_or(0)
    }

    /// Context lines around `index`, up to `radius` on each side, numbered
    /// from 1 for display. Missing neighbours at the corpus edges are
    /// simply absent.
    pub fn context(&self, index: usize, radius: usize) -> Vec<(usize, &VerseRecord)> {
        let start = index.saturating_sub(radius);
        let end = (index + radius + 1).min(self.verses.len());
        self.verses[start..end]
            .iter()
            .enumerate()
            .map(|(offset, v)| (offset + 1, v))
            .collect()
    }
}
