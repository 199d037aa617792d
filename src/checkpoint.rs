//! Per-task progress checkpoints.
//!
//! Each collection task resumes independently, so the progress file keeps
//! one last-processed verse per task. A task that is not active in a
//! session must never have its counter disturbed.

use crate::store::{self, StoreError};
use crate::verse::VerseNumber;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The three resumable collection tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    NamingVariants,
    Collocations,
    Categorization,
}

fn zero() -> VerseNumber {
    VerseNumber::from_f64(0.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Progress {
    #[serde(rename = "naming_variants_last_verse", default = "zero")]
    naming_variants: VerseNumber,
    #[serde(rename = "collocations_last_verse", default = "zero")]
    collocations: VerseNumber,
    #[serde(rename = "categorization_last_verse", default = "zero")]
    categorization: VerseNumber,
}

impl Default for Progress {
    fn default() -> Self {
        Progress {
            naming_variants: zero(),
            collocations: zero(),
            categorization: zero(),
        }
    }
}

/// The progress file wrapper. Loading never fails (a damaged file resets
/// every counter to zero, which only costs re-walking); writes are
/// change-gated so an idle task loop does not rewrite the file per verse.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
    progress: Progress,
}

impl CheckpointStore {
    pub fn load(path: &Path) -> Self {
        CheckpointStore {
            path: path.to_path_buf(),
            progress: store::read_value(path),
        }
    }

    pub fn last(&self, task: Task) -> VerseNumber {
        match task {
            Task::NamingVariants => self.progress.naming_variants,
            Task::Collocations => self.progress.collocations,
            Task::Categorization => self.progress.categorization,
        }
    }

    /// Record `verse` as the last processed verse for `task`. Persists only
    /// when the counter actually changes; other tasks' counters are left
    /// untouched.
    pub fn advance(&mut self, task: Task, verse: VerseNumber) -> Result<(), StoreError> {
        if !verse.is_valid() || self.last(task) == verse {
            return Ok(());
        }
        match task {
            Task::NamingVariants => self.progress.naming_variants = verse,
            Task::Collocations => self.progress.collocations = verse,
            Task::Categorization => self.progress.categorization = verse,
        }
        store::write_value(&self.path, &self.progress)
    }

    /// Seed the progress file with zeros if it does not exist yet.
    pub fn ensure(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        store::write_value(&self.path, &self.progress)
    }
}
