//! Data structures for the annotation-collection pipeline.
//!
//! Wire names keep the German column headers of the curated spreadsheets
//! (`Vers`, `Benannte Figur`, …) so that annotation files written by earlier
//! campaigns load unchanged.

use crate::normalize::{first_valid_text, normalize};
use crate::verse::VerseNumber;
use serde::{Deserialize, Serialize};

/// Review status of a detected naming occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Confirmed by the annotator (also the status of curated spreadsheet
    /// rows, which predate the status field).
    #[default]
    Confirmed,
    /// Rejected by the annotator; kept so the variant is not offered again.
    Rejected,
}

/// One detected, confirmed, or rejected naming occurrence.
///
/// Exactly one of `self_naming` / `descriptor` / `narrator_label` carries
/// the naming text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamingEntry {
    #[serde(rename = "Benannte Figur", default)]
    pub named_figure: String,
    #[serde(rename = "Vers", default)]
    pub verse: VerseNumber,
    #[serde(rename = "Eigennennung", default)]
    pub self_naming: String,
    #[serde(rename = "Nennende Figur", default)]
    pub naming_figure: String,
    #[serde(rename = "Bezeichnung", default)]
    pub descriptor: String,
    #[serde(rename = "Erzähler", default)]
    pub narrator_label: String,
    #[serde(rename = "Status", default)]
    pub status: EntryStatus,
    #[serde(rename = "Kollokation", default, skip_serializing_if = "String::is_empty")]
    pub collocation: String,
}

impl NamingEntry {
    /// The naming text: first non-empty of self-naming, descriptor,
    /// narrator label.
    pub fn naming_text(&self) -> &str {
        first_valid_text(&[&self.self_naming, &self.descriptor, &self.narrator_label])
    }

    /// True when any naming field matches `candidate` after normalization.
    /// Used by the matcher to skip variants already handled under any
    /// status for this verse.
    pub fn mentions(&self, candidate_normalized: &str) -> bool {
        [&self.self_naming, &self.descriptor, &self.narrator_label]
            .iter()
            .any(|field| normalize(field) == candidate_normalized)
    }
}

/// A manually curated verse-context window around a naming occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollocationEntry {
    #[serde(rename = "Vers", default)]
    pub verse: VerseNumber,
    #[serde(rename = "Benannte Figur", default)]
    pub named_figure: String,
    #[serde(rename = "Naming", default)]
    pub naming: String,
    #[serde(rename = "Kollokationen", default)]
    pub context: String,
}

/// A naming entry augmented with up to 4 designation and 5 epithet slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedEntry {
    #[serde(flatten)]
    pub entry: NamingEntry,
    #[serde(rename = "Bezeichnung 1", default)]
    pub designation_1: String,
    #[serde(rename = "Bezeichnung 2", default)]
    pub designation_2: String,
    #[serde(rename = "Bezeichnung 3", default)]
    pub designation_3: String,
    #[serde(rename = "Bezeichnung 4", default)]
    pub designation_4: String,
    #[serde(rename = "Epitheta 1", default)]
    pub epithet_1: String,
    #[serde(rename = "Epitheta 2", default)]
    pub epithet_2: String,
    #[serde(rename = "Epitheta 3", default)]
    pub epithet_3: String,
    #[serde(rename = "Epitheta 4", default)]
    pub epithet_4: String,
    #[serde(rename = "Epitheta 5", default)]
    pub epithet_5: String,
}

impl CategorizedEntry {
    /// Build from a naming entry plus classified lemma lists. Excess lemmas
    /// beyond the slot counts are dropped.
    pub fn from_parts(entry: NamingEntry, designations: &[String], epithets: &[String]) -> Self {
        let slot = |list: &[String], i: usize| list.get(i).cloned().unwrap_or_default();
        CategorizedEntry {
            entry,
            designation_1: slot(designations, 0),
            designation_2: slot(designations, 1),
            designation_3: slot(designations, 2),
            designation_4: slot(designations, 3),
            epithet_1: slot(epithets, 0),
            epithet_2: slot(epithets, 1),
            epithet_3: slot(epithets, 2),
            epithet_4: slot(epithets, 3),
            epithet_5: slot(epithets, 4),
        }
    }

    pub fn designations(&self) -> impl Iterator<Item = &str> {
        [
            &self.designation_1,
            &self.designation_2,
            &self.designation_3,
            &self.designation_4,
        ]
        .into_iter()
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
    }

    pub fn epithets(&self) -> impl Iterator<Item = &str> {
        [
            &self.epithet_1,
            &self.epithet_2,
            &self.epithet_3,
            &self.epithet_4,
            &self.epithet_5,
        ]
        .into_iter()
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
    }

    /// An entry with all designation/epithet slots empty is incomplete and
    /// must be re-offered to the annotator rather than treated as done.
    pub fn is_classified(&self) -> bool {
        self.designations().next().is_some() || self.epithets().next().is_some()
    }
}

/// Composite identity of a record: canonical verse key, normalized figure,
/// normalized naming text. Two records with equal keys are the same logical
/// annotation.
pub type DedupKey = ((i64, i64), String, String);

/// Canonical ordering key: verse integer part, rounded hundredths,
/// lowercased naming text.
pub type SortKey = (i64, i64, String);

/// The one upsert-by-key abstraction shared by all persisted record kinds.
pub trait Record: Clone {
    fn dedup_key(&self) -> DedupKey;
    fn sort_key(&self) -> SortKey;
}

impl Record for NamingEntry {
    fn dedup_key(&self) -> DedupKey {
        (
            self.verse.key(),
            normalize(&self.named_figure),
            normalize(self.naming_text()),
        )
    }

    fn sort_key(&self) -> SortKey {
        let (int, frac) = self.verse.key();
        (int, frac, self.naming_text().trim().to_lowercase())
    }
}

impl Record for CollocationEntry {
    fn dedup_key(&self) -> DedupKey {
        (
            self.verse.key(),
            normalize(&self.named_figure),
            normalize(&self.naming),
        )
    }

    fn sort_key(&self) -> SortKey {
        let (int, frac) = self.verse.key();
        (int, frac, self.naming.trim().to_lowercase())
    }
}

impl Record for CategorizedEntry {
    fn dedup_key(&self) -> DedupKey {
        self.entry.dedup_key()
    }

    fn sort_key(&self) -> SortKey {
        self.entry.sort_key()
    }
}
