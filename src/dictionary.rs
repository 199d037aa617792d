//! The cross-book naming dictionary and the lemma lookup tables.

use crate::normalize::normalize;
use crate::store::{self, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Cumulative dictionary of known naming variants, grown book by book.
///
/// Stored as a single JSON object so earlier campaigns' dictionaries load
/// unchanged: `{"Included Books": [..], "Namings": {book: [variants]}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingDictionary {
    #[serde(rename = "Included Books", default)]
    pub included_books: Vec<String>,
    #[serde(rename = "Namings", default)]
    pub namings: BTreeMap<String, Vec<String>>,
}

impl NamingDictionary {
    pub fn load(path: &Path) -> Self {
        store::read_value(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        store::write_value(path, self)
    }

    /// Register a book's naming list. Variants are trimmed, lowercased, and
    /// de-duplicated; re-registering a book replaces its list.
    pub fn register_book(&mut self, book: &str, variants: &[String]) {
        let cleaned: BTreeSet<String> = variants
            .iter()
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect();
        if !self.included_books.iter().any(|b| b == book) {
            self.included_books.push(book.to_string());
        }
        self.namings
            .insert(book.to_string(), cleaned.into_iter().collect());
    }

    /// All variants across all books, normalized. The set is sorted, which
    /// fixes the candidate order the matcher presents.
    pub fn normalized_variants(&self) -> BTreeSet<String> {
        self.namings
            .values()
            .flatten()
            .map(|v| normalize(v))
            .filter(|v| !v.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.namings.values().all(Vec::is_empty)
    }
}

/// Whether a lemma counts as a designation slot or an epithet slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LemmaCategory {
    #[serde(rename = "a")]
    Designation,
    #[serde(rename = "e")]
    Epithet,
}

/// The three global lemma tables used during categorization: surface-form
/// normalization, the ignore list, and remembered category labels.
///
/// Mutations stay in memory; one [`LemmaTables::flush`] call persists all
/// three files at once.
#[derive(Debug, Clone, Default)]
pub struct LemmaTables {
    normalization: BTreeMap<String, Vec<String>>,
    ignored: BTreeSet<String>,
    categories: BTreeMap<String, LemmaCategory>,
    normalization_path: PathBuf,
    ignored_path: PathBuf,
    categories_path: PathBuf,
}

impl LemmaTables {
    pub fn load(
        normalization_path: &Path,
        ignored_path: &Path,
        categories_path: &Path,
    ) -> Self {
        LemmaTables {
            normalization: store::read_value(normalization_path),
            ignored: store::read_records::<String>(ignored_path)
                .into_iter()
                .collect(),
            categories: store::read_value(categories_path),
            normalization_path: normalization_path.to_path_buf(),
            ignored_path: ignored_path.to_path_buf(),
            categories_path: categories_path.to_path_buf(),
        }
    }

    /// Resolve a surface form to its lemma; unknown forms fall back to the
    /// form itself.
    pub fn resolve(&self, token: &str) -> String {
        for (lemma, variants) in &self.normalization {
            if lemma == token || variants.iter().any(|v| v == token) {
                return lemma.clone();
            }
        }
        token.to_string()
    }

    /// Tokens with neither a lemma entry nor a variant listing, in input
    /// order. These must be supplied by the annotator before categorization.
    pub fn missing_tokens<'a>(&self, tokens: &[&'a str]) -> Vec<&'a str> {
        tokens
            .iter()
            .filter(|t| {
                !self
                    .normalization
                    .iter()
                    .any(|(lemma, variants)| lemma == *t || variants.iter().any(|v| v == *t))
            })
            .copied()
            .collect()
    }

    /// Record `surface` as a form of `lemma`. Variant lists stay sorted and
    /// duplicate-free.
    pub fn add_mapping(&mut self, lemma: &str, surface: &str) {
        let variants = self.normalization.entry(lemma.to_string()).or_default();
        if !variants.iter().any(|v| v == surface) {
            variants.push(surface.to_string());
            variants.sort();
        }
    }

    pub fn variants_of(&self, lemma: &str) -> &[String] {
        self.normalization
            .get(lemma)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_ignored(&self, lemma: &str) -> bool {
        self.ignored.contains(lemma)
    }

    pub fn ignore(&mut self, lemma: &str) {
        self.ignored.insert(lemma.to_string());
    }

    pub fn unignore(&mut self, lemma: &str) {
        self.ignored.remove(lemma);
    }

    pub fn category_of(&self, lemma: &str) -> Option<LemmaCategory> {
        self.categories.get(lemma).copied()
    }

    pub fn set_category(&mut self, lemma: &str, category: LemmaCategory) {
        self.categories.insert(lemma.to_string(), category);
    }

    pub fn clear_category(&mut self, lemma: &str) {
        self.categories.remove(lemma);
    }

    /// Persist all three tables. The ignore list is union-merged with disk
    /// so two sessions never lose each other's additions; the maps are
    /// replaced (BTreeMap keeps their key order stable).
    pub fn flush(&self) -> Result<(), StoreError> {
        store::write_value(&self.normalization_path, &self.normalization)?;
        store::write_string_set_merged(&self.ignored_path, &self.ignored)?;
        store::write_value(&self.categories_path, &self.categories)
    }
}
