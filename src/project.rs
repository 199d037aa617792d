//! Per-book project layout under the data directory.
//!
//! Each book gets its own folder with the four session files; the naming
//! dictionary and the lemma tables are shared across books.

use crate::models::{CategorizedEntry, CollocationEntry, NamingEntry};
use crate::store::{self, StoreError};
use std::path::{Path, PathBuf};

/// All file paths of one book's session plus the shared global files.
#[derive(Debug, Clone)]
pub struct BookPaths {
    pub book: String,
    pub book_dir: PathBuf,
    pub missing_variants: PathBuf,
    pub collocations: PathBuf,
    pub categorization: PathBuf,
    pub progress: PathBuf,
    pub analysis_dir: PathBuf,
    pub naming_dictionary: PathBuf,
    pub lemma_normalization: PathBuf,
    pub ignored_lemmas: PathBuf,
    pub lemma_categories: PathBuf,
}

impl BookPaths {
    /// Lay out paths for `book` under `data_dir`. The book name is
    /// capitalized so `rolandslied` and `Rolandslied` address the same
    /// folder.
    pub fn new(data_dir: &Path, book: &str) -> Self {
        let book = capitalize(book.trim());
        let book_dir = data_dir.join(&book);
        BookPaths {
            missing_variants: book_dir.join(format!("missing_naming_variants_{book}.json")),
            collocations: book_dir.join(format!("collocations_{book}.json")),
            categorization: book_dir.join(format!("categorization_{book}.json")),
            progress: book_dir.join(format!("progress_{book}.json")),
            analysis_dir: book_dir.join("analysis"),
            naming_dictionary: data_dir.join("naming_variants_dict.json"),
            lemma_normalization: data_dir.join("lemma_normalization.json"),
            ignored_lemmas: data_dir.join("ignored_lemmas.json"),
            lemma_categories: data_dir.join("lemma_categories.json"),
            book,
            book_dir,
        }
    }

    /// Create the book directory and seed the session files that do not
    /// exist yet, so a fresh book starts from empty stores and zeroed
    /// progress.
    pub fn ensure(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.book_dir).map_err(|source| StoreError::Io {
            path: self.book_dir.display().to_string(),
            source,
        })?;

        if !self.missing_variants.exists() {
            store::write_records::<NamingEntry>(&self.missing_variants, &[], false)?;
        }
        if !self.collocations.exists() {
            store::write_records::<CollocationEntry>(&self.collocations, &[], false)?;
        }
        if !self.categorization.exists() {
            store::write_records::<CategorizedEntry>(&self.categorization, &[], false)?;
        }
        crate::checkpoint::CheckpointStore::load(&self.progress).ensure()?;
        Ok(())
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let paths = BookPaths::new(Path::new("data"), "rolandslied");
        assert_eq!(paths.book, "Rolandslied");
        assert_eq!(
            paths.missing_variants,
            Path::new("data/Rolandslied/missing_naming_variants_Rolandslied.json")
        );
        assert_eq!(
            paths.progress,
            Path::new("data/Rolandslied/progress_Rolandslied.json")
        );
        assert_eq!(
            paths.naming_dictionary,
            Path::new("data/naming_variants_dict.json")
        );
    }

    #[test]
    fn test_ensure_seeds_missing_files() {
        let dir = TempDir::new().unwrap();
        let paths = BookPaths::new(dir.path(), "Parzival");
        paths.ensure().unwrap();

        assert!(paths.book_dir.is_dir());
        assert!(paths.missing_variants.exists());
        assert!(paths.collocations.exists());
        assert!(paths.categorization.exists());
        assert!(paths.progress.exists());

        let entries: Vec<NamingEntry> = store::read_records(&paths.missing_variants);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_ensure_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        let paths = BookPaths::new(dir.path(), "Parzival");
        paths.ensure().unwrap();

        std::fs::write(&paths.missing_variants, "[{\"Vers\": 5}]").unwrap();
        paths.ensure().unwrap();

        let entries: Vec<NamingEntry> = store::read_records(&paths.missing_variants);
        assert_eq!(entries.len(), 1);
    }
}
