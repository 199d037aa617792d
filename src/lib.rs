//! Naming Analysis Library
//!
//! Resumable collection and analysis of character namings in medieval
//! verse corpora. A walk over the verse stream detects naming variants
//! missing from a curated spreadsheet, records annotator decisions in
//! merge-safe JSON stores, and keeps per-task checkpoints so an
//! interrupted session resumes exactly where it stopped.
//!
//! # Example
//!
//! ```no_run
//! use naming_analysis::prelude::*;
//! use std::path::Path;
//!
//! let paths = BookPaths::new(Path::new("data"), "Nibelungenlied");
//! paths.ensure().unwrap();
//!
//! let corpus = Corpus::load(Path::new("nibelungenlied_verses.json")).unwrap();
//! let sheet = NamingSheet::load(Path::new("namings.xlsx"), None).unwrap();
//! let dictionary = NamingDictionary::load(&paths.naming_dictionary);
//!
//! let options = WalkOptions {
//!     naming_variants: true,
//!     ..WalkOptions::default()
//! };
//! let walker = Walker::new(corpus, sheet, &dictionary, paths, options);
//!
//! // How much would a resumed session still have to do?
//! let scan = walker.scan(true);
//! println!("{} candidates pending", scan.pending_candidates);
//! ```

pub mod categorize;
pub mod checkpoint;
pub mod corpus;
pub mod dictionary;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod output;
pub mod project;
pub mod sheet;
pub mod stats;
pub mod store;
pub mod verse;
pub mod walker;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::categorize::{
        lemmatize, tokenize, CategorizationSession, LemmaChoice, MAX_DESIGNATIONS, MAX_EPITHETS,
    };
    pub use crate::checkpoint::{CheckpointStore, Task};
    pub use crate::corpus::{Corpus, CorpusError, VerseRecord};
    pub use crate::dictionary::{LemmaCategory, LemmaTables, NamingDictionary};
    pub use crate::matcher::{
        find_missing_variants, rejection_entry, Confirmation, Decision, NamingCategory,
    };
    pub use crate::models::{
        CategorizedEntry, CollocationEntry, EntryStatus, NamingEntry, Record,
    };
    pub use crate::normalize::{first_valid_text, normalize};
    pub use crate::output::{
        print_keywords, print_kwic, write_keywords, write_keywords_file, write_kwic,
        write_kwic_file, write_wordlist, write_wordlist_file, OutputError,
    };
    pub use crate::project::BookPaths;
    pub use crate::sheet::{NamingSheet, SheetError, SheetRow};
    pub use crate::stats::{
        extract_tokens, format_kwic, kwic_lines, score_keywords, wordlist, KeywordScore, KwicLine,
        Polarity, TokenUnit, DEFAULT_KEYNESS_THRESHOLD,
    };
    pub use crate::store::{
        dedup, read_records, read_value, sorted_entries, write_records, write_string_set_merged,
        write_value, StoreError,
    };
    pub use crate::verse::{same_verse, VerseNumber, VERSE_TOLERANCE};
    pub use crate::walker::{
        Annotator, ScanSummary, WalkError, WalkOptions, WalkSummary, Walker, CONTEXT_RADIUS,
    };
}

// Re-export commonly used types at the crate root
pub use models::{CategorizedEntry, CollocationEntry, NamingEntry};
pub use verse::VerseNumber;
