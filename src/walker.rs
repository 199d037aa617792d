//! The per-verse collection walk.
//!
//! The walk is strictly sequential over the resumed sub-sequence of the
//! corpus. For each verse it runs the active tasks in a fixed order
//! (variant detection, collocation capture, categorization), then persists
//! every store that changed and only afterwards advances the checkpoint.
//! A write failure aborts the walk before the checkpoint moves, so a crash
//! can repeat work but never lose it.

use crate::categorize::{lemmatize, tokenize, CategorizationSession, LemmaChoice};
use crate::checkpoint::{CheckpointStore, Task};
use crate::corpus::{Corpus, VerseRecord};
use crate::dictionary::{LemmaCategory, LemmaTables, NamingDictionary};
use crate::matcher::{self, Decision};
use crate::models::{CategorizedEntry, CollocationEntry, NamingEntry, Record};
use crate::project::BookPaths;
use crate::sheet::NamingSheet;
use crate::store::{self, StoreError};
use crate::verse::{VerseNumber, VERSE_TOLERANCE};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which tasks run during a walk. At least one should be active.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    pub naming_variants: bool,
    pub collocations: bool,
    pub categorization: bool,
}

impl WalkOptions {
    /// The task whose checkpoint governs the resume point, in task order.
    pub fn resume_task(&self) -> Option<Task> {
        if self.naming_variants {
            Some(Task::NamingVariants)
        } else if self.collocations {
            Some(Task::Collocations)
        } else if self.categorization {
            Some(Task::Categorization)
        } else {
            None
        }
    }

    fn active_tasks(&self) -> Vec<Task> {
        let mut tasks = Vec::new();
        if self.naming_variants {
            tasks.push(Task::NamingVariants);
        }
        if self.collocations {
            tasks.push(Task::Collocations);
        }
        if self.categorization {
            tasks.push(Task::Categorization);
        }
        tasks
    }
}

/// Verse lines shown around the current one.
pub const CONTEXT_RADIUS: usize = 6;

/// The interactive seam. The binary answers these over stdin; tests drive
/// the walk with scripted implementations.
pub trait Annotator {
    /// Decide one detected candidate. `context` is the surrounding verse
    /// window, display-numbered from 1.
    fn decide_candidate(
        &mut self,
        candidate: &str,
        verse: &VerseRecord,
        context: &[(usize, &VerseRecord)],
    ) -> Decision;

    /// Capture a collocation context for a sheet row with an empty
    /// collocation field. `None` leaves the field open.
    fn capture_collocation(
        &mut self,
        verse: &VerseRecord,
        figure: &str,
        naming: &str,
        context: &[(usize, &VerseRecord)],
    ) -> Option<String>;

    /// Supply one lemma per unknown token. A wrong count is re-asked.
    fn resolve_lemmas(&mut self, tokens: &[&str]) -> Vec<String>;

    /// Classify one lemma, possibly stepping back.
    fn classify_lemma(&mut self, lemma: &str, remembered: Option<LemmaCategory>) -> LemmaChoice;

    /// The classification pass produced no slots. `true` skips the entry
    /// for good; `false` restarts the pass.
    fn confirm_skip_unclassified(&mut self, naming: &str) -> bool;
}

/// Counts reported after a completed walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub verses_walked: usize,
    pub confirmed: usize,
    pub rejected: usize,
    pub collocations_added: usize,
    pub categorized: usize,
}

/// Result of a non-interactive scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub start_index: usize,
    pub verses_scanned: usize,
    pub pending_candidates: usize,
}

/// One collection session over a book.
pub struct Walker {
    corpus: Corpus,
    sheet: NamingSheet,
    dictionary_variants: BTreeSet<String>,
    paths: BookPaths,
    checkpoint: CheckpointStore,
    options: WalkOptions,
    missing_variants: Vec<NamingEntry>,
    collocations: Vec<CollocationEntry>,
    categorized: Vec<CategorizedEntry>,
    lemma_tables: LemmaTables,
    variants_dirty: bool,
    collocations_dirty: bool,
    categorized_dirty: bool,
}

impl Walker {
    pub fn new(
        corpus: Corpus,
        sheet: NamingSheet,
        dictionary: &NamingDictionary,
        paths: BookPaths,
        options: WalkOptions,
    ) -> Self {
        let checkpoint = CheckpointStore::load(&paths.progress);
        let missing_variants = store::read_records(&paths.missing_variants);
        let collocations = store::read_records(&paths.collocations);
        let categorized = store::read_records(&paths.categorization);
        let lemma_tables = LemmaTables::load(
            &paths.lemma_normalization,
            &paths.ignored_lemmas,
            &paths.lemma_categories,
        );
        Walker {
            corpus,
            sheet,
            dictionary_variants: dictionary.normalized_variants(),
            paths,
            checkpoint,
            options,
            missing_variants,
            collocations,
            categorized,
            lemma_tables,
            variants_dirty: false,
            collocations_dirty: false,
            categorized_dirty: false,
        }
    }

    /// Index of the first verse this session will process.
    pub fn start_index(&self) -> usize {
        match self.options.resume_task() {
            Some(task) => self.corpus.resume_index(self.checkpoint.last(task)),
            None => 0,
        }
    }

    /// Run the interactive walk to the end of the corpus.
    pub fn run(&mut self, annotator: &mut dyn Annotator) -> Result<WalkSummary, WalkError> {
        let mut summary = WalkSummary::default();
        let start = self.start_index();
        let tasks = self.options.active_tasks();

        for index in start..self.corpus.len() {
            let Some(verse) = self.corpus.get(index) else {
                break;
            };
            let verse = verse.clone();
            summary.verses_walked += 1;

            if self.options.naming_variants {
                self.walk_candidates(index, &verse, annotator, &mut summary)?;
            }
            if self.options.collocations {
                self.walk_collocations(index, &verse, annotator, &mut summary);
            }
            if self.options.categorization {
                self.walk_categorization(&verse, annotator, &mut summary)?;
            }

            self.persist()?;
            for task in &tasks {
                self.checkpoint.advance(*task, verse.number)?;
            }
        }

        Ok(summary)
    }

    fn walk_candidates(
        &mut self,
        index: usize,
        verse: &VerseRecord,
        annotator: &mut dyn Annotator,
        summary: &mut WalkSummary,
    ) -> Result<(), WalkError> {
        if !verse.number.is_valid() {
            return Ok(());
        }
        let sheet_namings = self.sheet.namings_for_verse(verse.number);
        let candidates = matcher::find_missing_variants(
            verse.number,
            &verse.normalized_text,
            &self.dictionary_variants,
            &sheet_namings,
            &self.missing_variants,
        );

        for candidate in candidates {
            let context = self.corpus.context(index, CONTEXT_RADIUS);
            let decision = annotator.decide_candidate(&candidate, verse, &context);
            match decision {
                Decision::Skip => {}
                Decision::Reject => {
                    self.missing_variants
                        .push(matcher::rejection_entry(verse.number, &candidate));
                    self.variants_dirty = true;
                    summary.rejected += 1;
                }
                Decision::Confirm(confirmation) => {
                    let entry = confirmation.into_entry(verse.number, &candidate);
                    self.missing_variants.push(entry.clone());
                    self.variants_dirty = true;
                    summary.confirmed += 1;

                    if self.options.categorization {
                        if let Some(categorized) = self.categorize_entry(&entry, annotator)? {
                            self.categorized.push(categorized);
                            self.categorized_dirty = true;
                            summary.categorized += 1;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn walk_collocations(
        &mut self,
        index: usize,
        verse: &VerseRecord,
        annotator: &mut dyn Annotator,
        summary: &mut WalkSummary,
    ) {
        if !verse.number.is_valid() {
            return;
        }
        let rows: Vec<(String, String)> = self
            .sheet
            .rows_for_verse(verse.number)
            .into_iter()
            .filter(|row| !row.has_collocation())
            .map(|row| {
                (
                    row.entry.named_figure.clone(),
                    row.entry.naming_text().to_string(),
                )
            })
            .collect();

        for (figure, naming) in rows {
            if self.has_stored_collocation(verse.number, &figure, &naming) {
                continue;
            }
            let context = self.corpus.context(index, CONTEXT_RADIUS);
            let Some(captured) = annotator.capture_collocation(verse, &figure, &naming, &context)
            else {
                continue;
            };
            if captured.trim().is_empty() {
                continue;
            }
            self.collocations.push(CollocationEntry {
                verse: verse.number,
                named_figure: figure,
                naming,
                context: captured,
            });
            self.collocations_dirty = true;
            summary.collocations_added += 1;
        }
    }

    fn has_stored_collocation(&self, verse: VerseNumber, figure: &str, naming: &str) -> bool {
        self.collocations.iter().any(|c| {
            c.verse.same_as(verse, VERSE_TOLERANCE)
                && c.named_figure == figure
                && c.naming == naming
                && !c.context.trim().is_empty()
        })
    }

    fn walk_categorization(
        &mut self,
        verse: &VerseRecord,
        annotator: &mut dyn Annotator,
        summary: &mut WalkSummary,
    ) -> Result<(), WalkError> {
        if !verse.number.is_valid() {
            return Ok(());
        }
        let entries: Vec<NamingEntry> = self
            .sheet
            .rows_in_verse_window(verse.number)
            .into_iter()
            .map(|row| row.entry.clone())
            .collect();

        for entry in entries {
            let naming = entry.naming_text().trim();
            if naming.is_empty() {
                continue;
            }
            if self.is_already_categorized(&entry) {
                continue;
            }
            if let Some(categorized) = self.categorize_entry(&entry, annotator)? {
                self.categorized.push(categorized);
                self.categorized_dirty = true;
                summary.categorized += 1;
            }
        }
        Ok(())
    }

    /// A classified categorized entry with the same identity already covers
    /// this naming; unclassified leftovers do not count and are re-offered.
    fn is_already_categorized(&self, entry: &NamingEntry) -> bool {
        let key = entry.dedup_key();
        self.categorized
            .iter()
            .any(|c| c.is_classified() && c.dedup_key() == key)
    }

    fn categorize_entry(
        &mut self,
        entry: &NamingEntry,
        annotator: &mut dyn Annotator,
    ) -> Result<Option<CategorizedEntry>, WalkError> {
        let text = entry.naming_text().to_string();
        if text.trim().is_empty() {
            return Ok(None);
        }

        let tokens = tokenize(&text);
        let token_refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let missing = self.lemma_tables.missing_tokens(&token_refs);
        if !missing.is_empty() {
            loop {
                let supplied = annotator.resolve_lemmas(&missing);
                if supplied.len() == missing.len() {
                    for (token, lemma) in missing.iter().zip(&supplied) {
                        self.lemma_tables.add_mapping(lemma.trim(), token);
                    }
                    break;
                }
                eprintln!(
                    "Expected {} lemma(ta), got {}.",
                    missing.len(),
                    supplied.len()
                );
            }
        }

        let lemmas = lemmatize(&text, &self.lemma_tables);
        let result = loop {
            let mut session = CategorizationSession::new(lemmas.clone(), &mut self.lemma_tables);
            while !session.is_done() {
                let Some((lemma, remembered)) = session.current().map(|(l, c)| (l.to_string(), c))
                else {
                    break;
                };
                let choice = annotator.classify_lemma(&lemma, remembered);
                session.apply(choice);
            }

            if session.is_empty_result() {
                if annotator.confirm_skip_unclassified(&text) {
                    break None;
                }
                continue;
            }

            break Some(session.into_result());
        };

        // Supplied lemmata and ignore-list additions outlive the entry:
        // the tables persist even when the entry itself is skipped.
        self.lemma_tables.flush()?;

        Ok(result.map(|(designations, epithets)| {
            CategorizedEntry::from_parts(entry.clone(), &designations, &epithets)
        }))
    }

    /// Write every store that changed since the last persist. Called before
    /// the checkpoint moves.
    fn persist(&mut self) -> Result<(), WalkError> {
        if self.variants_dirty {
            store::write_records(&self.paths.missing_variants, &self.missing_variants, true)?;
            self.variants_dirty = false;
        }
        if self.collocations_dirty {
            store::write_records(&self.paths.collocations, &self.collocations, true)?;
            self.collocations_dirty = false;
        }
        if self.categorized_dirty {
            store::write_records(&self.paths.categorization, &self.categorized, true)?;
            self.categorized_dirty = false;
        }
        Ok(())
    }

    /// Non-interactive re-walk: counts would-be candidates from the resume
    /// point without prompting or persisting anything. Used to verify what
    /// a resumed session would still have to do.
    pub fn scan(&self, show_progress: bool) -> ScanSummary {
        let start = self.start_index();
        let remaining = self.corpus.len().saturating_sub(start);

        let progress = if show_progress {
            let pb = ProgressBar::new(remaining as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
                    )
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut summary = ScanSummary {
            start_index: start,
            ..ScanSummary::default()
        };

        for verse in &self.corpus.verses()[start..] {
            summary.verses_scanned += 1;
            if verse.number.is_valid() {
                let sheet_namings = self.sheet.namings_for_verse(verse.number);
                summary.pending_candidates += matcher::find_missing_variants(
                    verse.number,
                    &verse.normalized_text,
                    &self.dictionary_variants,
                    &sheet_namings,
                    &self.missing_variants,
                )
                .len();
            }
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{Confirmation, NamingCategory};
    use crate::models::EntryStatus;
    use crate::sheet::SheetRow;
    use crate::verse::VerseNumber;
    use tempfile::TempDir;

    /// Rejects every candidate and skips everything else.
    struct RejectAll;

    impl Annotator for RejectAll {
        fn decide_candidate(
            &mut self,
            _candidate: &str,
            _verse: &VerseRecord,
            _context: &[(usize, &VerseRecord)],
        ) -> Decision {
            Decision::Reject
        }

        fn capture_collocation(
            &mut self,
            _verse: &VerseRecord,
            _figure: &str,
            _naming: &str,
            _context: &[(usize, &VerseRecord)],
        ) -> Option<String> {
            None
        }

        fn resolve_lemmas(&mut self, tokens: &[&str]) -> Vec<String> {
            tokens.iter().map(|t| t.to_string()).collect()
        }

        fn classify_lemma(&mut self, _lemma: &str, _remembered: Option<LemmaCategory>) -> LemmaChoice {
            LemmaChoice::Ignore
        }

        fn confirm_skip_unclassified(&mut self, _naming: &str) -> bool {
            true
        }
    }

    /// Confirms every candidate, then abandons its classification pass by
    /// ignoring all lemmata.
    struct ConfirmButAbandon;

    impl Annotator for ConfirmButAbandon {
        fn decide_candidate(
            &mut self,
            _candidate: &str,
            _verse: &VerseRecord,
            _context: &[(usize, &VerseRecord)],
        ) -> Decision {
            Decision::Confirm(Confirmation {
                category: NamingCategory::Narrator,
                adapted_text: None,
                named_figure: "Kriemhilt".to_string(),
                naming_figure: None,
                collocation: None,
            })
        }

        fn capture_collocation(
            &mut self,
            _verse: &VerseRecord,
            _figure: &str,
            _naming: &str,
            _context: &[(usize, &VerseRecord)],
        ) -> Option<String> {
            None
        }

        fn resolve_lemmas(&mut self, tokens: &[&str]) -> Vec<String> {
            tokens.iter().map(|t| t.to_string()).collect()
        }

        fn classify_lemma(&mut self, _lemma: &str, _remembered: Option<LemmaCategory>) -> LemmaChoice {
            LemmaChoice::Ignore
        }

        fn confirm_skip_unclassified(&mut self, _naming: &str) -> bool {
            true
        }
    }

    /// Answers every collocation prompt with a fixed context line.
    struct CaptureAll {
        asked: usize,
    }

    impl Annotator for CaptureAll {
        fn decide_candidate(
            &mut self,
            _candidate: &str,
            _verse: &VerseRecord,
            _context: &[(usize, &VerseRecord)],
        ) -> Decision {
            Decision::Skip
        }

        fn capture_collocation(
            &mut self,
            _verse: &VerseRecord,
            _figure: &str,
            _naming: &str,
            _context: &[(usize, &VerseRecord)],
        ) -> Option<String> {
            self.asked += 1;
            Some("uns ist in alten maeren".to_string())
        }

        fn resolve_lemmas(&mut self, tokens: &[&str]) -> Vec<String> {
            tokens.iter().map(|t| t.to_string()).collect()
        }

        fn classify_lemma(&mut self, _lemma: &str, _remembered: Option<LemmaCategory>) -> LemmaChoice {
            LemmaChoice::Ignore
        }

        fn confirm_skip_unclassified(&mut self, _naming: &str) -> bool {
            true
        }
    }

    /// Assigns every lemma as a designation.
    struct AssignAll {
        classify_calls: usize,
    }

    impl Annotator for AssignAll {
        fn decide_candidate(
            &mut self,
            _candidate: &str,
            _verse: &VerseRecord,
            _context: &[(usize, &VerseRecord)],
        ) -> Decision {
            Decision::Skip
        }

        fn capture_collocation(
            &mut self,
            _verse: &VerseRecord,
            _figure: &str,
            _naming: &str,
            _context: &[(usize, &VerseRecord)],
        ) -> Option<String> {
            None
        }

        fn resolve_lemmas(&mut self, tokens: &[&str]) -> Vec<String> {
            tokens.iter().map(|t| t.to_string()).collect()
        }

        fn classify_lemma(&mut self, _lemma: &str, _remembered: Option<LemmaCategory>) -> LemmaChoice {
            self.classify_calls += 1;
            LemmaChoice::Assign(LemmaCategory::Designation)
        }

        fn confirm_skip_unclassified(&mut self, _naming: &str) -> bool {
            true
        }
    }

    fn sheet_row(verse: f64, figure: &str, descriptor: &str, collocation: &str) -> SheetRow {
        SheetRow {
            entry: NamingEntry {
                named_figure: figure.to_string(),
                verse: VerseNumber::from_f64(verse),
                descriptor: descriptor.to_string(),
                ..NamingEntry::default()
            },
            collocation: collocation.to_string(),
        }
    }

    fn corpus() -> Corpus {
        Corpus::from_verses(vec![
            (VerseNumber::from_f64(1.0), "uns ist in alten maeren".to_string()),
            (VerseNumber::from_f64(2.0), "ein kriemhilt wuohs in burgonden".to_string()),
            (VerseNumber::from_f64(3.0), "der kuene hagene sprach".to_string()),
        ])
    }

    fn dictionary() -> NamingDictionary {
        let mut dict = NamingDictionary::default();
        dict.register_book(
            "Nibelungenlied",
            &["kriemhilt".to_string(), "hagene".to_string()],
        );
        dict
    }

    fn walker(dir: &TempDir, options: WalkOptions) -> Walker {
        let paths = BookPaths::new(dir.path(), "Test");
        paths.ensure().unwrap();
        Walker::new(corpus(), NamingSheet::default(), &dictionary(), paths, options)
    }

    #[test]
    fn test_rejections_are_persisted_and_suppress_rescan() {
        let dir = TempDir::new().unwrap();
        let options = WalkOptions {
            naming_variants: true,
            ..WalkOptions::default()
        };
        let mut w = walker(&dir, options);

        let summary = w.run(&mut RejectAll).unwrap();
        assert_eq!(summary.verses_walked, 3);
        assert_eq!(summary.rejected, 2);

        let stored: Vec<NamingEntry> =
            store::read_records(&BookPaths::new(dir.path(), "Test").missing_variants);
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|e| e.status == EntryStatus::Rejected));

        // A fresh walker over the same book finds nothing left to do.
        let w2 = walker(&dir, options);
        let scan = w2.scan(false);
        assert_eq!(scan.pending_candidates, 0);
        // Checkpoint at verse 3: resumed walk restarts from index 0 but the
        // store suppresses both candidates.
        assert_eq!(w2.checkpoint.last(Task::NamingVariants).value(), 3.0);
    }

    #[test]
    fn test_resume_starts_strictly_after_checkpoint() {
        let dir = TempDir::new().unwrap();
        let options = WalkOptions {
            naming_variants: true,
            ..WalkOptions::default()
        };
        let mut w = walker(&dir, options);
        w.checkpoint.advance(Task::NamingVariants, VerseNumber::from_f64(2.0)).unwrap();
        assert_eq!(w.start_index(), 2);

        let summary = w.run(&mut RejectAll).unwrap();
        assert_eq!(summary.verses_walked, 1);
        assert_eq!(summary.rejected, 1);
    }

    #[test]
    fn test_inactive_checkpoints_untouched() {
        let dir = TempDir::new().unwrap();
        let options = WalkOptions {
            naming_variants: true,
            ..WalkOptions::default()
        };
        let mut w = walker(&dir, options);
        w.run(&mut RejectAll).unwrap();

        let progress = CheckpointStore::load(&BookPaths::new(dir.path(), "Test").progress);
        assert_eq!(progress.last(Task::NamingVariants).value(), 3.0);
        assert_eq!(progress.last(Task::Collocations).value(), 0.0);
        assert_eq!(progress.last(Task::Categorization).value(), 0.0);
    }

    #[test]
    fn test_lemma_tables_persist_when_entry_is_skipped() {
        let dir = TempDir::new().unwrap();
        let options = WalkOptions {
            naming_variants: true,
            categorization: true,
            ..WalkOptions::default()
        };
        let mut w = walker(&dir, options);

        let summary = w.run(&mut ConfirmButAbandon).unwrap();
        assert_eq!(summary.confirmed, 2);
        assert_eq!(summary.categorized, 0, "Abandoned entries are not recorded");

        // The ignore-list growth survives the abandoned classification.
        let paths = BookPaths::new(dir.path(), "Test");
        let ignored: Vec<String> = store::read_records(&paths.ignored_lemmas);
        assert!(ignored.contains(&"kriemhilt".to_string()));
        assert!(ignored.contains(&"hagene".to_string()));
    }

    #[test]
    fn test_collocation_capture_skips_covered_rows() {
        let dir = TempDir::new().unwrap();
        let paths = BookPaths::new(dir.path(), "Test");
        paths.ensure().unwrap();

        // Verse 2's collocation is already in the store.
        store::write_records(
            &paths.collocations,
            &[CollocationEntry {
                verse: VerseNumber::from_f64(2.0),
                named_figure: "Hagen".to_string(),
                naming: "der kuene".to_string(),
                context: "der kuene hagene sprach".to_string(),
            }],
            true,
        )
        .unwrap();

        let sheet = NamingSheet::from_rows(vec![
            sheet_row(1.0, "Kriemhilt", "diu schoene", ""),
            sheet_row(2.0, "Hagen", "der kuene", ""),
            sheet_row(3.0, "Volker", "der videlaere", "bereits im Blatt erfasst"),
        ]);
        let options = WalkOptions {
            collocations: true,
            ..WalkOptions::default()
        };
        let mut w = Walker::new(corpus(), sheet, &dictionary(), paths.clone(), options);

        let mut annotator = CaptureAll { asked: 0 };
        let summary = w.run(&mut annotator).unwrap();
        assert_eq!(annotator.asked, 1, "Only the uncovered row prompts");
        assert_eq!(summary.collocations_added, 1);

        let stored: Vec<CollocationEntry> = store::read_records(&paths.collocations);
        assert_eq!(stored.len(), 2);
        let added = stored
            .iter()
            .find(|c| c.named_figure == "Kriemhilt")
            .unwrap();
        assert_eq!(added.context, "uns ist in alten maeren");
    }

    #[test]
    fn test_unclassified_entries_are_reoffered() {
        let dir = TempDir::new().unwrap();
        let paths = BookPaths::new(dir.path(), "Test");
        paths.ensure().unwrap();

        // Verse 1 is fully classified; verse 2 is a slotless leftover.
        let classified = CategorizedEntry::from_parts(
            sheet_row(1.0, "Kriemhilt", "diu schoene", "").entry,
            &["schoene".to_string()],
            &[],
        );
        let leftover = CategorizedEntry::from_parts(
            sheet_row(2.0, "Hagen", "der kuene", "").entry,
            &[],
            &[],
        );
        store::write_records(&paths.categorization, &[classified, leftover], true).unwrap();

        let sheet = NamingSheet::from_rows(vec![
            sheet_row(1.0, "Kriemhilt", "diu schoene", ""),
            sheet_row(2.0, "Hagen", "der kuene", ""),
        ]);
        let options = WalkOptions {
            categorization: true,
            ..WalkOptions::default()
        };
        let mut w = Walker::new(corpus(), sheet, &dictionary(), paths, options);

        let mut annotator = AssignAll { classify_calls: 0 };
        let summary = w.run(&mut annotator).unwrap();

        // "der kuene" has two lemmata; the classified verse never prompts.
        assert_eq!(annotator.classify_calls, 2);
        assert_eq!(summary.categorized, 1);
    }
}
