//! Reader for the curated naming spreadsheet.
//!
//! One row per already-annotated naming occurrence. Columns are located by
//! header name, case-insensitively, so column order in the workbook does
//! not matter.

use crate::models::{EntryStatus, NamingEntry};
use crate::normalize::normalize;
use crate::verse::{VerseNumber, VERSE_TOLERANCE};
use calamine::{open_workbook, Reader, Xlsx};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),
    #[error("Excel XLSX error: {0}")]
    ExcelXlsx(#[from] calamine::XlsxError),
    #[error("workbook {path} has no worksheets")]
    NoWorksheet { path: String },
    #[error("worksheet is missing required column(s): {0}")]
    MissingColumns(String),
}

/// One spreadsheet row, with the collocation column carried separately
/// from the naming fields.
#[derive(Debug, Clone)]
pub struct SheetRow {
    pub entry: NamingEntry,
    pub collocation: String,
}

impl SheetRow {
    pub fn has_collocation(&self) -> bool {
        !self.collocation.trim().is_empty()
    }
}

/// The loaded naming sheet.
#[derive(Debug, Clone, Default)]
pub struct NamingSheet {
    rows: Vec<SheetRow>,
}

impl NamingSheet {
    /// Load the first worksheet (or `sheet_name` when given) of an xlsx
    /// workbook. Rows without a parseable verse number are kept; they carry
    /// the invalid sentinel and simply never match a verse query.
    pub fn load(path: &Path, sheet_name: Option<&str>) -> Result<Self, SheetError> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;

        let name = match sheet_name {
            Some(name) => name.to_string(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| SheetError::NoWorksheet {
                    path: path.display().to_string(),
                })?,
        };
        let range = workbook.worksheet_range(&name)?;

        let mut rows_iter = range.rows();
        let header = rows_iter.next().ok_or_else(|| SheetError::NoWorksheet {
            path: path.display().to_string(),
        })?;
        let cols = find_column_indices(header)?;

        let mut rows = Vec::new();
        for row in rows_iter {
            let verse_raw = get_string_cell(row, Some(cols.verse)).unwrap_or_default();
            if verse_raw.trim().is_empty() && row_is_blank(row) {
                continue;
            }
            let entry = NamingEntry {
                named_figure: get_string_cell(row, Some(cols.named_figure)).unwrap_or_default(),
                verse: VerseNumber::parse(&verse_raw),
                self_naming: get_string_cell(row, cols.self_naming).unwrap_or_default(),
                naming_figure: get_string_cell(row, cols.naming_figure).unwrap_or_default(),
                descriptor: get_string_cell(row, cols.descriptor).unwrap_or_default(),
                narrator_label: get_string_cell(row, cols.narrator_label).unwrap_or_default(),
                status: EntryStatus::Confirmed,
                collocation: String::new(),
            };
            let collocation = get_string_cell(row, cols.collocations).unwrap_or_default();
            rows.push(SheetRow { entry, collocation });
        }

        Ok(NamingSheet { rows })
    }

    /// Build a sheet from already-materialized rows.
    pub fn from_rows(rows: Vec<SheetRow>) -> Self {
        NamingSheet { rows }
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    /// Rows whose verse equals `verse` under tolerant comparison.
    pub fn rows_for_verse(&self, verse: VerseNumber) -> Vec<&SheetRow> {
        self.rows
            .iter()
            .filter(|r| r.entry.verse.same_as(verse, VERSE_TOLERANCE))
            .collect()
    }

    /// Rows in the half-open window `[verse, verse + 1)`, catching
    /// fractional sub-line rows like 15.08 when walking verse 15.
    pub fn rows_in_verse_window(&self, verse: VerseNumber) -> Vec<&SheetRow> {
        if !verse.is_valid() {
            return Vec::new();
        }
        let lo = verse.value();
        self.rows
            .iter()
            .filter(|r| {
                r.entry.verse.is_valid()
                    && r.entry.verse.value() >= lo
                    && r.entry.verse.value() < lo + 1.0
            })
            .collect()
    }

    /// Normalized naming texts already recorded for a verse, across all
    /// three naming columns.
    pub fn namings_for_verse(&self, verse: VerseNumber) -> BTreeSet<String> {
        let mut namings = BTreeSet::new();
        for row in self.rows_for_verse(verse) {
            for field in [
                &row.entry.self_naming,
                &row.entry.descriptor,
                &row.entry.narrator_label,
            ] {
                let normalized = normalize(field);
                if !normalized.is_empty() {
                    namings.insert(normalized);
                }
            }
        }
        namings
    }

    /// All naming texts in the sheet, trimmed and lowercased. Feeds
    /// [`crate::dictionary::NamingDictionary::register_book`].
    pub fn all_naming_texts(&self) -> Vec<String> {
        let mut texts = Vec::new();
        for row in &self.rows {
            for field in [
                &row.entry.self_naming,
                &row.entry.descriptor,
                &row.entry.narrator_label,
            ] {
                let cleaned = field.trim().to_lowercase();
                if !cleaned.is_empty() {
                    texts.push(cleaned);
                }
            }
        }
        texts
    }
}

#[derive(Debug)]
struct ColumnIndices {
    named_figure: usize,
    verse: usize,
    self_naming: Option<usize>,
    naming_figure: Option<usize>,
    descriptor: Option<usize>,
    narrator_label: Option<usize>,
    collocations: Option<usize>,
}

fn find_column_indices(header: &[calamine::Data]) -> Result<ColumnIndices, SheetError> {
    let mut named_figure = None;
    let mut verse = None;
    let mut self_naming = None;
    let mut naming_figure = None;
    let mut descriptor = None;
    let mut narrator_label = None;
    let mut collocations = None;

    for (i, cell) in header.iter().enumerate() {
        if let calamine::Data::String(s) = cell {
            match s.trim().to_lowercase().as_str() {
                "benannte figur" => named_figure = Some(i),
                "vers" => verse = Some(i),
                "eigennennung" => self_naming = Some(i),
                "nennende figur" => naming_figure = Some(i),
                "bezeichnung" => descriptor = Some(i),
                "erzähler" => narrator_label = Some(i),
                "kollokationen" => collocations = Some(i),
                _ => {}
            }
        }
    }

    let mut missing = Vec::new();
    if named_figure.is_none() {
        missing.push("Benannte Figur");
    }
    if verse.is_none() {
        missing.push("Vers");
    }
    if !missing.is_empty() {
        return Err(SheetError::MissingColumns(missing.join(", ")));
    }

    Ok(ColumnIndices {
        named_figure: named_figure.unwrap_or(0),
        verse: verse.unwrap_or(0),
        self_naming,
        naming_figure,
        descriptor,
        narrator_label,
        collocations,
    })
}

fn get_string_cell(row: &[calamine::Data], col: Option<usize>) -> Option<String> {
    col.and_then(|i| row.get(i)).and_then(|cell| match cell {
        calamine::Data::String(s) => Some(s.trim().to_string()),
        calamine::Data::Int(n) => Some(n.to_string()),
        calamine::Data::Float(n) => {
            if n.fract() == 0.0 {
                Some(format!("{}", *n as i64))
            } else {
                Some(n.to_string())
            }
        }
        _ => None,
    })
}

fn row_is_blank(row: &[calamine::Data]) -> bool {
    row.iter().all(|cell| match cell {
        calamine::Data::Empty => true,
        calamine::Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}
