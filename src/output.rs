//! Output formatting for analysis results (CSV files, console display).

use crate::stats::{KeywordScore, KwicLine};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write keyword scores as CSV.
pub fn write_keywords<W: Write>(scores: &[KeywordScore], writer: &mut W) -> Result<(), OutputError> {
    writeln!(writer, "Wort,Zielanzahl,Referenzanzahl,Keyness,Typ")?;
    for score in scores {
        writeln!(
            writer,
            "{},{},{},{},{}",
            csv_field(&score.token),
            score.target_count,
            score.reference_count,
            score.keyness,
            score.polarity.label()
        )?;
    }
    Ok(())
}

pub fn write_keywords_file(scores: &[KeywordScore], path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    let mut file = std::fs::File::create(path)?;
    write_keywords(scores, &mut file)
}

/// Write a frequency wordlist as CSV.
pub fn write_wordlist<W: Write>(list: &[(String, usize)], writer: &mut W) -> Result<(), OutputError> {
    writeln!(writer, "Wert,Anzahl")?;
    for (value, count) in list {
        writeln!(writer, "{},{count}", csv_field(value))?;
    }
    Ok(())
}

pub fn write_wordlist_file(list: &[(String, usize)], path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    let mut file = std::fs::File::create(path)?;
    write_wordlist(list, &mut file)
}

/// Write KWIC lines as CSV.
pub fn write_kwic<W: Write>(lines: &[KwicLine], writer: &mut W) -> Result<(), OutputError> {
    writeln!(writer, "Vers,Benannte Figur,Left,Hit,Right")?;
    for line in lines {
        writeln!(
            writer,
            "{},{},{},{},{}",
            line.verse,
            csv_field(&line.figure),
            csv_field(&line.left),
            csv_field(&line.hit),
            csv_field(&line.right)
        )?;
    }
    Ok(())
}

pub fn write_kwic_file(lines: &[KwicLine], path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    let mut file = std::fs::File::create(path)?;
    write_kwic(lines, &mut file)
}

/// Print KWIC lines aligned on the hit, with the hit highlighted.
pub fn print_kwic(lines: &[KwicLine]) {
    for line in lines {
        println!(
            "{:>40}  \x1b[1m\x1b[93m{}\x1b[0m  {:<40}",
            line.left, line.hit, line.right
        );
    }
}

/// Print keyword scores as a plain table.
pub fn print_keywords(scores: &[KeywordScore]) {
    println!("{:<24} {:>8} {:>8} {:>10}  {}", "Wort", "Ziel", "Referenz", "Keyness", "Typ");
    for score in scores {
        println!(
            "{:<24} {:>8} {:>8} {:>10.2}  {}",
            score.token,
            score.target_count,
            score.reference_count,
            score.keyness,
            score.polarity.label()
        );
    }
}

fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
