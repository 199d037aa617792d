//! Naming Analysis Pipeline
//!
//! Resumable collection of character namings in medieval verse corpora,
//! with keyword and collocation analysis over the collected data.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use naming_analysis::categorize::LemmaChoice;
use naming_analysis::checkpoint::{CheckpointStore, Task};
use naming_analysis::corpus::{Corpus, VerseRecord};
use naming_analysis::dictionary::{LemmaCategory, LemmaTables, NamingDictionary};
use naming_analysis::matcher::{Confirmation, Decision, NamingCategory};
use naming_analysis::models::{CategorizedEntry, CollocationEntry, EntryStatus, NamingEntry};
use naming_analysis::output::{
    print_keywords, print_kwic, write_keywords_file, write_kwic_file, write_wordlist_file,
};
use naming_analysis::project::BookPaths;
use naming_analysis::sheet::NamingSheet;
use naming_analysis::stats::{
    extract_tokens, kwic_lines, score_keywords, wordlist, TokenUnit, DEFAULT_KEYNESS_THRESHOLD,
};
use naming_analysis::store::read_records;
use naming_analysis::verse::VERSE_TOLERANCE;
use naming_analysis::walker::{Annotator, WalkOptions, Walker};

#[derive(Parser)]
#[command(name = "naming-analysis")]
#[command(about = "Resumable annotation collection for character namings in verse corpora")]
#[command(version)]
struct Cli {
    /// Root of the data directory tree
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Slot group used as the token stream for analysis commands
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliTokenUnit {
    /// Designation slots (Bezeichnung 1-4)
    Designations,
    /// Epithet slots (Epitheta 1-5)
    Epithets,
    /// Both slot groups
    Combined,
}

impl From<CliTokenUnit> for TokenUnit {
    fn from(unit: CliTokenUnit) -> Self {
        match unit {
            CliTokenUnit::Designations => TokenUnit::Designations,
            CliTokenUnit::Epithets => TokenUnit::Epithets,
            CliTokenUnit::Combined => TokenUnit::Combined,
        }
    }
}

/// Column group for wordlist generation
#[derive(Clone, Copy, Debug, ValueEnum)]
enum WordlistColumn {
    /// Named figure column
    Figure,
    /// Designation slots
    Designations,
    /// Epithet slots
    Epithets,
    /// Designations and epithets combined
    Combined,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the verse corpus and collect annotations interactively
    Collect {
        /// Book name (names the data/<Book>/ folder)
        #[arg(long)]
        book: String,

        /// Verse corpus JSON ([{"n": .., "segments": [..]}])
        #[arg(long)]
        corpus: PathBuf,

        /// Curated naming spreadsheet (xlsx)
        #[arg(long)]
        sheet: PathBuf,

        /// Worksheet name (defaults to the first sheet)
        #[arg(long)]
        sheet_name: Option<String>,

        /// Detect naming variants missing from sheet and store
        #[arg(long)]
        naming_variants: bool,

        /// Capture collocation contexts for rows without one
        #[arg(long)]
        collocations: bool,

        /// Categorize naming texts into designations and epithets
        #[arg(long)]
        categorization: bool,
    },

    /// Count pending candidates without prompting or writing anything
    Pending {
        /// Book name
        #[arg(long)]
        book: String,

        /// Verse corpus JSON
        #[arg(long)]
        corpus: PathBuf,

        /// Curated naming spreadsheet (xlsx)
        #[arg(long)]
        sheet: PathBuf,

        /// Worksheet name (defaults to the first sheet)
        #[arg(long)]
        sheet_name: Option<String>,

        /// Suppress the progress bar
        #[arg(long)]
        quiet: bool,
    },

    /// Add a book's naming list to the shared naming dictionary
    AddBook {
        /// Book name to register
        #[arg(long)]
        book: String,

        /// Naming spreadsheet (xlsx) to harvest variants from
        #[arg(long)]
        sheet: PathBuf,

        /// Worksheet name (defaults to the first sheet)
        #[arg(long)]
        sheet_name: Option<String>,
    },

    /// G2 log-likelihood keyword analysis over categorized entries
    Keywords {
        /// Book name
        #[arg(long)]
        book: String,

        /// Restrict the target corpus to one figure
        #[arg(long)]
        figure: Option<String>,

        /// Reference books (comma-separated); default is the rest of the
        /// book's own entries
        #[arg(long, value_delimiter = ',')]
        reference_books: Vec<String>,

        /// Token unit
        #[arg(long, value_enum, default_value = "combined")]
        unit: CliTokenUnit,

        /// Significance threshold (G2) [default: 3.84]
        #[arg(long)]
        threshold: Option<f64>,

        /// Output CSV path; prints to console when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Keyword-in-context display for a classified type
    Kwic {
        /// Book name
        #[arg(long)]
        book: String,

        /// The type to search for (e.g. "kuene")
        #[arg(long)]
        type_value: String,

        /// Restrict to one figure
        #[arg(long)]
        figure: Option<String>,

        /// Output CSV path; prints to console when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Collection overview for one book: store counts and checkpoints
    Stats {
        /// Book name
        #[arg(long)]
        book: String,
    },

    /// Frequency wordlist over categorization data
    Wordlist {
        /// Book name
        #[arg(long)]
        book: String,

        /// Column group to count
        #[arg(long, value_enum, default_value = "combined")]
        column: WordlistColumn,

        /// Restrict to one figure
        #[arg(long)]
        figure: Option<String>,

        /// Output CSV path; prints to console when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Collect {
            book,
            corpus,
            sheet,
            sheet_name,
            naming_variants,
            collocations,
            categorization,
        } => {
            let options = WalkOptions {
                // With no task flag given, variant detection is the session.
                naming_variants: naming_variants
                    || (!collocations && !categorization),
                collocations,
                categorization,
            };

            let paths = BookPaths::new(&cli.data_dir, &book);
            paths.ensure()?;

            let corpus = Corpus::load(&corpus)?;
            let sheet = NamingSheet::load(&sheet, sheet_name.as_deref())?;
            let dictionary = NamingDictionary::load(&paths.naming_dictionary);
            if dictionary.is_empty() && options.naming_variants {
                eprintln!(
                    "Warning: the naming dictionary is empty; run add-book first to seed it."
                );
            }

            let mut walker = Walker::new(corpus, sheet, &dictionary, paths, options);
            let start = walker.start_index();
            if start > 0 {
                println!("Resuming at corpus index {start}.");
            }

            let mut annotator = StdinAnnotator::new();
            let summary = walker.run(&mut annotator)?;

            println!("\n=== Session Summary ===");
            println!("Verses walked: {}", summary.verses_walked);
            println!("Confirmed: {}", summary.confirmed);
            println!("Rejected: {}", summary.rejected);
            println!("Collocations added: {}", summary.collocations_added);
            println!("Categorized: {}", summary.categorized);
        }

        Commands::Pending {
            book,
            corpus,
            sheet,
            sheet_name,
            quiet,
        } => {
            let paths = BookPaths::new(&cli.data_dir, &book);
            paths.ensure()?;

            let corpus = Corpus::load(&corpus)?;
            let sheet = NamingSheet::load(&sheet, sheet_name.as_deref())?;
            let dictionary = NamingDictionary::load(&paths.naming_dictionary);

            let options = WalkOptions {
                naming_variants: true,
                ..WalkOptions::default()
            };
            let walker = Walker::new(corpus, sheet, &dictionary, paths, options);
            let scan = walker.scan(!quiet);

            println!("Resume index: {}", scan.start_index);
            println!("Verses remaining: {}", scan.verses_scanned);
            println!("Pending candidates: {}", scan.pending_candidates);
        }

        Commands::AddBook {
            book,
            sheet,
            sheet_name,
        } => {
            let dict_path = cli.data_dir.join("naming_variants_dict.json");
            let mut dictionary = NamingDictionary::load(&dict_path);
            if !dictionary.included_books.is_empty() {
                println!(
                    "Included books: {}",
                    dictionary.included_books.join(", ")
                );
            }

            let sheet = NamingSheet::load(&sheet, sheet_name.as_deref())?;
            let variants = sheet.all_naming_texts();
            dictionary.register_book(&book, &variants);
            dictionary.save(&dict_path)?;

            let count = dictionary
                .namings
                .get(&book)
                .map(Vec::len)
                .unwrap_or(0);
            println!("Book '{book}' added with {count} naming variants.");
            println!("Dictionary saved at: {}", dict_path.display());
        }

        Commands::Keywords {
            book,
            figure,
            reference_books,
            unit,
            threshold,
            output,
        } => {
            let paths = BookPaths::new(&cli.data_dir, &book);
            let entries: Vec<CategorizedEntry> = read_records(&paths.categorization);
            let unit = TokenUnit::from(unit);

            let target_entries: Vec<CategorizedEntry> = match &figure {
                Some(figure) => entries
                    .iter()
                    .filter(|e| &e.entry.named_figure == figure)
                    .cloned()
                    .collect(),
                None => entries.clone(),
            };

            let reference_entries: Vec<CategorizedEntry> = if reference_books.is_empty() {
                // Rest of the book's own data.
                match &figure {
                    Some(figure) => entries
                        .iter()
                        .filter(|e| &e.entry.named_figure != figure)
                        .cloned()
                        .collect(),
                    None => Vec::new(),
                }
            } else {
                let mut reference = Vec::new();
                for reference_book in &reference_books {
                    let ref_paths = BookPaths::new(&cli.data_dir, reference_book);
                    reference.extend(read_records::<CategorizedEntry>(&ref_paths.categorization));
                }
                reference
            };

            let target_tokens = extract_tokens(&target_entries, unit);
            let reference_tokens = extract_tokens(&reference_entries, unit);
            let scores = score_keywords(
                &target_tokens,
                &reference_tokens,
                threshold.unwrap_or(DEFAULT_KEYNESS_THRESHOLD),
            );

            match output {
                Some(path) => {
                    write_keywords_file(&scores, &path)?;
                    println!("Keyword analysis written to: {}", path.display());
                }
                None => print_keywords(&scores),
            }
        }

        Commands::Kwic {
            book,
            type_value,
            figure,
            output,
        } => {
            let paths = BookPaths::new(&cli.data_dir, &book);
            let mut entries: Vec<CategorizedEntry> = read_records(&paths.categorization);
            if let Some(figure) = &figure {
                entries.retain(|e| &e.entry.named_figure == figure);
            }
            let contexts: Vec<CollocationEntry> = read_records(&paths.collocations);

            let tables = LemmaTables::load(
                &paths.lemma_normalization,
                &paths.ignored_lemmas,
                &paths.lemma_categories,
            );
            let mut variants: Vec<String> = tables.variants_of(&type_value).to_vec();
            variants.push(type_value.trim().to_lowercase());

            let lines = kwic_lines(&entries, &contexts, &type_value, &variants);
            match output {
                Some(path) => {
                    write_kwic_file(&lines, &path)?;
                    println!("Collocation results saved to: {}", path.display());
                }
                None => print_kwic(&lines),
            }
        }

        Commands::Stats { book } => {
            let paths = BookPaths::new(&cli.data_dir, &book);
            let entries: Vec<NamingEntry> = read_records(&paths.missing_variants);
            let confirmed = entries
                .iter()
                .filter(|e| e.status == EntryStatus::Confirmed)
                .count();
            let collocations: Vec<CollocationEntry> = read_records(&paths.collocations);
            let categorized: Vec<CategorizedEntry> = read_records(&paths.categorization);
            let checkpoint = CheckpointStore::load(&paths.progress);

            println!("=== {} ===", paths.book);
            println!(
                "Collected naming variants: {} ({} confirmed, {} rejected)",
                entries.len(),
                confirmed,
                entries.len() - confirmed
            );
            println!("Collocations: {}", collocations.len());
            println!("Categorized entries: {}", categorized.len());
            for task in [Task::NamingVariants, Task::Collocations, Task::Categorization] {
                println!("Checkpoint {:?}: verse {}", task, checkpoint.last(task));
            }
        }

        Commands::Wordlist {
            book,
            column,
            figure,
            output,
        } => {
            let paths = BookPaths::new(&cli.data_dir, &book);
            let mut entries: Vec<CategorizedEntry> = read_records(&paths.categorization);
            if let Some(figure) = &figure {
                entries.retain(|e| &e.entry.named_figure == figure);
            }

            let values: Vec<String> = match column {
                WordlistColumn::Figure => entries
                    .iter()
                    .map(|e| e.entry.named_figure.clone())
                    .collect(),
                WordlistColumn::Designations => extract_tokens(&entries, TokenUnit::Designations),
                WordlistColumn::Epithets => extract_tokens(&entries, TokenUnit::Epithets),
                WordlistColumn::Combined => extract_tokens(&entries, TokenUnit::Combined),
            };
            let list = wordlist(values);

            match output {
                Some(path) => {
                    write_wordlist_file(&list, &path)?;
                    println!("Wordlist written to: {}", path.display());
                }
                None => {
                    for (value, count) in &list {
                        println!("{value}: {count}");
                    }
                }
            }
        }
    }

    Ok(())
}

/// Interactive annotator over stdin/stdout.
struct StdinAnnotator {
    stdin: std::io::Stdin,
}

impl StdinAnnotator {
    fn new() -> Self {
        StdinAnnotator {
            stdin: std::io::stdin(),
        }
    }

    fn read_line(&mut self, prompt: &str) -> String {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if self.stdin.lock().read_line(&mut line).is_err() {
            return String::new();
        }
        line.trim().to_string()
    }

    fn ask_choice(&mut self, prompt: &str, options: &[&str]) -> String {
        loop {
            let answer = self.read_line(prompt).to_lowercase();
            if options.contains(&answer.as_str()) {
                return answer;
            }
            println!("Please enter one of: {}", options.join(", "));
        }
    }

    fn print_context(
        &self,
        verse: &VerseRecord,
        context: &[(usize, &VerseRecord)],
        highlight: Option<&str>,
    ) {
        for (number, line) in context {
            let mut text = line.raw_text.clone();
            if let Some(term) = highlight {
                text = text.replace(term, &format!("\x1b[1m\x1b[93m{term}\x1b[0m"));
            }
            let marker = if line.number.same_as(verse.number, VERSE_TOLERANCE) {
                ">"
            } else {
                " "
            };
            println!("{marker}[{number}] ({}) {text}", line.number);
        }
    }

    /// Parse a line selection like "6" or "5-7" against display numbers.
    fn select_lines(&mut self, context: &[(usize, &VerseRecord)]) -> Option<String> {
        loop {
            let input = self.read_line("Line number(s) (e.g. '6' or '5-7', empty to skip): ");
            if input.is_empty() {
                return None;
            }
            let range = if let Some((start, end)) = input.split_once('-') {
                match (start.trim().parse::<usize>(), end.trim().parse::<usize>()) {
                    (Ok(start), Ok(end)) if start <= end => Some((start, end)),
                    _ => None,
                }
            } else {
                input.trim().parse::<usize>().ok().map(|n| (n, n))
            };
            let Some((start, end)) = range else {
                println!("Invalid input. Please enter a single number or a range.");
                continue;
            };
            let selected: Vec<&str> = context
                .iter()
                .filter(|(number, _)| *number >= start && *number <= end)
                .map(|(_, line)| line.raw_text.as_str())
                .collect();
            if selected.is_empty() {
                println!("No lines in that range.");
                continue;
            }
            return Some(selected.join(" / "));
        }
    }
}

impl Annotator for StdinAnnotator {
    fn decide_candidate(
        &mut self,
        candidate: &str,
        verse: &VerseRecord,
        context: &[(usize, &VerseRecord)],
    ) -> Decision {
        println!("\n{}", "-".repeat(60));
        println!("New naming variant found that is not listed yet!");
        println!("Detected naming variant: \"{candidate}\"");
        self.print_context(verse, context, Some(candidate));

        match self
            .ask_choice("Is this a missing naming variant? (y/n/s = skip): ", &["y", "n", "s"])
            .as_str()
        {
            "n" => return Decision::Reject,
            "s" => return Decision::Skip,
            _ => {}
        }

        let adapted = {
            let answer = self.ask_choice(
                "Shorten or lengthen the naming variant? (y/n): ",
                &["y", "n"],
            );
            if answer == "y" {
                let text = self.read_line("Enter the adapted naming variant: ");
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            } else {
                None
            }
        };

        println!("Category: [1] Eigennennung  [2] Bezeichnung  [3] Erzaehler  [4] Skip");
        let category = match self.ask_choice("Your selection: ", &["1", "2", "3", "4"]).as_str() {
            "1" => NamingCategory::SelfNaming,
            "2" => NamingCategory::Descriptor,
            "3" => NamingCategory::Narrator,
            _ => return Decision::Skip,
        };

        let named_figure = self.read_line("Named figure: ");
        let naming_figure = if category == NamingCategory::Descriptor {
            let figure = self.read_line("Naming figure: ");
            if figure.is_empty() {
                None
            } else {
                Some(figure)
            }
        } else {
            None
        };

        let collocation = {
            let answer = self.ask_choice("Add a collocation (context lines)? (y/n): ", &["y", "n"]);
            if answer == "y" {
                self.select_lines(context)
            } else {
                None
            }
        };

        Decision::Confirm(Confirmation {
            category,
            adapted_text: adapted,
            named_figure,
            naming_figure,
            collocation,
        })
    }

    fn capture_collocation(
        &mut self,
        verse: &VerseRecord,
        figure: &str,
        naming: &str,
        context: &[(usize, &VerseRecord)],
    ) -> Option<String> {
        println!("\nEmpty collocation field in verse {}!", verse.number);
        println!("{figure}: {naming}");
        self.print_context(verse, context, Some(naming));
        self.select_lines(context)
    }

    fn resolve_lemmas(&mut self, tokens: &[&str]) -> Vec<String> {
        println!("Please add lemma(ta) for {} (comma-separated):", tokens.join(", "));
        let input = self.read_line("> ");
        input
            .split(',')
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }

    fn classify_lemma(&mut self, lemma: &str, remembered: Option<LemmaCategory>) -> LemmaChoice {
        let default = match remembered {
            Some(LemmaCategory::Designation) => "[a]",
            Some(LemmaCategory::Epithet) => "[e]",
            None => "",
        };
        let input = self.read_line(&format!("{lemma:<12} -> {default} "));

        match input.as_str() {
            "<" => LemmaChoice::Back,
            "a" => LemmaChoice::Assign(LemmaCategory::Designation),
            "e" => LemmaChoice::Assign(LemmaCategory::Epithet),
            "" => {
                if remembered.is_some() {
                    LemmaChoice::Accept
                } else {
                    let confirm = self.ask_choice(
                        &format!("Really ignore lemma \"{lemma}\"? (y/n): "),
                        &["y", "n"],
                    );
                    if confirm == "y" {
                        LemmaChoice::Ignore
                    } else {
                        self.classify_lemma(lemma, remembered)
                    }
                }
            }
            correction => {
                let category = match self
                    .ask_choice(&format!("Category for \"{correction}\" (a/e): "), &["a", "e"])
                    .as_str()
                {
                    "a" => LemmaCategory::Designation,
                    _ => LemmaCategory::Epithet,
                };
                LemmaChoice::Replace {
                    text: correction.to_string(),
                    category,
                }
            }
        }
    }

    fn confirm_skip_unclassified(&mut self, naming: &str) -> bool {
        println!("No entry for \"{naming}\".");
        self.ask_choice("Really skip this entry? (y/n): ", &["y", "n"]) == "y"
    }
}
