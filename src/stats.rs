//! Keyword and collocation statistics over categorized annotation data.

use crate::models::{CategorizedEntry, CollocationEntry};
use crate::verse::{VerseNumber, VERSE_TOLERANCE};
use std::collections::HashMap;

/// Significance threshold for G² at p < 0.05, one degree of freedom.
pub const DEFAULT_KEYNESS_THRESHOLD: f64 = 3.84;

/// Which slot group feeds the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenUnit {
    Designations,
    Epithets,
    Combined,
}

impl TokenUnit {
    pub fn label(self) -> &'static str {
        match self {
            TokenUnit::Designations => "bezeichnung",
            TokenUnit::Epithets => "epitheta",
            TokenUnit::Combined => "combined",
        }
    }
}

/// Whether a keyword is over- or under-represented in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    pub fn label(self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
            Polarity::Neutral => "neutral",
        }
    }
}

/// One significant keyword with its counts and G² score.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordScore {
    pub token: String,
    pub target_count: usize,
    pub reference_count: usize,
    pub keyness: f64,
    pub polarity: Polarity,
}

/// Flatten designation/epithet slots into a token list, in entry order.
pub fn extract_tokens(entries: &[CategorizedEntry], unit: TokenUnit) -> Vec<String> {
    let mut tokens = Vec::new();
    for entry in entries {
        if matches!(unit, TokenUnit::Designations | TokenUnit::Combined) {
            tokens.extend(entry.designations().map(str::to_string));
        }
        if matches!(unit, TokenUnit::Epithets | TokenUnit::Combined) {
            tokens.extend(entry.epithets().map(str::to_string));
        }
    }
    tokens
}

/// G² log-likelihood keyword scores for the target token stream against a
/// reference stream.
///
/// G² = 2·(cₜ·log₂(cₜ/Eₜ) + cᵣ·log₂(cᵣ/Eᵣ)) with expectations from the
/// pooled relative frequency; log terms drop out on zero counts or zero
/// expectations. Only tokens at or above `threshold` are returned, sorted
/// by descending keyness, then token.
pub fn score_keywords(
    target_tokens: &[String],
    reference_tokens: &[String],
    threshold: f64,
) -> Vec<KeywordScore> {
    let target_counts = count(target_tokens);
    let reference_counts = count(reference_tokens);

    let total_target: usize = target_counts.values().sum();
    let total_reference: usize = reference_counts.values().sum();
    let pooled_total = (total_target + total_reference) as f64;
    if pooled_total == 0.0 {
        return Vec::new();
    }

    let mut results = Vec::new();
    for (token, &count_t) in &target_counts {
        let count_r = reference_counts.get(token).copied().unwrap_or(0);
        if count_t + count_r == 0 {
            continue;
        }

        let p = (count_t + count_r) as f64 / pooled_total;
        let expected_t = p * total_target as f64;
        let expected_r = p * total_reference as f64;

        let log_t = if count_t > 0 && expected_t > 0.0 {
            count_t as f64 * (count_t as f64 / expected_t).log2()
        } else {
            0.0
        };
        let log_r = if count_r > 0 && expected_r > 0.0 {
            count_r as f64 * (count_r as f64 / expected_r).log2()
        } else {
            0.0
        };

        // The threshold compares the unrounded statistic; rounding is
        // display-only.
        let g2 = 2.0 * (log_t + log_r);
        if g2 < threshold {
            continue;
        }
        let keyness = round2(g2);

        let polarity = match count_t.cmp(&count_r) {
            std::cmp::Ordering::Greater => Polarity::Positive,
            std::cmp::Ordering::Less => Polarity::Negative,
            std::cmp::Ordering::Equal => Polarity::Neutral,
        };

        results.push(KeywordScore {
            token: token.clone(),
            target_count: count_t,
            reference_count: count_r,
            keyness,
            polarity,
        });
    }

    results.sort_by(|a, b| {
        b.keyness
            .partial_cmp(&a.keyness)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.token.cmp(&b.token))
    });
    results
}

/// Frequency list of non-empty values, sorted by descending count, then
/// value.
pub fn wordlist<I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        let cleaned = value.trim().to_string();
        if cleaned.is_empty() {
            continue;
        }
        *counts.entry(cleaned).or_insert(0) += 1;
    }
    let mut list: Vec<(String, usize)> = counts.into_iter().collect();
    list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    list
}

fn count(tokens: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0) += 1;
    }
    counts
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One keyword-in-context line.
#[derive(Debug, Clone, PartialEq)]
pub struct KwicLine {
    pub verse: VerseNumber,
    pub figure: String,
    pub left: String,
    pub hit: String,
    pub right: String,
}

/// Split a context string at the first occurrence of any variant
/// (case-insensitive). When nothing matches, the whole context lands on
/// the left with an empty hit.
pub fn format_kwic(context: &str, variants: &[String]) -> (String, String, String) {
    let context_lower = context.to_lowercase();
    for variant in variants {
        let needle = variant.to_lowercase();
        if needle.is_empty() {
            continue;
        }
        if let Some(index) = context_lower.find(&needle) {
            // Lowercasing is length-preserving for this corpus, but guard
            // the slice boundaries anyway.
            let end = index + needle.len();
            if !context.is_char_boundary(index) || !context.is_char_boundary(end) {
                continue;
            }
            let left = context[..index].trim().to_string();
            let hit = context[index..end].to_string();
            let right = context[end..].trim().to_string();
            return (left, hit, right);
        }
    }
    (context.trim().to_string(), String::new(), String::new())
}

/// KWIC lines for every categorized entry carrying `type_value` in one of
/// its slots, joined with the stored collocation contexts for its verse,
/// figure, and naming text. `variants` are the surface forms of the type
/// (its lemma variants plus the type itself).
pub fn kwic_lines(
    entries: &[CategorizedEntry],
    contexts: &[CollocationEntry],
    type_value: &str,
    variants: &[String],
) -> Vec<KwicLine> {
    let mut lines = Vec::new();
    for entry in entries {
        let has_type = entry
            .designations()
            .chain(entry.epithets())
            .any(|slot| slot == type_value);
        if !has_type {
            continue;
        }

        let context = contexts.iter().find(|c| {
            c.verse.same_as(entry.entry.verse, VERSE_TOLERANCE)
                && c.named_figure == entry.entry.named_figure
                && c.naming == entry.entry.naming_text()
        });
        let Some(context) = context else {
            continue;
        };
        if context.context.trim().is_empty() {
            continue;
        }

        let (left, hit, right) = format_kwic(&context.context, variants);
        lines.push(KwicLine {
            verse: entry.entry.verse,
            figure: entry.entry.named_figure.clone(),
            left,
            hit,
            right,
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryStatus, NamingEntry};

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn categorized(
        verse: f64,
        figure: &str,
        descriptor: &str,
        designations: &[&str],
        epithets: &[&str],
    ) -> CategorizedEntry {
        let entry = NamingEntry {
            named_figure: figure.to_string(),
            verse: VerseNumber::from_f64(verse),
            self_naming: String::new(),
            naming_figure: String::new(),
            descriptor: descriptor.to_string(),
            narrator_label: String::new(),
            status: EntryStatus::Confirmed,
            collocation: String::new(),
        };
        CategorizedEntry::from_parts(entry, &tokens(designations), &tokens(epithets))
    }

    #[test]
    fn test_keyword_scoring_flags_overrepresented_token() {
        // "kuene" dominates the target, "guot" the reference.
        let target = tokens(&["kuene", "kuene", "kuene", "kuene", "recke"]);
        let reference = tokens(&["guot", "guot", "guot", "guot", "recke"]);

        let scores = score_keywords(&target, &reference, DEFAULT_KEYNESS_THRESHOLD);
        let kuene = scores.iter().find(|s| s.token == "kuene").unwrap();
        assert_eq!(kuene.polarity, Polarity::Positive);
        assert_eq!(kuene.target_count, 4);
        assert_eq!(kuene.reference_count, 0);
        assert!(kuene.keyness >= DEFAULT_KEYNESS_THRESHOLD);

        // Evenly distributed token falls below the threshold.
        assert!(scores.iter().all(|s| s.token != "recke"));
    }

    #[test]
    fn test_keyword_scores_sorted_by_keyness_then_token() {
        let target = tokens(&["a", "a", "a", "b", "b", "b"]);
        let reference = tokens(&["c", "c", "c", "c", "c", "c"]);
        let scores = score_keywords(&target, &reference, 0.0);
        let order: Vec<&str> = scores.iter().map(|s| s.token.as_str()).collect();
        // a and b tie; c sorts after on keyness parity rules or below.
        assert_eq!(&order[..2], &["a", "b"]);
    }

    #[test]
    fn test_empty_streams_score_nothing() {
        assert!(score_keywords(&[], &[], 3.84).is_empty());
    }

    #[test]
    fn test_threshold_compares_unrounded_keyness() {
        // "kuene" scores G2 = 2.780719..., which rounds down to 2.78.
        let target = tokens(&["kuene", "kuene", "kuene", "kuene", "degen"]);
        let reference = tokens(&["kuene", "degen", "degen", "degen", "degen"]);

        // A threshold between the rounded and the exact value must still
        // admit the token.
        let scores = score_keywords(&target, &reference, 2.7804);
        let kuene = scores.iter().find(|s| s.token == "kuene").unwrap();
        assert_eq!(kuene.keyness, 2.78);
    }

    #[test]
    fn test_extract_tokens_units() {
        let e = categorized(1.0, "X", "der kuene recke", &["recke"], &["kuene"]);
        assert_eq!(extract_tokens(&[e.clone()], TokenUnit::Designations), vec!["recke"]);
        assert_eq!(extract_tokens(&[e.clone()], TokenUnit::Epithets), vec!["kuene"]);
        assert_eq!(
            extract_tokens(&[e], TokenUnit::Combined),
            vec!["recke", "kuene"]
        );
    }

    #[test]
    fn test_wordlist_counts_and_orders() {
        let list = wordlist(tokens(&["helt", "recke", "helt", " ", "recke", "helt"]));
        assert_eq!(list, vec![("helt".to_string(), 3), ("recke".to_string(), 2)]);
    }

    #[test]
    fn test_format_kwic_splits_at_first_variant() {
        let (left, hit, right) =
            format_kwic("ein vil Kuener recke was", &tokens(&["kuener", "kuene"]));
        assert_eq!(left, "ein vil");
        assert_eq!(hit, "Kuener");
        assert_eq!(right, "recke was");
    }

    #[test]
    fn test_format_kwic_without_match() {
        let (left, hit, right) = format_kwic("ein guoter man", &tokens(&["kuene"]));
        assert_eq!(left, "ein guoter man");
        assert!(hit.is_empty());
        assert!(right.is_empty());
    }

    #[test]
    fn test_kwic_lines_join_on_verse_figure_and_naming() {
        let entry = categorized(12.0, "Kriemhilt", "der kuene recke", &[], &["kuene"]);
        let context = CollocationEntry {
            verse: VerseNumber::from_f64(12.0),
            named_figure: "Kriemhilt".to_string(),
            naming: "der kuene recke".to_string(),
            context: "dort sach man den kuene stan".to_string(),
        };
        let other_figure = CollocationEntry {
            named_figure: "Hagen".to_string(),
            ..context.clone()
        };

        let lines = kwic_lines(
            &[entry.clone()],
            &[other_figure, context],
            "kuene",
            &tokens(&["kuene"]),
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].hit, "kuene");
        assert_eq!(lines[0].figure, "Kriemhilt");

        // Type not present in any slot yields nothing.
        assert!(kwic_lines(&[entry], &[], "recke", &tokens(&["recke"])).is_empty());
    }
}
