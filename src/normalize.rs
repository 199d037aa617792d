//! Canonical text normalization for orthographic variant comparison.
//!
//! Every equality check in the pipeline (matcher skip logic, dedup keys,
//! collocation lookups) goes through [`normalize`]. The rule table is frozen:
//! changing it invalidates dedup keys of previously collected annotations.

use once_cell::sync::Lazy;
use regex::Regex;

/// Diacritic / ligature / historical-spelling substitutions, applied in order
/// after lower-casing. Order matters: `iu` and `üe` operate on the already
/// lower-cased text.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("æ", "ae"),
    ("œ", "oe"),
    ("é", "e"),
    ("è", "e"),
    ("ë", "e"),
    ("á", "a"),
    ("à", "a"),
    ("û", "u"),
    ("î", "i"),
    ("â", "a"),
    ("ô", "o"),
    ("ê", "e"),
    ("ü", "u"),
    ("ö", "o"),
    ("ä", "a"),
    ("ß", "ss"),
    ("iu", "ie"),
    ("üe", "ue"),
];

static RE_LONE_V: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bv\b").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a text fragment into its canonical comparable form.
///
/// Lower-cases, applies the fixed substitution table, replaces a standalone
/// `v` token with `f`, and collapses whitespace runs. Total and idempotent;
/// the empty string maps to itself.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = text.to_lowercase();
    for (old, new) in SUBSTITUTIONS {
        if out.contains(old) {
            out = out.replace(old, new);
        }
    }

    let out = RE_LONE_V.replace_all(&out, "f");
    RE_WHITESPACE.replace_all(&out, " ").into_owned()
}

/// First non-empty string among the given fields, or `""` if none.
pub fn first_valid_text<'a>(fields: &[&'a str]) -> &'a str {
    fields
        .iter()
        .copied()
        .find(|f| !f.trim().is_empty())
        .unwrap_or("")
}
