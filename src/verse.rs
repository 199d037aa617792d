//! Verse number parsing and tolerant comparison.
//!
//! Source spreadsheets mix integer verse numbers with sub-line fractional
//! numbering (an inserted half-line may be `15,08`), and cells can be
//! malformed. [`VerseNumber`] folds all of that into one comparable type:
//! parse failures yield a sentinel instead of an error, equality is
//! tolerance-based, and the canonical `(integer, hundredths)` key drives
//! deduplication and ordering everywhere else.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Default tolerance for verse equality comparisons.
pub const VERSE_TOLERANCE: f64 = 1e-4;

/// A verse position, possibly fractional. Invalid inputs carry the
/// sentinel value −1 and compare equal to nothing.
#[derive(Debug, Clone, Copy)]
pub struct VerseNumber(f64);

impl VerseNumber {
    /// Sentinel for unparseable verse values.
    pub const INVALID: VerseNumber = VerseNumber(-1.0);

    /// Parse a verse number from a string, accepting `.` or `,` as the
    /// decimal separator. Never fails; malformed input yields the sentinel.
    pub fn parse(value: &str) -> VerseNumber {
        match value.trim().replace(',', ".").parse::<f64>() {
            Ok(v) if v.is_finite() => VerseNumber(v),
            _ => VerseNumber::INVALID,
        }
    }

    pub fn from_f64(value: f64) -> VerseNumber {
        if value.is_finite() {
            VerseNumber(value)
        } else {
            VerseNumber::INVALID
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// A verse is valid when it parsed to a non-negative number.
    pub fn is_valid(self) -> bool {
        self.0 >= 0.0
    }

    /// Tolerance-based equality. `false` when either side is invalid,
    /// never an error.
    pub fn same_as(self, other: VerseNumber, tolerance: f64) -> bool {
        self.is_valid() && other.is_valid() && (self.0 - other.0).abs() < tolerance
    }

    /// Canonical key: `(integer part, rounded hundredths of the fractional
    /// part)`. Basis for dedup keys, sorting, `Eq` and `Hash`.
    pub fn key(self) -> (i64, i64) {
        let mut int = self.0.trunc() as i64;
        let mut frac = ((self.0 - self.0.trunc()) * 100.0).round() as i64;
        // .995 and up rounds to a full integer step.
        if frac == 100 {
            int += 1;
            frac = 0;
        }
        (int, frac)
    }
}

/// Convenience wrapper mirroring the spreadsheet-facing contract:
/// tolerant equality over two raw verse strings.
pub fn same_verse(a: &str, b: &str) -> bool {
    VerseNumber::parse(a).same_as(VerseNumber::parse(b), VERSE_TOLERANCE)
}

impl PartialEq for VerseNumber {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for VerseNumber {}

impl std::hash::Hash for VerseNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for VerseNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VerseNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for VerseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (int, frac) = self.key();
        if frac == 0 {
            write!(f, "{int}")
        } else {
            write!(f, "{int}.{frac:02}")
        }
    }
}

impl Default for VerseNumber {
    fn default() -> Self {
        VerseNumber::INVALID
    }
}

// Wire format: accept JSON numbers or strings on input (curated files mix
// both); emit the standardized form — plain integer when fractionless,
// otherwise a two-decimal float — so repeated writes are byte-identical.
impl Serialize for VerseNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (int, frac) = self.key();
        if frac == 0 {
            serializer.serialize_i64(int)
        } else {
            serializer.serialize_f64((int as f64) + (frac as f64) / 100.0)
        }
    }
}

struct VerseVisitor;

impl<'de> Visitor<'de> for VerseVisitor {
    type Value = VerseNumber;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a verse number (number or string)")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(VerseNumber::from_f64(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(VerseNumber::from_f64(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(VerseNumber::from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(VerseNumber::parse(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(VerseNumber::INVALID)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(VerseNumber::INVALID)
    }
}

impl<'de> Deserialize<'de> for VerseNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VerseVisitor)
    }
}
