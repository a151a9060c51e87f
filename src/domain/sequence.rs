//! Human-readable sequence identifiers.
//!
//! An allocated sequence string has the shape `ABBR-PERIODn`: a short
//! abbreviation derived from the form's display name, the period label, and
//! an unpadded counter. Historical records predate this format and were
//! written inconsistently (zero-padded counters, the period concatenated
//! twice), so parsing of stored values is deliberately tolerant: anything
//! that cannot be read as a legacy sequence is skipped, never fatal.

use std::fmt;

use non_empty_string::NonEmptyString;

use crate::domain::period::Period;

/// Maximum characters kept from each display-name token.
const TOKEN_WIDTH: usize = 3;

/// Number of display-name tokens contributing to an abbreviation.
const TOKEN_COUNT: usize = 2;

/// A short uppercase abbreviation of a form's display name.
///
/// Built from the first two alphanumeric tokens of the name, each truncated
/// to three characters, uppercased and hyphen-joined: "Graphic Inspection
/// Report" becomes `GRA-INS`. A name yielding no tokens falls back to `DOC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Abbreviation(NonEmptyString);

impl Abbreviation {
    /// The abbreviation used when a display name yields no tokens, and for
    /// the graceful fallback sequence of an unknown form.
    #[must_use]
    pub fn fallback() -> Self {
        Self::of("DOC")
    }

    /// Derives the abbreviation for a form display name.
    #[must_use]
    pub fn from_display_name(name: &str) -> Self {
        let joined = name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .take(TOKEN_COUNT)
            .map(|token| {
                token
                    .chars()
                    .take(TOKEN_WIDTH)
                    .flat_map(char::to_uppercase)
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("-");

        if joined.is_empty() {
            Self::fallback()
        } else {
            Self::of(&joined)
        }
    }

    /// Returns the abbreviation as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn of(s: &str) -> Self {
        NonEmptyString::new(s.to_string())
            .map(Self)
            .expect("abbreviations are never empty")
    }
}

impl fmt::Display for Abbreviation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully resolved sequence identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceId {
    abbr: Abbreviation,
    period: Period,
    number: u64,
}

impl SequenceId {
    /// Assembles a sequence identifier from pre-validated parts.
    #[must_use]
    pub const fn new(abbr: Abbreviation, period: Period, number: u64) -> Self {
        Self {
            abbr,
            period,
            number,
        }
    }

    /// The fixed fallback identifier returned when a form cannot be
    /// resolved: `DOC-<period>1`.
    #[must_use]
    pub fn unknown_form(period: Period) -> Self {
        Self::new(Abbreviation::fallback(), period, 1)
    }

    /// The counter component.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// The `ABBR-PERIOD` prefix shared by every allocation in a period.
    #[must_use]
    pub fn prefix(abbr: &Abbreviation, period: &Period) -> String {
        format!("{abbr}-{period}")
    }

    /// Reads the counter out of a stored legacy value, tolerantly.
    ///
    /// The value must start with the `ABBR-PERIOD` prefix. Any further
    /// *leading* repetitions of the literal period label are stripped (some
    /// historical records concatenated the period twice), and the remaining
    /// digit tail is parsed, zero-padding and all. Returns `None` for
    /// values that do not belong to this prefix or whose tail is not a
    /// plain digit string; callers skip those rather than fail.
    ///
    /// This is a compatibility heuristic, not an injective decoding: a
    /// counter that happens to begin with the period digits will be
    /// mis-read. Steady-state allocations never re-parse their own output
    /// beyond one backfill scan, which bounds the damage.
    #[must_use]
    pub fn parse_legacy_tail(value: &str, abbr: &Abbreviation, period: &Period) -> Option<u64> {
        let prefix = Self::prefix(abbr, period);
        let mut tail = value.strip_prefix(prefix.as_str())?;
        while let Some(stripped) = tail.strip_prefix(period.as_str()) {
            tail = stripped;
        }
        if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        tail.parse().ok()
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}{}", self.abbr, self.period, self.number)
    }
}
