//! Sequence periods.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use non_empty_string::NonEmptyString;

/// The time window that scopes a form's sequence counter.
///
/// The label appears verbatim inside allocated sequence strings
/// (`ABBR-PERIODn`), and the tolerant legacy parser strips repeated
/// occurrences of it, so it is kept as an opaque non-blank string rather
/// than a structured date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Period(NonEmptyString);

impl Period {
    /// Creates a period from an explicit label.
    ///
    /// # Errors
    ///
    /// Returns [`BlankPeriodError`] if the label is empty or whitespace-only.
    pub fn new(label: impl Into<String>) -> Result<Self, BlankPeriodError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(BlankPeriodError);
        }
        NonEmptyString::new(label).map_or(Err(BlankPeriodError), |s| Ok(Self(s)))
    }

    /// The calendar-year period containing the given instant.
    ///
    /// # Panics
    ///
    /// Never panics in practice; a formatted year is never blank.
    #[must_use]
    pub fn for_date(date: &DateTime<Utc>) -> Self {
        Self::new(date.year().to_string()).expect("a formatted year is never blank")
    }

    /// The calendar-year period containing the current instant.
    #[must_use]
    pub fn current() -> Self {
        Self::for_date(&Utc::now())
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a period label is empty or whitespace-only.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("period label must not be blank")]
pub struct BlankPeriodError;

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn blank_labels_are_rejected() {
        assert_eq!(Period::new("").unwrap_err(), BlankPeriodError);
        assert_eq!(Period::new("  ").unwrap_err(), BlankPeriodError);
    }

    #[test]
    fn yearly_period_uses_the_calendar_year() {
        let date = Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap();
        assert_eq!(Period::for_date(&date).as_str(), "2025");
    }
}
