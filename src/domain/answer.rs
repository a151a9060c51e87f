//! Submitted answers.

use serde::{Deserialize, Serialize};

use crate::domain::field::FieldId;

/// A two-valued disposition an inspector can attach to an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassOrHold {
    /// The inspected item passes.
    Pass,
    /// The inspected item is held for review.
    Hold,
}

/// One submitted value for one field instance within one inspection.
///
/// `field_id` is `None` for answers to dynamically revealed branch fields,
/// which are not part of the stored schema. Records are created at submission
/// time and become immutable once the inspection leaves draft state; that
/// workflow transition is enforced by an external collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerRecord {
    /// The answered field, if it exists in the stored schema.
    pub field_id: Option<FieldId>,

    /// Textual answer value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_value: Option<String>,

    /// Numeric answer value (measurement kinds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,

    /// Optional pass/hold disposition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_or_hold: Option<PassOrHold>,

    /// Computed by the flag evaluator. Never client-supplied: incoming
    /// payloads cannot set it, deserialization always yields `false`.
    #[serde(skip_deserializing)]
    pub is_flagged: bool,
}

impl AnswerRecord {
    /// An answer carrying a textual value.
    #[must_use]
    pub fn text(field_id: Option<FieldId>, value: impl Into<String>) -> Self {
        Self {
            field_id,
            text_value: Some(value.into()),
            ..Self::default()
        }
    }

    /// An answer carrying a numeric reading.
    #[must_use]
    pub fn numeric(field_id: Option<FieldId>, value: f64) -> Self {
        Self {
            field_id,
            numeric_value: Some(value),
            ..Self::default()
        }
    }

    /// An answer with no value at all (e.g. a skipped optional measurement).
    #[must_use]
    pub fn empty(field_id: Option<FieldId>) -> Self {
        Self {
            field_id,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_flagged_cannot_be_client_supplied() {
        let record: AnswerRecord =
            serde_json::from_str(r#"{"text_value": "Hold", "is_flagged": true}"#).unwrap();
        assert!(!record.is_flagged);
        assert_eq!(record.text_value.as_deref(), Some("Hold"));
    }

    #[test]
    fn null_field_id_round_trips() {
        let record = AnswerRecord::text(None, "revealed answer");
        let json = serde_json::to_string(&record).unwrap();
        let back: AnswerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.field_id, None);
        assert_eq!(back.text_value.as_deref(), Some("revealed answer"));
    }
}
