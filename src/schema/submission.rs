//! Submission-time checks for grouped-entry answers.
//!
//! A grouped-entry field is answered as a structured bundle mapping nested
//! field names to values. The checks here verify the bundle against the
//! normalized schema: required nested fields must be present, and select
//! answers must be drawn from the declared options. This layer sits above
//! the conditional resolver, which deliberately does not validate value
//! correctness.

use std::collections::HashMap;

use crate::domain::{Field, FieldControl};

/// Errors rejecting a grouped-entry answer bundle.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// A required nested field has no answer.
    #[error("required field '{name}' in group '{group}' is missing")]
    MissingRequired {
        /// The grouped-entry field name.
        group: String,
        /// The missing nested field name.
        name: String,
    },

    /// A select answer is not one of the declared options.
    #[error("'{value}' is not an option of field '{name}' in group '{group}'")]
    NotAnOption {
        /// The grouped-entry field name.
        group: String,
        /// The nested field name.
        name: String,
        /// The rejected answer value.
        value: String,
    },
}

/// Checks a grouped-entry answer bundle against its field definition.
///
/// Fields of any other kind pass trivially. Empty string values are treated
/// as absent (consistent with how optional nested fields are submitted) and
/// only fail when the nested field is required.
///
/// # Errors
///
/// Returns the first [`SubmissionError`] encountered, in nested field
/// order.
pub fn check_group_submission(
    field: &Field,
    values: &HashMap<String, String>,
) -> Result<(), SubmissionError> {
    let FieldControl::GroupedEntry { fields } = &field.control else {
        return Ok(());
    };

    for nested in fields.iter() {
        let value = values
            .get(nested.name.as_str())
            .filter(|value| !value.is_empty());

        match value {
            None if nested.is_required => {
                return Err(SubmissionError::MissingRequired {
                    group: field.name.to_string(),
                    name: nested.name.to_string(),
                });
            }
            Some(value) => {
                if let Some(options) = nested.control.options() {
                    if !options.iter().any(|option| option == value) {
                        return Err(SubmissionError::NotAnOption {
                            group: field.name.to_string(),
                            name: nested.name.to_string(),
                            value: value.clone(),
                        });
                    }
                }
            }
            None => {}
        }
    }

    Ok(())
}
