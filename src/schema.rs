//! Recursive validation and normalization of field trees.
//!
//! The [`Validator`] walks a raw field tree exactly once, normalizing as it
//! goes: blank names fail, absent kinds are inferred, optionless selects get
//! a synthesized default set, measurement bounds are defaulted, siblings are
//! ordered and checked for duplicate names, and both recursion points
//! (grouped-entry nesting and branch revelation) are validated with the same
//! rules. Every error carries a [`FieldPath`] breadcrumb naming the exact
//! offending field.
//!
//! Payload that does not apply to a field's kind (options on a short-text
//! field, bounds on a select) is dropped during normalization.

use std::{collections::HashSet, fmt, str::FromStr};

use nonempty::NonEmpty;

use crate::domain::{
    Branch, Field, FieldControl, FieldKind, FieldName, InferenceConfig, MeasurementBounds,
};

mod infer;

mod raw;
pub use raw::{RawBounds, RawBranch, RawField};

mod submission;
pub use submission::{check_group_submission, SubmissionError};

/// Defensive cap on authored nesting depth.
///
/// Authored schemas are nowhere near this deep; the cap bounds recursion on
/// hostile or corrupted input.
pub const MAX_DEPTH: usize = 32;

/// A breadcrumb locating a field within the tree.
///
/// Used in every schema diagnostic and as the answer key of the conditional
/// resolver. The root (the form itself) is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The empty path: the form root.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Extends the path with one more field name.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the form root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The field name at the end of the path, if any.
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(form root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " > ")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Errors surfaced to the administrator when a field tree is rejected.
///
/// Each variant names the exact offending field path so the error is
/// actionable. Nothing here is silently corrected beyond the documented
/// default-synthesis steps.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A field has a blank name. The path names the parent scope.
    #[error("{path}: field name is missing or blank")]
    MissingName {
        /// The scope containing the unnamed field.
        path: FieldPath,
    },

    /// A declared kind is outside the closed enumeration.
    #[error("{path}: unknown field kind '{kind}'")]
    InvalidKind {
        /// The offending field.
        path: FieldPath,
        /// The declared kind string.
        kind: String,
    },

    /// Two sibling fields share a name.
    #[error("{path}: duplicate sibling field name '{name}'")]
    DuplicateFieldName {
        /// The scope containing the duplicates.
        path: FieldPath,
        /// The repeated name.
        name: String,
    },

    /// A select field has no options and the configured default tables
    /// produced none either.
    #[error("{path}: select field has no options and none could be synthesized")]
    MissingOptions {
        /// The offending field.
        path: FieldPath,
    },

    /// A grouped-entry field has no nested fields.
    #[error("{path}: grouped entry has no nested fields")]
    EmptyGroup {
        /// The offending field.
        path: FieldPath,
    },

    /// The tree nests deeper than [`MAX_DEPTH`].
    #[error("{path}: field tree exceeds the maximum nesting depth of {limit}")]
    TooDeep {
        /// The field at which the cap was exceeded.
        path: FieldPath,
        /// The configured cap.
        limit: usize,
    },
}

/// Validates and normalizes raw field trees against an inference
/// configuration.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'c> {
    config: &'c InferenceConfig,
}

impl<'c> Validator<'c> {
    /// Creates a validator using the given inference configuration.
    #[must_use]
    pub const fn new(config: &'c InferenceConfig) -> Self {
        Self { config }
    }

    /// Validates a whole form: every top-level field and, recursively,
    /// every nested and branch field.
    ///
    /// Siblings are returned ordered by their `order` value (stable for
    /// ties). Validation has no side effect beyond the returned tree;
    /// persistence is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] encountered, with a breadcrumb
    /// naming the offending field.
    pub fn validate_form(&self, fields: Vec<RawField>) -> Result<Vec<Field>, SchemaError> {
        self.validate_siblings(fields, &FieldPath::root())
    }

    /// Validates a single field (and its subtree) under the given parent
    /// breadcrumb.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] encountered in the subtree.
    pub fn validate(&self, raw: RawField, parent: &FieldPath) -> Result<Field, SchemaError> {
        let RawField {
            id,
            name,
            kind,
            is_required,
            order,
            options,
            measurement_bounds,
            flag_rule,
            nested_fields,
            branches,
        } = raw;

        let name = FieldName::new(name).map_err(|_| SchemaError::MissingName {
            path: parent.clone(),
        })?;
        let path = parent.child(name.as_str());

        if path.depth() > MAX_DEPTH {
            return Err(SchemaError::TooDeep {
                path,
                limit: MAX_DEPTH,
            });
        }

        let kind = match kind {
            None => infer::infer_kind(self.config, &name),
            Some(declared) => match FieldKind::from_str(&declared) {
                Ok(kind) => kind,
                Err(_) => {
                    return Err(SchemaError::InvalidKind {
                        path,
                        kind: declared,
                    });
                }
            },
        };

        let control = match kind {
            FieldKind::SingleSelect | FieldKind::SearchableSelect => {
                let options = self.normalized_options(options, &name, &path)?;
                if kind == FieldKind::SingleSelect {
                    FieldControl::SingleSelect { options }
                } else {
                    FieldControl::SearchableSelect { options }
                }
            }
            FieldKind::Measurement => FieldControl::Measurement {
                bounds: measurement_bounds.map_or_else(MeasurementBounds::default, |raw| {
                    MeasurementBounds {
                        mode: raw.mode.unwrap_or_default(),
                        min: raw.min.unwrap_or(0.0),
                        max: raw.max.unwrap_or(100.0),
                    }
                }),
            },
            FieldKind::GroupedEntry => {
                let nested = self.validate_siblings(nested_fields, &path)?;
                let fields = NonEmpty::from_vec(nested)
                    .ok_or_else(|| SchemaError::EmptyGroup { path: path.clone() })?;
                FieldControl::GroupedEntry {
                    fields: Box::new(fields),
                }
            }
            FieldKind::ShortText => FieldControl::ShortText,
            FieldKind::ButtonChoice => FieldControl::ButtonChoice,
            FieldKind::Photo => FieldControl::Photo,
            FieldKind::Signature => FieldControl::Signature,
            FieldKind::FreeNotes => FieldControl::FreeNotes,
            FieldKind::Date => FieldControl::Date,
            FieldKind::DateTime => FieldControl::DateTime,
            FieldKind::Time => FieldControl::Time,
        };

        let branches = branches
            .into_iter()
            .map(|branch| {
                Ok(Branch {
                    trigger: branch.trigger_value,
                    revealed: self.validate_siblings(branch.revealed_fields, &path)?,
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(Field {
            id,
            name,
            control,
            is_required,
            order,
            flag_rule,
            branches,
        })
    }

    fn validate_siblings(
        &self,
        mut fields: Vec<RawField>,
        parent: &FieldPath,
    ) -> Result<Vec<Field>, SchemaError> {
        fields.sort_by_key(|field| field.order);

        let mut seen = HashSet::with_capacity(fields.len());
        let mut validated = Vec::with_capacity(fields.len());

        for raw in fields {
            let field = self.validate(raw, parent)?;
            if !seen.insert(field.name.to_string()) {
                return Err(SchemaError::DuplicateFieldName {
                    path: parent.clone(),
                    name: field.name.to_string(),
                });
            }
            validated.push(field);
        }

        Ok(validated)
    }

    fn normalized_options(
        &self,
        declared: Vec<String>,
        name: &FieldName,
        path: &FieldPath,
    ) -> Result<NonEmpty<String>, SchemaError> {
        let options = if declared.is_empty() {
            infer::synthesize_options(self.config, name, path)
        } else {
            declared
        };
        NonEmpty::from_vec(options).ok_or_else(|| SchemaError::MissingOptions { path: path.clone() })
    }
}

/// Validates a form's raw field tree using the default inference
/// configuration.
///
/// This is the entry point called when an administrator creates or edits a
/// form. Use [`Validator`] directly to supply a deployment-specific
/// [`InferenceConfig`].
///
/// # Errors
///
/// Returns the first [`SchemaError`] encountered, with a breadcrumb naming
/// the offending field.
pub fn validate_form_schema(fields: Vec<RawField>) -> Result<Vec<Field>, SchemaError> {
    let config = InferenceConfig::default();
    Validator::new(&config).validate_form(fields)
}
