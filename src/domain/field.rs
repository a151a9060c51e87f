//! The recursive field tree.
//!
//! A form is an ordered list of [`Field`]s. A field may reveal further fields
//! through its [`Branch`]es, and a grouped-entry field embeds a whole bundle
//! of nested fields. Both recursion points nest to arbitrary authored depth.
//!
//! The kind-specific payload is a closed tagged union ([`FieldControl`]), so
//! invariants such as "a select field has at least one option" are carried by
//! the type rather than re-checked at every use site.

use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::rule::FlagRule;

/// Stable identifier of a field within a stored form schema.
///
/// Dynamically revealed branch fields are not part of the stored schema and
/// have no `FieldId`; answers to them carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(Uuid);

impl FieldId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for FieldId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A validated, non-blank field name.
///
/// Names are unique among siblings (enforced by the schema validator) and
/// form the breadcrumb paths used in diagnostics and answer keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldName(NonEmptyString);

impl FieldName {
    /// Creates a field name, rejecting empty or whitespace-only input.
    ///
    /// # Errors
    ///
    /// Returns [`BlankNameError`] if the string is blank.
    pub fn new(name: String) -> Result<Self, BlankNameError> {
        if name.trim().is_empty() {
            return Err(BlankNameError);
        }
        NonEmptyString::new(name).map_or(Err(BlankNameError), |s| Ok(Self(s)))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for FieldName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FieldName {
    type Err = BlankNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Error returned when a field name is empty or whitespace-only.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("field name must not be blank")]
pub struct BlankNameError;

/// The closed enumeration of field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A single line of free text.
    ShortText,
    /// A dropdown with a fixed option list.
    SingleSelect,
    /// A dropdown with a fixed option list and type-ahead search.
    SearchableSelect,
    /// A row of mutually exclusive buttons.
    ButtonChoice,
    /// A photo capture.
    Photo,
    /// A signature capture.
    Signature,
    /// A numeric reading checked against bounds.
    Measurement,
    /// A multi-line notes area.
    FreeNotes,
    /// A calendar date.
    Date,
    /// A calendar date with a time of day.
    DateTime,
    /// A time of day.
    Time,
    /// A composite sub-form answered as a structured bundle.
    GroupedEntry,
}

impl FieldKind {
    /// Every member of the enumeration, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::ShortText,
        Self::SingleSelect,
        Self::SearchableSelect,
        Self::ButtonChoice,
        Self::Photo,
        Self::Signature,
        Self::Measurement,
        Self::FreeNotes,
        Self::Date,
        Self::DateTime,
        Self::Time,
        Self::GroupedEntry,
    ];

    /// The canonical wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShortText => "short_text",
            Self::SingleSelect => "single_select",
            Self::SearchableSelect => "searchable_select",
            Self::ButtonChoice => "button_choice",
            Self::Photo => "photo",
            Self::Signature => "signature",
            Self::Measurement => "measurement",
            Self::FreeNotes => "free_notes",
            Self::Date => "date",
            Self::DateTime => "date_time",
            Self::Time => "time",
            Self::GroupedEntry => "grouped_entry",
        }
    }

    /// Whether this kind answers with one value drawn from a discrete set.
    #[must_use]
    pub const fn is_choice(self) -> bool {
        matches!(
            self,
            Self::SingleSelect | Self::SearchableSelect | Self::ButtonChoice
        )
    }

    /// Whether this kind requires a declared option list.
    #[must_use]
    pub const fn is_select(self) -> bool {
        matches!(self, Self::SingleSelect | Self::SearchableSelect)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKindError(s.to_string()))
    }
}

/// Error returned when a kind string is outside the closed enumeration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown field kind '{0}'")]
pub struct UnknownKindError(pub String);

/// How a measurement reading relates to its bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsMode {
    /// The reading is expected inside `[min, max]`.
    #[default]
    Between,
    /// The reading is expected at or above `min`.
    Higher,
    /// The reading is expected at or below `max`.
    Lower,
}

/// Declared bounds for a measurement field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementBounds {
    /// The comparison mode.
    pub mode: BoundsMode,
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Default for MeasurementBounds {
    fn default() -> Self {
        Self {
            mode: BoundsMode::Between,
            min: 0.0,
            max: 100.0,
        }
    }
}

/// The kind-specific payload of a field.
///
/// Exactly one variant per [`FieldKind`]; [`FieldControl::kind`] recovers the
/// discriminant. Payload-free kinds are unit variants.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldControl {
    /// See [`FieldKind::ShortText`].
    ShortText,
    /// See [`FieldKind::SingleSelect`].
    SingleSelect {
        /// The option list. Never empty after normalization.
        options: NonEmpty<String>,
    },
    /// See [`FieldKind::SearchableSelect`].
    SearchableSelect {
        /// The option list. Never empty after normalization.
        options: NonEmpty<String>,
    },
    /// See [`FieldKind::ButtonChoice`].
    ButtonChoice,
    /// See [`FieldKind::Photo`].
    Photo,
    /// See [`FieldKind::Signature`].
    Signature,
    /// See [`FieldKind::Measurement`].
    Measurement {
        /// Declared bounds, defaulted by the validator when absent.
        bounds: MeasurementBounds,
    },
    /// See [`FieldKind::FreeNotes`].
    FreeNotes,
    /// See [`FieldKind::Date`].
    Date,
    /// See [`FieldKind::DateTime`].
    DateTime,
    /// See [`FieldKind::Time`].
    Time,
    /// See [`FieldKind::GroupedEntry`].
    GroupedEntry {
        /// The nested fields. Never empty; each obeys every field invariant
        /// recursively.
        fields: Box<NonEmpty<Field>>,
    },
}

impl FieldControl {
    /// Returns the discriminant of this payload.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::ShortText => FieldKind::ShortText,
            Self::SingleSelect { .. } => FieldKind::SingleSelect,
            Self::SearchableSelect { .. } => FieldKind::SearchableSelect,
            Self::ButtonChoice => FieldKind::ButtonChoice,
            Self::Photo => FieldKind::Photo,
            Self::Signature => FieldKind::Signature,
            Self::Measurement { .. } => FieldKind::Measurement,
            Self::FreeNotes => FieldKind::FreeNotes,
            Self::Date => FieldKind::Date,
            Self::DateTime => FieldKind::DateTime,
            Self::Time => FieldKind::Time,
            Self::GroupedEntry { .. } => FieldKind::GroupedEntry,
        }
    }

    /// Returns the declared options for select kinds.
    #[must_use]
    pub const fn options(&self) -> Option<&NonEmpty<String>> {
        match self {
            Self::SingleSelect { options } | Self::SearchableSelect { options } => Some(options),
            _ => None,
        }
    }
}

/// One normalized question on a form.
///
/// Produced by the schema validator; read-only thereafter. Serializes through
/// the raw [`RawField`](crate::schema::RawField) shape, so a persisted tree
/// re-validates on deserialization and the encoding stays lossless and
/// order-preserving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "crate::schema::RawField",
    into = "crate::schema::RawField"
)]
pub struct Field {
    /// Schema identity, if this field is part of the stored schema.
    pub id: Option<FieldId>,
    /// The field name, unique among siblings.
    pub name: FieldName,
    /// Kind discriminant and kind-specific payload.
    pub control: FieldControl,
    /// Whether an answer must be supplied.
    pub is_required: bool,
    /// Display and evaluation order among siblings.
    pub order: i64,
    /// Administrator-defined abnormality rule.
    pub flag_rule: Option<FlagRule>,
    /// Conditional branches revealed by specific answers.
    pub branches: Vec<Branch>,
}

impl Field {
    /// Returns the kind discriminant of this field.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.control.kind()
    }
}

/// A conditional branch: answers equal to `trigger` reveal `revealed`.
///
/// Owned exclusively by its parent field. Revealed fields may themselves
/// carry branches, so conditionals nest to arbitrary depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    /// The answer value that activates this branch.
    pub trigger: String,
    /// The fields revealed when the branch activates, in order.
    pub revealed: Vec<Field>,
}
