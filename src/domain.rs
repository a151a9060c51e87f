//! Domain models for dynamic inspection forms.
//!
//! This module contains the core domain types: the recursive field tree,
//! flag rules, submitted answers, form schemas, sequence identifiers, and
//! the inference configuration.

/// The recursive field tree: fields, kinds, payloads, and branches.
pub mod field;
pub use field::{
    Branch, BlankNameError, BoundsMode, Field, FieldControl, FieldId, FieldKind, FieldName,
    MeasurementBounds, UnknownKindError,
};

mod rule;
pub use rule::FlagRule;

mod answer;
pub use answer::{AnswerRecord, PassOrHold};

mod form;
pub use form::{FormId, FormSchema};

mod period;
pub use period::{BlankPeriodError, Period};

/// Human-readable sequence identifiers and tolerant legacy parsing.
pub mod sequence;
pub use sequence::{Abbreviation, SequenceId};

mod config;
pub use config::{InferenceConfig, KeywordOptions};
