//! Dynamic inspection forms
//!
//! Administrators author form schemas as trees of typed fields, with
//! grouped-entry nesting and conditional branches. This crate validates and
//! normalizes those trees, resolves which fields are visible given the
//! answers so far, evaluates abnormality rules over submitted answers, and
//! issues the human-readable sequence strings that identify accepted
//! inspections.

pub mod domain;
pub use domain::{
    AnswerRecord, Branch, Field, FieldControl, FieldId, FieldKind, FieldName, FlagRule, FormId,
    FormSchema, InferenceConfig, PassOrHold, Period,
};

/// Schema validation and normalization.
pub mod schema;
pub use schema::{
    check_group_submission, validate_form_schema, FieldPath, SchemaError, SubmissionError,
    Validator,
};

/// Conditional visibility resolution.
pub mod resolve;
pub use resolve::{resolve_visible_fields, ActiveField, AnswerValues};

/// Abnormality evaluation.
pub mod flag;
pub use flag::{evaluate_flag, flag_answers};

/// Persistence boundary for schemas and issued sequences.
pub mod storage;
pub use storage::{FormStore, MemoryStore, StorageError};

/// Period-scoped sequence allocation.
pub mod allocate;
pub use allocate::{AllocationError, SequenceAllocator};
