//! Persistence boundary for form schemas and issued sequence values.
//!
//! The allocator and callers above it talk to a [`FormStore`] trait so the
//! backing system (a relational database in deployment) stays swappable.
//! [`MemoryStore`] is the in-process implementation used by tests and the
//! benchmarks; it enforces the same uniqueness guarantee a database unique
//! index would, surfacing violations as [`StorageError::Conflict`].

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use crate::domain::{FormId, FormSchema};

/// Errors surfaced by a form store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Recording a sequence value collided with one already issued.
    ///
    /// Retryable: the allocator re-reads the issued set and tries the next
    /// number.
    #[error("sequence value was already issued")]
    Conflict,

    /// The backing store failed in a way that is not retryable.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The persistence operations the allocator and schema layers need.
pub trait FormStore: Send + Sync {
    /// Loads a form's schema, or `None` if the form is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the store cannot be read.
    fn fetch_schema(&self, form: FormId) -> Result<Option<FormSchema>, StorageError>;

    /// All sequence values ever issued for a form, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the store cannot be read.
    fn sequence_values(&self, form: FormId) -> Result<Vec<String>, StorageError>;

    /// Records a freshly issued sequence value for a form.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Conflict`] if the value was already issued
    /// for this form, and [`StorageError::Backend`] if the store cannot be
    /// written.
    fn record_sequence(&self, form: FormId, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct Tables {
    forms: HashMap<FormId, FormSchema>,
    issued: HashMap<FormId, Vec<String>>,
}

/// An in-process [`FormStore`] holding everything in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) a form schema.
    pub fn insert_form(&self, schema: FormSchema) {
        self.lock().forms.insert(schema.id, schema);
    }

    /// Seeds a pre-existing sequence value, bypassing the conflict check.
    ///
    /// Test setup helper for legacy data that predates this store.
    pub fn seed_sequence_value(&self, form: FormId, value: impl Into<String>) {
        self.lock().issued.entry(form).or_default().push(value.into());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A panic while holding the lock leaves plain data behind, which is
        // still safe to read.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FormStore for MemoryStore {
    fn fetch_schema(&self, form: FormId) -> Result<Option<FormSchema>, StorageError> {
        Ok(self.lock().forms.get(&form).cloned())
    }

    fn sequence_values(&self, form: FormId) -> Result<Vec<String>, StorageError> {
        Ok(self.lock().issued.get(&form).cloned().unwrap_or_default())
    }

    fn record_sequence(&self, form: FormId, value: &str) -> Result<(), StorageError> {
        let mut tables = self.lock();
        let issued = tables.issued.entry(form).or_default();
        if issued.iter().any(|existing| existing == value) {
            return Err(StorageError::Conflict);
        }
        issued.push(value.to_string());
        Ok(())
    }
}
