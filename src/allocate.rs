//! Period-scoped sequence allocation.
//!
//! Every accepted inspection gets a human-readable sequence string
//! (`ABBR-PERIODn`) that is unique per form and period. The allocator keeps
//! a per-(form, period) counter in memory, seeded once per process by a
//! backfill scan over the values already persisted for that form. After the
//! seed, allocation is an increment plus one store write; the store's
//! uniqueness guarantee catches races with other processes, and a bounded
//! retry re-seeds and tries again.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;

use crate::{
    domain::{
        sequence::{Abbreviation, SequenceId},
        FormId, Period,
    },
    storage::{FormStore, StorageError},
};

/// How many conflict rounds an allocation attempts before giving up.
const MAX_ATTEMPTS: u32 = 3;

/// Errors surfaced by sequence allocation.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// Every attempt collided with a concurrently issued value.
    #[error("failed to allocate a sequence for form {form} after {attempts} attempts")]
    Failed {
        /// The form being allocated for.
        form: FormId,
        /// How many attempts were made.
        attempts: u32,
    },

    /// The backing store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The next-number state for one (form, period) pair.
///
/// `None` means the counter has not been seeded (or was invalidated by a
/// conflict) and the next allocation must re-scan the store.
#[derive(Debug, Default)]
struct Counter {
    last: Option<u64>,
}

/// Issues unique, human-readable sequence strings.
///
/// One allocator instance is shared per process; the inner map hands out a
/// dedicated mutex per (form, period) so allocations for unrelated forms
/// never serialize against each other.
#[derive(Debug)]
pub struct SequenceAllocator<S> {
    store: S,
    counters: Mutex<HashMap<(FormId, Period), Arc<Mutex<Counter>>>>,
}

impl<S: FormStore> SequenceAllocator<S> {
    /// Creates an allocator over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Allocates the next sequence string for a form in a period.
    ///
    /// An unknown form does not fail the caller's submission: it gets the
    /// fixed `DOC-<period>1` fallback, unrecorded, and the gap is logged
    /// for operators.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::Failed`] when every retry collided with a
    /// concurrently issued value, and [`AllocationError::Storage`] when the
    /// store itself failed.
    #[instrument(skip(self))]
    pub fn allocate(&self, form: FormId, period: &Period) -> Result<String, AllocationError> {
        let Some(schema) = self.store.fetch_schema(form)? else {
            tracing::warn!(%form, "unknown form; issuing fallback sequence");
            return Ok(SequenceId::unknown_form(period.clone()).to_string());
        };

        let abbr = Abbreviation::from_display_name(&schema.name);
        let counter = self.counter(form, period);
        let mut counter = counter.lock().unwrap_or_else(PoisonError::into_inner);

        for _ in 0..MAX_ATTEMPTS {
            let last = match counter.last {
                Some(last) => last,
                None => {
                    let seeded = self.backfill(form, &abbr, period)?;
                    counter.last = Some(seeded);
                    seeded
                }
            };

            let next = last.saturating_add(1);
            let value = SequenceId::new(abbr.clone(), period.clone(), next).to_string();

            match self.store.record_sequence(form, &value) {
                Ok(()) => {
                    counter.last = Some(next);
                    return Ok(value);
                }
                Err(StorageError::Conflict) => {
                    // Another process won the number. Drop the cached state
                    // and re-scan before the next attempt.
                    tracing::debug!(%form, value, "sequence conflict; re-seeding counter");
                    counter.last = None;
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(AllocationError::Failed {
            form,
            attempts: MAX_ATTEMPTS,
        })
    }

    /// Highest counter already persisted for this prefix, or 0 for none.
    ///
    /// Tolerant by design: stored values that do not parse as a legacy
    /// sequence for this prefix are skipped, never fatal.
    fn backfill(
        &self,
        form: FormId,
        abbr: &Abbreviation,
        period: &Period,
    ) -> Result<u64, StorageError> {
        let values = self.store.sequence_values(form)?;
        let highest = values
            .par_iter()
            .filter_map(|value| SequenceId::parse_legacy_tail(value, abbr, period))
            .max()
            .unwrap_or(0);
        Ok(highest)
    }

    fn counter(&self, form: FormId, period: &Period) -> Arc<Mutex<Counter>> {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            counters
                .entry((form, period.clone()))
                .or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::{
        domain::FormSchema,
        storage::MemoryStore,
    };

    use super::*;

    fn period(label: &str) -> Period {
        Period::new(label).unwrap()
    }

    fn allocator_with_form(name: &str) -> (SequenceAllocator<MemoryStore>, FormId) {
        let store = MemoryStore::new();
        let form = FormId::new();
        store.insert_form(FormSchema {
            id: form,
            name: name.to_string(),
            fields: Vec::new(),
        });
        (SequenceAllocator::new(store), form)
    }

    #[test]
    fn first_allocation_in_an_empty_period_is_one() {
        let (allocator, form) = allocator_with_form("Graphic Inspection Report");
        let value = allocator.allocate(form, &period("2025")).unwrap();
        assert_eq!(value, "GRA-INS-20251");
    }

    #[test]
    fn allocations_increment_within_a_period() {
        let (allocator, form) = allocator_with_form("Graphic Inspection Report");
        let p = period("2025");
        assert_eq!(allocator.allocate(form, &p).unwrap(), "GRA-INS-20251");
        assert_eq!(allocator.allocate(form, &p).unwrap(), "GRA-INS-20252");
        assert_eq!(allocator.allocate(form, &p).unwrap(), "GRA-INS-20253");
    }

    #[test]
    fn periods_have_independent_counters() {
        let (allocator, form) = allocator_with_form("Graphic Inspection Report");
        assert_eq!(allocator.allocate(form, &period("2025")).unwrap(), "GRA-INS-20251");
        assert_eq!(allocator.allocate(form, &period("2026")).unwrap(), "GRA-INS-20261");
        assert_eq!(allocator.allocate(form, &period("2025")).unwrap(), "GRA-INS-20252");
    }

    #[test]
    fn backfill_continues_after_legacy_values() {
        let (allocator, form) = allocator_with_form("Graphic Inspection Report");
        // Zero-padded and doubled-period shapes from historical records.
        allocator.store().seed_sequence_value(form, "GRA-INS-20250007");
        allocator.store().seed_sequence_value(form, "GRA-INS-202520250004");
        allocator.store().seed_sequence_value(form, "not a sequence at all");

        let value = allocator.allocate(form, &period("2025")).unwrap();
        assert_eq!(value, "GRA-INS-20258");
    }

    #[test]
    fn unknown_form_gets_the_fallback_unrecorded() {
        let allocator = SequenceAllocator::new(MemoryStore::new());
        let form = FormId::new();

        let value = allocator.allocate(form, &period("2025")).unwrap();
        assert_eq!(value, "DOC-20251");

        // Fallbacks are not persisted, so nothing was issued.
        assert!(allocator.store().sequence_values(form).unwrap().is_empty());
    }

    /// A store whose first `fail_first` record attempts conflict, standing
    /// in for another process winning the write race.
    struct ContendedStore {
        inner: MemoryStore,
        fail_first: u32,
        attempts: AtomicU32,
    }

    impl FormStore for ContendedStore {
        fn fetch_schema(&self, form: FormId) -> Result<Option<FormSchema>, StorageError> {
            self.inner.fetch_schema(form)
        }

        fn sequence_values(&self, form: FormId) -> Result<Vec<String>, StorageError> {
            self.inner.sequence_values(form)
        }

        fn record_sequence(&self, form: FormId, value: &str) -> Result<(), StorageError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.fail_first {
                // Simulate the competitor landing this exact value first.
                self.inner.seed_sequence_value(form, value);
                return Err(StorageError::Conflict);
            }
            self.inner.record_sequence(form, value)
        }
    }

    fn contended(fail_first: u32) -> (SequenceAllocator<ContendedStore>, FormId) {
        let inner = MemoryStore::new();
        let form = FormId::new();
        inner.insert_form(FormSchema {
            id: form,
            name: "Graphic Inspection Report".to_string(),
            fields: Vec::new(),
        });
        let store = ContendedStore {
            inner,
            fail_first,
            attempts: AtomicU32::new(0),
        };
        (SequenceAllocator::new(store), form)
    }

    #[test]
    fn conflicts_are_retried_with_a_fresh_scan() {
        let (allocator, form) = contended(2);
        let value = allocator.allocate(form, &period("2025")).unwrap();
        // Two competitors took 1 and 2; the retry lands on 3.
        assert_eq!(value, "GRA-INS-20253");
    }

    #[test]
    fn allocation_fails_after_exhausting_attempts() {
        let (allocator, form) = contended(u32::MAX);
        let err = allocator.allocate(form, &period("2025")).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::Failed {
                attempts: MAX_ATTEMPTS,
                ..
            }
        ));
    }

    #[test]
    fn concurrent_allocations_are_unique() {
        let (allocator, form) = allocator_with_form("Graphic Inspection Report");
        let p = period("2025");

        let mut values: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let allocator = &allocator;
                    let p = &p;
                    scope.spawn(move || allocator.allocate(form, p).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        values.sort();
        values.dedup();
        assert_eq!(values.len(), 8);
    }
}
