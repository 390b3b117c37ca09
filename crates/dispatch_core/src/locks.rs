//! Per-entity mutual exclusion for check-then-act sequences.
//!
//! Availability checks and the writes that depend on them must happen inside
//! one critical section per entity, or two concurrent allocations could both
//! observe a free driver and both commit. Granularity is per (kind, id):
//! allocations touching disjoint entities run fully in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::entities::ResourceKind;

pub type LockKey = (ResourceKind, u64);

/// Registry handing out one lock per (kind, id). Handles for the same key
/// are the same underlying mutex for the lifetime of the registry.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<LockKey, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handles for the given keys, deduplicated and in canonical
    /// (kind, id) order. Acquiring them in the returned order is deadlock-free
    /// across all callers.
    pub fn handles(&self, keys: &[LockKey]) -> Vec<Arc<Mutex<()>>> {
        let mut sorted: Vec<LockKey> = keys.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sorted
            .into_iter()
            .map(|key| Arc::clone(locks.entry(key).or_default()))
            .collect()
    }
}

/// Acquire every handle in order, returning the guards. The guards must stay
/// alive for the whole check-then-act sequence.
pub fn acquire(handles: &[Arc<Mutex<()>>]) -> Vec<MutexGuard<'_, ()>> {
    handles
        .iter()
        // The marker mutex holds no data, so a poisoned lock is still usable.
        .map(|handle| handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_yields_the_same_lock() {
        let registry = LockRegistry::new();
        let a = registry.handles(&[(ResourceKind::Driver, 10)]);
        let b = registry.handles(&[(ResourceKind::Driver, 10)]);
        assert!(Arc::ptr_eq(&a[0], &b[0]));
    }

    #[test]
    fn different_keys_yield_different_locks() {
        let registry = LockRegistry::new();
        let a = registry.handles(&[(ResourceKind::Driver, 10)]);
        let b = registry.handles(&[(ResourceKind::Vehicle, 10)]);
        assert!(!Arc::ptr_eq(&a[0], &b[0]));
    }

    #[test]
    fn handles_are_sorted_and_deduplicated() {
        let registry = LockRegistry::new();
        let handles = registry.handles(&[
            (ResourceKind::Vehicle, 100),
            (ResourceKind::Rider, 1),
            (ResourceKind::Driver, 10),
            (ResourceKind::Rider, 1),
        ]);
        assert_eq!(handles.len(), 3);

        let sorted = registry.handles(&[
            (ResourceKind::Rider, 1),
            (ResourceKind::Driver, 10),
            (ResourceKind::Vehicle, 100),
        ]);
        for (a, b) in handles.iter().zip(sorted.iter()) {
            assert!(Arc::ptr_eq(a, b), "order is canonical regardless of input");
        }
    }

    #[test]
    fn guards_serialize_critical_sections() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Barrier;

        let registry = Arc::new(LockRegistry::new());
        let barrier = Arc::new(Barrier::new(4));
        let in_section = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                let in_section = Arc::clone(&in_section);
                let max_seen = Arc::clone(&max_seen);
                scope.spawn(move || {
                    barrier.wait();
                    let handles = registry.handles(&[(ResourceKind::Driver, 7)]);
                    let _guards = acquire(&handles);
                    let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    std::thread::yield_now();
                    in_section.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
