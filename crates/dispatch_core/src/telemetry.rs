//! Operation counters, read as a snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counts engine operation outcomes. Cheap to update from concurrent
/// requests; read via [DispatchTelemetry::snapshot].
#[derive(Debug, Default)]
pub struct DispatchTelemetry {
    allocations_succeeded: AtomicU64,
    allocations_rejected: AtomicU64,
    transitions_applied: AtomicU64,
    transitions_rejected: AtomicU64,
    trips_deleted: AtomicU64,
    deletes_rejected: AtomicU64,
}

impl DispatchTelemetry {
    pub(crate) fn allocation_succeeded(&self) {
        self.allocations_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn allocation_rejected(&self) {
        self.allocations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn transition_applied(&self) {
        self.transitions_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn transition_rejected(&self) {
        self.transitions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn trip_deleted(&self) {
        self.trips_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn delete_rejected(&self) {
        self.deletes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            allocations_succeeded: self.allocations_succeeded.load(Ordering::Relaxed),
            allocations_rejected: self.allocations_rejected.load(Ordering::Relaxed),
            transitions_applied: self.transitions_applied.load(Ordering::Relaxed),
            transitions_rejected: self.transitions_rejected.load(Ordering::Relaxed),
            trips_deleted: self.trips_deleted.load(Ordering::Relaxed),
            deletes_rejected: self.deletes_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    pub allocations_succeeded: u64,
    pub allocations_rejected: u64,
    pub transitions_applied: u64,
    pub transitions_rejected: u64,
    pub trips_deleted: u64,
    pub deletes_rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_outcomes() {
        let telemetry = DispatchTelemetry::default();
        telemetry.allocation_succeeded();
        telemetry.allocation_succeeded();
        telemetry.allocation_rejected();
        telemetry.transition_applied();
        telemetry.delete_rejected();

        let snapshot = telemetry.snapshot();
        assert_eq!(snapshot.allocations_succeeded, 2);
        assert_eq!(snapshot.allocations_rejected, 1);
        assert_eq!(snapshot.transitions_applied, 1);
        assert_eq!(snapshot.transitions_rejected, 0);
        assert_eq!(snapshot.trips_deleted, 0);
        assert_eq!(snapshot.deletes_rejected, 1);
    }
}
