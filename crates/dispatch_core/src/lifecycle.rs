//! Trip state machine: forward-only status changes and guarded deletion.
//!
//! Reaching a terminal status frees the driver and vehicle on its own: the
//! availability counts in [crate::availability] only see pending and
//! in-progress trips, so no release bookkeeping exists anywhere.

use crate::entities::{Trip, TripId, TripStatus};
use crate::error::DispatchError;
use crate::store::EntityStore;

/// Move a trip to `new_status`, enforcing the transition table on
/// [TripStatus]. Soft-deleted trips are treated as not found.
///
/// The caller must hold the trip's lock so concurrent transitions of the
/// same trip serialize (see [crate::locks]).
pub fn transition(
    store: &dyn EntityStore,
    trip_id: TripId,
    new_status: TripStatus,
) -> Result<Trip, DispatchError> {
    let trip = store
        .get_trip(trip_id)?
        .filter(|t| !t.soft_deleted)
        .ok_or(DispatchError::TripNotFound(trip_id))?;

    if !trip.status.can_transition_to(new_status) {
        return Err(DispatchError::InvalidTransition {
            from: trip.status,
            to: new_status,
        });
    }

    store
        .update_trip_status(trip_id, new_status)?
        .ok_or(DispatchError::TripNotFound(trip_id))
}

/// Soft-delete a trip. Trips that are in progress or completed must stay on
/// record and cannot be deleted.
pub fn delete(store: &dyn EntityStore, trip_id: TripId) -> Result<Trip, DispatchError> {
    let trip = store
        .get_trip(trip_id)?
        .filter(|t| !t.soft_deleted)
        .ok_or(DispatchError::TripNotFound(trip_id))?;

    if matches!(trip.status, TripStatus::InProgress | TripStatus::Completed) {
        return Err(DispatchError::DeleteNotAllowed(trip.status));
    }

    store
        .delete_trip(trip_id)?
        .ok_or(DispatchError::TripNotFound(trip_id))
}
