//! Availability: a driver or vehicle is free iff no active trip references it.
//!
//! Read-only. Callers that go on to create a trip based on this answer must
//! hold the entity's lock across both the check and the write (see
//! [crate::locks]).

use crate::entities::ResourceKind;
use crate::store::{EntityStore, StoreError};

/// Number of active (pending or in-progress, non-deleted) trips bound to the
/// given entity.
pub fn active_trip_count(
    store: &dyn EntityStore,
    kind: ResourceKind,
    id: u64,
) -> Result<usize, StoreError> {
    store.count_active_trips_for(kind, id)
}

/// True iff the entity has no active trip bound to it.
pub fn is_available(
    store: &dyn EntityStore,
    kind: ResourceKind,
    id: u64,
) -> Result<bool, StoreError> {
    Ok(active_trip_count(store, kind, id)? == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TripStatus;
    use crate::store::{MemoryStore, NewTrip};
    use chrono::Utc;
    use rust_decimal::Decimal;

    #[test]
    fn entity_with_no_trips_is_available() {
        let store = MemoryStore::new();
        let driver = store.add_driver("Roberto", None).expect("driver");
        assert!(is_available(&store, ResourceKind::Driver, driver.id.0).expect("check"));
    }

    #[test]
    fn pending_trip_occupies_driver_and_vehicle() {
        let store = MemoryStore::new();
        let rider = store.add_rider("Ana", "3101112233").expect("rider");
        let driver = store.add_driver("Roberto", None).expect("driver");
        let vehicle = store.add_vehicle("ABC123", None, None).expect("vehicle");

        let trip = store
            .create_trip(NewTrip {
                rider: rider.id,
                driver: driver.id,
                vehicle: vehicle.id,
                origin: "Plaza Principal".into(),
                destination: "Hospital San Rafael".into(),
                price: Decimal::from(5_000),
                status: TripStatus::Pending,
                created_at: Utc::now(),
            })
            .expect("trip");

        assert!(!is_available(&store, ResourceKind::Driver, driver.id.0).expect("check"));
        assert!(!is_available(&store, ResourceKind::Vehicle, vehicle.id.0).expect("check"));

        store
            .update_trip_status(trip.id, TripStatus::InProgress)
            .expect("update");
        assert!(!is_available(&store, ResourceKind::Driver, driver.id.0).expect("check"));

        store
            .update_trip_status(trip.id, TripStatus::Completed)
            .expect("update");
        assert!(is_available(&store, ResourceKind::Driver, driver.id.0).expect("check"));
        assert!(is_available(&store, ResourceKind::Vehicle, vehicle.id.0).expect("check"));
    }
}
