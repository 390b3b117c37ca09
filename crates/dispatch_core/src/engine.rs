//! Engine facade: wires the store, locks, clock, and telemetry together.
//!
//! Each operation acquires the per-entity locks it needs before touching the
//! store, so every check-then-act sequence is atomic with respect to other
//! operations on the same entities (see [crate::locks]).

use std::sync::Arc;

use crate::admin;
use crate::allocator::{self, AllocatorConfig, TripRequest};
use crate::clock::{Clock, SystemClock};
use crate::entities::{
    Driver, DriverId, ResourceKind, Rider, RiderId, Trip, TripId, TripStatus, Vehicle, VehicleId,
};
use crate::error::DispatchError;
use crate::lifecycle;
use crate::locks::{self, LockRegistry};
use crate::store::EntityStore;
use crate::telemetry::{DispatchTelemetry, TelemetrySnapshot};

pub struct DispatchEngine {
    store: Arc<dyn EntityStore>,
    clock: Arc<dyn Clock>,
    config: AllocatorConfig,
    locks: LockRegistry,
    telemetry: DispatchTelemetry,
}

impl DispatchEngine {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            config: AllocatorConfig::default(),
            locks: LockRegistry::new(),
            telemetry: DispatchTelemetry::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: AllocatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    /// Validate the request and create a trip. Serialized against any other
    /// operation touching the same rider, driver, or vehicle.
    pub fn allocate_trip(&self, request: &TripRequest) -> Result<Trip, DispatchError> {
        let handles = self.locks.handles(&[
            (ResourceKind::Rider, request.rider.0),
            (ResourceKind::Driver, request.driver.0),
            (ResourceKind::Vehicle, request.vehicle.0),
        ]);
        let _guards = locks::acquire(&handles);

        let result = allocator::allocate(
            self.store.as_ref(),
            &self.config,
            self.clock.as_ref(),
            request,
        );
        match &result {
            Ok(_) => self.telemetry.allocation_succeeded(),
            Err(_) => self.telemetry.allocation_rejected(),
        }
        result
    }

    /// Advance a trip through its state machine. Serialized per trip.
    pub fn transition_trip(
        &self,
        trip_id: TripId,
        new_status: TripStatus,
    ) -> Result<Trip, DispatchError> {
        let handles = self.locks.handles(&[(ResourceKind::Trip, trip_id.0)]);
        let _guards = locks::acquire(&handles);

        let result = lifecycle::transition(self.store.as_ref(), trip_id, new_status);
        match &result {
            Ok(_) => self.telemetry.transition_applied(),
            Err(_) => self.telemetry.transition_rejected(),
        }
        result
    }

    /// Soft-delete a trip, if its status allows it. Serialized per trip.
    pub fn delete_trip(&self, trip_id: TripId) -> Result<Trip, DispatchError> {
        let handles = self.locks.handles(&[(ResourceKind::Trip, trip_id.0)]);
        let _guards = locks::acquire(&handles);

        let result = lifecycle::delete(self.store.as_ref(), trip_id);
        match &result {
            Ok(_) => self.telemetry.trip_deleted(),
            Err(_) => self.telemetry.delete_rejected(),
        }
        result
    }

    pub fn deactivate_rider(&self, id: RiderId) -> Result<Rider, DispatchError> {
        let handles = self.locks.handles(&[(ResourceKind::Rider, id.0)]);
        let _guards = locks::acquire(&handles);
        admin::deactivate_rider(self.store.as_ref(), id)
    }

    pub fn reactivate_rider(&self, id: RiderId) -> Result<Rider, DispatchError> {
        let handles = self.locks.handles(&[(ResourceKind::Rider, id.0)]);
        let _guards = locks::acquire(&handles);
        admin::reactivate_rider(self.store.as_ref(), id)
    }

    pub fn deactivate_driver(&self, id: DriverId) -> Result<Driver, DispatchError> {
        let handles = self.locks.handles(&[(ResourceKind::Driver, id.0)]);
        let _guards = locks::acquire(&handles);
        admin::deactivate_driver(self.store.as_ref(), id)
    }

    pub fn reactivate_driver(&self, id: DriverId) -> Result<Driver, DispatchError> {
        let handles = self.locks.handles(&[(ResourceKind::Driver, id.0)]);
        let _guards = locks::acquire(&handles);
        admin::reactivate_driver(self.store.as_ref(), id)
    }

    pub fn deactivate_vehicle(&self, id: VehicleId) -> Result<Vehicle, DispatchError> {
        let handles = self.locks.handles(&[(ResourceKind::Vehicle, id.0)]);
        let _guards = locks::acquire(&handles);
        admin::deactivate_vehicle(self.store.as_ref(), id)
    }

    pub fn reactivate_vehicle(&self, id: VehicleId) -> Result<Vehicle, DispatchError> {
        let handles = self.locks.handles(&[(ResourceKind::Vehicle, id.0)]);
        let _guards = locks::acquire(&handles);
        admin::reactivate_vehicle(self.store.as_ref(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn engine_fixture() -> (DispatchEngine, Arc<MemoryStore>, TripRequest) {
        let store = Arc::new(MemoryStore::new());
        let rider = store.add_rider("Ana Ramírez", "3101234567").expect("rider");
        let driver = store.add_driver("Roberto Pérez", None).expect("driver");
        let vehicle = store.add_vehicle("ABC123", None, None).expect("vehicle");

        let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        let engine = DispatchEngine::new(Arc::clone(&store) as Arc<dyn EntityStore>)
            .with_clock(Arc::new(clock));
        let request = TripRequest::new(
            rider.id,
            driver.id,
            vehicle.id,
            "Plaza Principal",
            "Hospital San Rafael",
            Decimal::from(5_000),
        );
        (engine, store, request)
    }

    #[test]
    fn full_cycle_allocate_start_complete_reallocate() {
        let (engine, _store, request) = engine_fixture();

        let trip = engine.allocate_trip(&request).expect("allocate");
        assert_eq!(trip.status, TripStatus::Pending);

        engine
            .transition_trip(trip.id, TripStatus::InProgress)
            .expect("start");
        engine
            .transition_trip(trip.id, TripStatus::Completed)
            .expect("complete");

        // Terminal status released driver and vehicle.
        engine.allocate_trip(&request).expect("reallocate");
    }

    #[test]
    fn telemetry_tracks_outcomes() {
        let (engine, _store, request) = engine_fixture();

        let trip = engine.allocate_trip(&request).expect("allocate");
        engine.allocate_trip(&request).unwrap_err(); // driver busy
        engine
            .transition_trip(trip.id, TripStatus::Completed)
            .unwrap_err(); // pending -> completed is invalid
        engine
            .transition_trip(trip.id, TripStatus::Cancelled)
            .expect("cancel");
        engine.delete_trip(trip.id).expect("delete cancelled trip");
        engine.delete_trip(trip.id).unwrap_err(); // already deleted

        let snapshot = engine.telemetry();
        assert_eq!(snapshot.allocations_succeeded, 1);
        assert_eq!(snapshot.allocations_rejected, 1);
        assert_eq!(snapshot.transitions_applied, 1);
        assert_eq!(snapshot.transitions_rejected, 1);
        assert_eq!(snapshot.trips_deleted, 1);
        assert_eq!(snapshot.deletes_rejected, 1);
    }

    #[test]
    fn deactivated_driver_is_unavailable_until_reactivated() {
        let (engine, _store, request) = engine_fixture();

        engine.deactivate_driver(request.driver).expect("deactivate");
        let err = engine.allocate_trip(&request).unwrap_err();
        assert_eq!(err, DispatchError::DriverUnavailable(request.driver));

        engine.reactivate_driver(request.driver).expect("reactivate");
        engine.allocate_trip(&request).expect("allocate");
    }
}
