//! Shared fixtures for tests: a pre-populated store and engine.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::allocator::TripRequest;
use crate::clock::FixedClock;
use crate::engine::DispatchEngine;
use crate::entities::{DriverId, RiderId, VehicleId};
use crate::store::{EntityStore, MemoryStore};

/// Timestamp every fixture clock starts at.
pub fn test_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid test timestamp")
}

/// A store, an engine on top of it, and one active rider/driver/vehicle.
pub struct TestTown {
    pub store: Arc<MemoryStore>,
    pub engine: DispatchEngine,
    pub rider: RiderId,
    pub driver: DriverId,
    pub vehicle: VehicleId,
}

/// Build a [TestTown] with a deterministic clock at [test_epoch].
pub fn test_town() -> TestTown {
    let store = Arc::new(MemoryStore::new());
    let rider = store
        .add_rider("Ana Ramírez", "3101234567")
        .expect("fixture rider");
    let driver = store
        .add_driver("Roberto Pérez", Some("4821".into()))
        .expect("fixture driver");
    let vehicle = store
        .add_vehicle("ABC123", Some("Bajaj RE 2022".into()), Some(driver.id))
        .expect("fixture vehicle");

    let engine = DispatchEngine::new(Arc::clone(&store) as Arc<dyn EntityStore>)
        .with_clock(Arc::new(FixedClock::at(test_epoch())));

    TestTown {
        store,
        engine,
        rider: rider.id,
        driver: driver.id,
        vehicle: vehicle.id,
    }
}

/// A well-formed request between two town landmarks at an in-town price.
pub fn base_request(rider: RiderId, driver: DriverId, vehicle: VehicleId) -> TripRequest {
    TripRequest::new(
        rider,
        driver,
        vehicle,
        "Plaza Principal",
        "Hospital San Rafael",
        Decimal::from(5_000),
    )
}
