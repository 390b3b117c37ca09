#![allow(dead_code)]

use dispatch_core::allocator::TripRequest;
use dispatch_core::entities::{DriverId, RiderId, VehicleId};
use dispatch_core::test_helpers::{base_request, test_town, TestTown};
use rust_decimal_macros::dec;

/// One rider/driver/vehicle town with a deterministic clock.
pub fn town() -> TestTown {
    test_town()
}

/// Town plus `extra` additional riders, drivers, and vehicles each, so tests
/// can allocate several disjoint trips.
pub fn town_with_fleet(extra: usize) -> (TestTown, Vec<RiderId>, Vec<DriverId>, Vec<VehicleId>) {
    let town = test_town();
    let mut riders = vec![town.rider];
    let mut drivers = vec![town.driver];
    let mut vehicles = vec![town.vehicle];

    for i in 0..extra {
        let rider = town
            .store
            .add_rider(format!("Rider {i}"), format!("31000000{i:02}"))
            .expect("extra rider");
        let driver = town
            .store
            .add_driver(format!("Driver {i}"), None)
            .expect("extra driver");
        let vehicle = town
            .store
            .add_vehicle(format!("FLT{i:03}"), None, None)
            .expect("extra vehicle");
        riders.push(rider.id);
        drivers.push(driver.id);
        vehicles.push(vehicle.id);
    }

    (town, riders, drivers, vehicles)
}

/// The standard Plaza -> Hospital request.
pub fn request(rider: RiderId, driver: DriverId, vehicle: VehicleId) -> TripRequest {
    base_request(rider, driver, vehicle)
}

/// A request with a distinct route so two trips for one rider differ.
pub fn second_request(rider: RiderId, driver: DriverId, vehicle: VehicleId) -> TripRequest {
    TripRequest::new(
        rider,
        driver,
        vehicle,
        "Terminal de Transporte",
        "La Vega",
        dec!(12000),
    )
}
