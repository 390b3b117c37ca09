//! Administrative activation toggles, guarded by active-trip counts.
//!
//! The allocation and lifecycle paths never flip activity flags; these
//! operations are the administrative surface that does. An entity with an
//! active trip cannot be deactivated out from under it.

use crate::availability;
use crate::entities::{Driver, DriverId, ResourceKind, Rider, RiderId, Vehicle, VehicleId};
use crate::error::DispatchError;
use crate::store::EntityStore;

/// Deactivate a rider. Idempotent on an already-inactive rider; refused
/// while the rider has active trips.
pub fn deactivate_rider(
    store: &dyn EntityStore,
    id: RiderId,
) -> Result<Rider, DispatchError> {
    let rider = store
        .get_rider(id)?
        .ok_or(DispatchError::RiderUnavailable(id))?;
    if !rider.active {
        return Ok(rider);
    }
    guard_no_active_trips(store, ResourceKind::Rider, id.0)?;
    store
        .set_rider_active(id, false)?
        .ok_or(DispatchError::RiderUnavailable(id))
}

pub fn reactivate_rider(store: &dyn EntityStore, id: RiderId) -> Result<Rider, DispatchError> {
    store
        .set_rider_active(id, true)?
        .ok_or(DispatchError::RiderUnavailable(id))
}

pub fn deactivate_driver(
    store: &dyn EntityStore,
    id: DriverId,
) -> Result<Driver, DispatchError> {
    let driver = store
        .get_driver(id)?
        .ok_or(DispatchError::DriverUnavailable(id))?;
    if !driver.active {
        return Ok(driver);
    }
    guard_no_active_trips(store, ResourceKind::Driver, id.0)?;
    store
        .set_driver_active(id, false)?
        .ok_or(DispatchError::DriverUnavailable(id))
}

pub fn reactivate_driver(store: &dyn EntityStore, id: DriverId) -> Result<Driver, DispatchError> {
    store
        .set_driver_active(id, true)?
        .ok_or(DispatchError::DriverUnavailable(id))
}

pub fn deactivate_vehicle(
    store: &dyn EntityStore,
    id: VehicleId,
) -> Result<Vehicle, DispatchError> {
    let vehicle = store
        .get_vehicle(id)?
        .ok_or(DispatchError::VehicleUnavailable(id))?;
    if !vehicle.active {
        return Ok(vehicle);
    }
    guard_no_active_trips(store, ResourceKind::Vehicle, id.0)?;
    store
        .set_vehicle_active(id, false)?
        .ok_or(DispatchError::VehicleUnavailable(id))
}

pub fn reactivate_vehicle(
    store: &dyn EntityStore,
    id: VehicleId,
) -> Result<Vehicle, DispatchError> {
    store
        .set_vehicle_active(id, true)?
        .ok_or(DispatchError::VehicleUnavailable(id))
}

fn guard_no_active_trips(
    store: &dyn EntityStore,
    kind: ResourceKind,
    id: u64,
) -> Result<(), DispatchError> {
    let active_trips = availability::active_trip_count(store, kind, id)?;
    if active_trips > 0 {
        return Err(DispatchError::DeactivationBlocked {
            kind,
            id,
            active_trips,
        });
    }
    Ok(())
}
