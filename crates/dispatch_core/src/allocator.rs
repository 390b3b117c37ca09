//! Trip allocation: validates a request and creates the trip record.
//!
//! Checks run structural-first so a caller always learns about the most
//! fundamental problem: entity existence/activity, then availability, then
//! request content. Each failure short-circuits with its own error kind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::availability;
use crate::clock::Clock;
use crate::entities::{DriverId, ResourceKind, RiderId, Trip, TripStatus, VehicleId};
use crate::error::DispatchError;
use crate::store::{EntityStore, NewTrip};

/// Hard price ceiling in currency units (COP).
const DEFAULT_MAX_PRICE: u64 = 500_000;

/// Active trips a single rider may hold at once.
const DEFAULT_RIDER_TRIP_LIMIT: usize = 2;

/// Minimum characters for origin and destination.
const DEFAULT_MIN_LOCATION_LEN: usize = 3;

/// Tunables for the allocation checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    pub max_price: Decimal,
    pub rider_trip_limit: usize,
    pub min_location_len: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            max_price: Decimal::from(DEFAULT_MAX_PRICE),
            rider_trip_limit: DEFAULT_RIDER_TRIP_LIMIT,
            min_location_len: DEFAULT_MIN_LOCATION_LEN,
        }
    }
}

impl AllocatorConfig {
    pub fn with_max_price(mut self, max_price: Decimal) -> Self {
        self.max_price = max_price;
        self
    }

    pub fn with_rider_trip_limit(mut self, limit: usize) -> Self {
        self.rider_trip_limit = limit;
        self
    }

    pub fn with_min_location_len(mut self, len: usize) -> Self {
        self.min_location_len = len;
        self
    }
}

/// An incoming trip request. `status` is the raw caller-supplied value;
/// `None` means pending.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub rider: RiderId,
    pub driver: DriverId,
    pub vehicle: VehicleId,
    pub origin: String,
    pub destination: String,
    pub price: Decimal,
    pub status: Option<String>,
}

impl TripRequest {
    pub fn new(
        rider: RiderId,
        driver: DriverId,
        vehicle: VehicleId,
        origin: impl Into<String>,
        destination: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            rider,
            driver,
            vehicle,
            origin: origin.into(),
            destination: destination.into(),
            price,
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Validate `request` and create the trip.
///
/// The caller must hold the rider, driver, and vehicle locks for the whole
/// call; the availability reads here and the final write form one
/// check-then-act sequence (see [crate::locks]).
pub fn allocate(
    store: &dyn EntityStore,
    config: &AllocatorConfig,
    clock: &dyn Clock,
    request: &TripRequest,
) -> Result<Trip, DispatchError> {
    let rider = store
        .get_rider(request.rider)?
        .filter(|r| r.active)
        .ok_or(DispatchError::RiderUnavailable(request.rider))?;

    let rider_trips =
        availability::active_trip_count(store, ResourceKind::Rider, rider.id.0)?;
    if rider_trips >= config.rider_trip_limit {
        return Err(DispatchError::RiderTripLimitExceeded {
            rider: rider.id,
            active_trips: rider_trips,
            limit: config.rider_trip_limit,
        });
    }

    let driver = store
        .get_driver(request.driver)?
        .filter(|d| d.active)
        .ok_or(DispatchError::DriverUnavailable(request.driver))?;

    let driver_trips =
        availability::active_trip_count(store, ResourceKind::Driver, driver.id.0)?;
    if driver_trips > 0 {
        return Err(DispatchError::DriverAlreadyAssigned {
            driver: driver.id,
            active_trips: driver_trips,
        });
    }

    let vehicle = store
        .get_vehicle(request.vehicle)?
        .filter(|v| v.active)
        .ok_or(DispatchError::VehicleUnavailable(request.vehicle))?;

    let vehicle_trips =
        availability::active_trip_count(store, ResourceKind::Vehicle, vehicle.id.0)?;
    if vehicle_trips > 0 {
        return Err(DispatchError::VehicleAlreadyAssigned {
            vehicle: vehicle.id,
            active_trips: vehicle_trips,
        });
    }

    let origin = request.origin.trim();
    let destination = request.destination.trim();
    validate_locations(origin, destination, config.min_location_len)?;
    validate_price(request.price, config.max_price)?;

    let status = match request.status.as_deref() {
        None => TripStatus::Pending,
        Some(raw) => TripStatus::parse(raw)
            .ok_or_else(|| DispatchError::InvalidStatus(raw.trim().to_string()))?,
    };

    let trip = store.create_trip(NewTrip {
        rider: rider.id,
        driver: driver.id,
        vehicle: vehicle.id,
        origin: origin.to_string(),
        destination: destination.to_string(),
        price: request.price,
        status,
        created_at: clock.now(),
    })?;
    Ok(trip)
}

fn validate_locations(
    origin: &str,
    destination: &str,
    min_len: usize,
) -> Result<(), DispatchError> {
    if origin.is_empty() {
        return Err(DispatchError::InvalidLocations(
            "trip origin must not be empty".into(),
        ));
    }
    if destination.is_empty() {
        return Err(DispatchError::InvalidLocations(
            "trip destination must not be empty".into(),
        ));
    }
    if origin.chars().count() < min_len {
        return Err(DispatchError::InvalidLocations(format!(
            "trip origin must have at least {min_len} characters"
        )));
    }
    if destination.chars().count() < min_len {
        return Err(DispatchError::InvalidLocations(format!(
            "trip destination must have at least {min_len} characters"
        )));
    }
    if origin.to_lowercase() == destination.to_lowercase() {
        return Err(DispatchError::InvalidLocations(
            "trip origin and destination must differ".into(),
        ));
    }
    Ok(())
}

fn validate_price(price: Decimal, max_price: Decimal) -> Result<(), DispatchError> {
    if price <= Decimal::ZERO {
        return Err(DispatchError::InvalidPrice(
            "trip price must be greater than zero".into(),
        ));
    }
    if price > max_price {
        return Err(DispatchError::InvalidPrice(format!(
            "trip price {price} exceeds the maximum allowed ({max_price})"
        )));
    }
    Ok(())
}
