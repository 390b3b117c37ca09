//! Storage seam: the repository trait the engine runs against, plus the
//! in-memory implementation used by tests and scenario building.
//!
//! The engine never talks to a database directly. Everything it needs is
//! behind [EntityStore], so any transactional backend can be plugged in and
//! the whole engine stays testable against [MemoryStore].

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::entities::{
    Driver, DriverId, ResourceKind, Rider, RiderId, Trip, TripId, TripStatus, Vehicle, VehicleId,
};

/// Infrastructure fault from the storage layer. Distinct from the business
/// rejections in [crate::error::DispatchError]; callers may retry these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not serve the operation (connection loss, aborted
    /// transaction, poisoned state).
    Unavailable(String),
    /// A write violated a storage constraint (e.g. duplicate plate).
    Conflict(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(reason) => write!(f, "store unavailable: {reason}"),
            StoreError::Conflict(reason) => write!(f, "store conflict: {reason}"),
        }
    }
}

impl Error for StoreError {}

/// Data for a trip about to be created. The store assigns the id and the
/// record starts out visible (`soft_deleted = false`).
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub rider: RiderId,
    pub driver: DriverId,
    pub vehicle: VehicleId,
    pub origin: String,
    pub destination: String,
    pub price: Decimal,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
}

/// Repository interface for the dispatch engine.
///
/// Lookups return `Ok(None)` for unknown ids; `Err` is reserved for
/// infrastructure faults. Mutations on missing records also report
/// `Ok(None)` so the engine owns the not-found semantics.
pub trait EntityStore: Send + Sync {
    fn get_rider(&self, id: RiderId) -> Result<Option<Rider>, StoreError>;
    fn get_driver(&self, id: DriverId) -> Result<Option<Driver>, StoreError>;
    fn get_vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, StoreError>;
    /// Soft-deleted trips are reported like any other record; callers decide
    /// whether deleted trips count for their purpose.
    fn get_trip(&self, id: TripId) -> Result<Option<Trip>, StoreError>;
    /// Count trips referencing the given entity whose status is `pending` or
    /// `in_progress` and which are not soft-deleted.
    fn count_active_trips_for(&self, kind: ResourceKind, id: u64) -> Result<usize, StoreError>;
    fn create_trip(&self, data: NewTrip) -> Result<Trip, StoreError>;
    fn update_trip_status(
        &self,
        id: TripId,
        status: TripStatus,
    ) -> Result<Option<Trip>, StoreError>;
    /// Soft-delete: the trip stays stored but drops out of active counts.
    fn delete_trip(&self, id: TripId) -> Result<Option<Trip>, StoreError>;
    fn set_rider_active(&self, id: RiderId, active: bool) -> Result<Option<Rider>, StoreError>;
    fn set_driver_active(&self, id: DriverId, active: bool) -> Result<Option<Driver>, StoreError>;
    fn set_vehicle_active(
        &self,
        id: VehicleId,
        active: bool,
    ) -> Result<Option<Vehicle>, StoreError>;
}

#[derive(Debug, Default)]
struct StoreInner {
    riders: HashMap<RiderId, Rider>,
    drivers: HashMap<DriverId, Driver>,
    vehicles: HashMap<VehicleId, Vehicle>,
    trips: HashMap<TripId, Trip>,
    last_rider_id: u64,
    last_driver_id: u64,
    last_vehicle_id: u64,
    last_trip_id: u64,
}

impl StoreInner {
    fn trip_references(trip: &Trip, kind: ResourceKind, id: u64) -> bool {
        match kind {
            ResourceKind::Rider => trip.rider.0 == id,
            ResourceKind::Driver => trip.driver.0 == id,
            ResourceKind::Vehicle => trip.vehicle.0 == id,
            ResourceKind::Trip => trip.id.0 == id,
        }
    }
}

/// In-memory [EntityStore]. Ids are assigned sequentially starting at 1;
/// vehicle plates are normalized (trimmed, uppercased) and kept unique.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreInner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreInner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    /// Register a rider. Entity creation sits outside the engine's three
    /// operations, so the store exposes it directly for seeding.
    pub fn add_rider(
        &self,
        name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Rider, StoreError> {
        let mut inner = self.write()?;
        inner.last_rider_id += 1;
        let rider = Rider {
            id: RiderId(inner.last_rider_id),
            name: name.into(),
            phone: phone.into(),
            active: true,
        };
        inner.riders.insert(rider.id, rider.clone());
        Ok(rider)
    }

    pub fn add_driver(
        &self,
        name: impl Into<String>,
        license: Option<String>,
    ) -> Result<Driver, StoreError> {
        let mut inner = self.write()?;
        inner.last_driver_id += 1;
        let driver = Driver {
            id: DriverId(inner.last_driver_id),
            name: name.into(),
            license,
            active: true,
        };
        inner.drivers.insert(driver.id, driver.clone());
        Ok(driver)
    }

    /// Register a vehicle. Fails with [StoreError::Conflict] when the
    /// normalized plate is already taken.
    pub fn add_vehicle(
        &self,
        plate: impl Into<String>,
        model: Option<String>,
        owner: Option<DriverId>,
    ) -> Result<Vehicle, StoreError> {
        let plate = plate.into().trim().to_uppercase();
        let mut inner = self.write()?;
        if inner.vehicles.values().any(|v| v.plate == plate) {
            return Err(StoreError::Conflict(format!(
                "plate '{plate}' is already registered"
            )));
        }
        inner.last_vehicle_id += 1;
        let vehicle = Vehicle {
            id: VehicleId(inner.last_vehicle_id),
            plate,
            model,
            owner,
            active: true,
        };
        inner.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    /// Snapshot of every stored trip, soft-deleted ones included.
    pub fn trips(&self) -> Result<Vec<Trip>, StoreError> {
        let inner = self.read()?;
        let mut trips: Vec<Trip> = inner.trips.values().cloned().collect();
        trips.sort_by_key(|t| t.id);
        Ok(trips)
    }
}

impl EntityStore for MemoryStore {
    fn get_rider(&self, id: RiderId) -> Result<Option<Rider>, StoreError> {
        Ok(self.read()?.riders.get(&id).cloned())
    }

    fn get_driver(&self, id: DriverId) -> Result<Option<Driver>, StoreError> {
        Ok(self.read()?.drivers.get(&id).cloned())
    }

    fn get_vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, StoreError> {
        Ok(self.read()?.vehicles.get(&id).cloned())
    }

    fn get_trip(&self, id: TripId) -> Result<Option<Trip>, StoreError> {
        Ok(self.read()?.trips.get(&id).cloned())
    }

    fn count_active_trips_for(&self, kind: ResourceKind, id: u64) -> Result<usize, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .trips
            .values()
            .filter(|t| t.is_active() && StoreInner::trip_references(t, kind, id))
            .count())
    }

    fn create_trip(&self, data: NewTrip) -> Result<Trip, StoreError> {
        let mut inner = self.write()?;
        inner.last_trip_id += 1;
        let trip = Trip {
            id: TripId(inner.last_trip_id),
            rider: data.rider,
            driver: data.driver,
            vehicle: data.vehicle,
            origin: data.origin,
            destination: data.destination,
            price: data.price,
            status: data.status,
            created_at: data.created_at,
            soft_deleted: false,
        };
        inner.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    fn update_trip_status(
        &self,
        id: TripId,
        status: TripStatus,
    ) -> Result<Option<Trip>, StoreError> {
        let mut inner = self.write()?;
        Ok(inner.trips.get_mut(&id).map(|trip| {
            trip.status = status;
            trip.clone()
        }))
    }

    fn delete_trip(&self, id: TripId) -> Result<Option<Trip>, StoreError> {
        let mut inner = self.write()?;
        Ok(inner.trips.get_mut(&id).map(|trip| {
            trip.soft_deleted = true;
            trip.clone()
        }))
    }

    fn set_rider_active(&self, id: RiderId, active: bool) -> Result<Option<Rider>, StoreError> {
        let mut inner = self.write()?;
        Ok(inner.riders.get_mut(&id).map(|rider| {
            rider.active = active;
            rider.clone()
        }))
    }

    fn set_driver_active(&self, id: DriverId, active: bool) -> Result<Option<Driver>, StoreError> {
        let mut inner = self.write()?;
        Ok(inner.drivers.get_mut(&id).map(|driver| {
            driver.active = active;
            driver.clone()
        }))
    }

    fn set_vehicle_active(
        &self,
        id: VehicleId,
        active: bool,
    ) -> Result<Option<Vehicle>, StoreError> {
        let mut inner = self.write()?;
        Ok(inner.vehicles.get_mut(&id).map(|vehicle| {
            vehicle.active = active;
            vehicle.clone()
        }))
    }
}
