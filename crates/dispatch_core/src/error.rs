//! Caller-facing errors for allocation and lifecycle operations.
//!
//! Every variant except [DispatchError::Storage] is a recoverable business
//! rejection with a stable machine-readable code. Storage faults come from
//! the repository layer and may be retried by the caller; the business
//! rejections must not be.

use std::error::Error;
use std::fmt;

use crate::entities::{DriverId, ResourceKind, RiderId, TripId, TripStatus, VehicleId};
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// Rider missing or inactive.
    RiderUnavailable(RiderId),
    /// Rider already holds the maximum number of active trips.
    RiderTripLimitExceeded {
        rider: RiderId,
        active_trips: usize,
        limit: usize,
    },
    /// Driver missing or inactive.
    DriverUnavailable(DriverId),
    /// Driver already bound to an active trip.
    DriverAlreadyAssigned {
        driver: DriverId,
        active_trips: usize,
    },
    /// Vehicle missing or inactive.
    VehicleUnavailable(VehicleId),
    /// Vehicle already bound to an active trip.
    VehicleAlreadyAssigned {
        vehicle: VehicleId,
        active_trips: usize,
    },
    InvalidLocations(String),
    InvalidPrice(String),
    /// Unrecognized status value, carried verbatim.
    InvalidStatus(String),
    TripNotFound(TripId),
    InvalidTransition {
        from: TripStatus,
        to: TripStatus,
    },
    /// The trip's status forbids deletion.
    DeleteNotAllowed(TripStatus),
    /// The entity still has active trips and cannot be deactivated.
    DeactivationBlocked {
        kind: ResourceKind,
        id: u64,
        active_trips: usize,
    },
    /// Infrastructure fault from the storage layer; retryable.
    Storage(StoreError),
}

impl DispatchError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::RiderUnavailable(_) => "rider_unavailable",
            DispatchError::RiderTripLimitExceeded { .. } => "rider_trip_limit",
            DispatchError::DriverUnavailable(_) => "driver_unavailable",
            DispatchError::DriverAlreadyAssigned { .. } => "driver_already_assigned",
            DispatchError::VehicleUnavailable(_) => "vehicle_unavailable",
            DispatchError::VehicleAlreadyAssigned { .. } => "vehicle_already_assigned",
            DispatchError::InvalidLocations(_) => "invalid_locations",
            DispatchError::InvalidPrice(_) => "invalid_price",
            DispatchError::InvalidStatus(_) => "invalid_status",
            DispatchError::TripNotFound(_) => "trip_not_found",
            DispatchError::InvalidTransition { .. } => "invalid_transition",
            DispatchError::DeleteNotAllowed(_) => "delete_not_allowed",
            DispatchError::DeactivationBlocked { .. } => "deactivation_blocked",
            DispatchError::Storage(_) => "storage",
        }
    }

    /// True when retrying the same request could succeed without any state
    /// change on the caller's side.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DispatchError::Storage(_))
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::RiderUnavailable(id) => {
                write!(f, "rider {id} does not exist or is inactive")
            }
            DispatchError::RiderTripLimitExceeded {
                rider,
                active_trips,
                limit,
            } => write!(
                f,
                "rider {rider} already has {active_trips} active trip(s); the limit is {limit}"
            ),
            DispatchError::DriverUnavailable(id) => {
                write!(f, "driver {id} does not exist or is inactive")
            }
            DispatchError::DriverAlreadyAssigned {
                driver,
                active_trips,
            } => write!(
                f,
                "driver {driver} already has {active_trips} active trip(s) and cannot take another"
            ),
            DispatchError::VehicleUnavailable(id) => {
                write!(f, "vehicle {id} does not exist or is inactive")
            }
            DispatchError::VehicleAlreadyAssigned {
                vehicle,
                active_trips,
            } => write!(
                f,
                "vehicle {vehicle} is already assigned to {active_trips} active trip(s)"
            ),
            DispatchError::InvalidLocations(reason) => f.write_str(reason),
            DispatchError::InvalidPrice(reason) => f.write_str(reason),
            DispatchError::InvalidStatus(value) => write!(
                f,
                "unknown trip status '{value}'; expected one of: pending, in_progress, completed, cancelled"
            ),
            DispatchError::TripNotFound(id) => write!(f, "trip {id} not found"),
            DispatchError::InvalidTransition { from, to } => {
                write!(f, "cannot change trip status from '{from}' to '{to}'")
            }
            DispatchError::DeleteNotAllowed(status) => {
                write!(f, "cannot delete a trip in status '{status}'")
            }
            DispatchError::DeactivationBlocked {
                kind,
                id,
                active_trips,
            } => write!(
                f,
                "{kind} {id} still has {active_trips} active trip(s) and cannot be deactivated"
            ),
            DispatchError::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatchError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for DispatchError {
    fn from(err: StoreError) -> Self {
        DispatchError::Storage(err)
    }
}
