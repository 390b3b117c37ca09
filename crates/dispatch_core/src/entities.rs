//! Entity records shared across the engine: riders, drivers, vehicles, trips.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DriverId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TripId(pub u64);

impl fmt::Display for RiderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which kind of record an id refers to. Used for lock keys and trip counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Rider,
    Driver,
    Vehicle,
    Trip,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Rider => "rider",
            ResourceKind::Driver => "driver",
            ResourceKind::Vehicle => "vehicle",
            ResourceKind::Trip => "trip",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trip lifecycle stage. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub const ALL: [TripStatus; 4] = [
        TripStatus::Pending,
        TripStatus::InProgress,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    /// Statuses reachable from `self` in one transition.
    pub fn allowed_next(self) -> &'static [TripStatus] {
        match self {
            TripStatus::Pending => &[TripStatus::InProgress, TripStatus::Cancelled],
            TripStatus::InProgress => &[TripStatus::Completed, TripStatus::Cancelled],
            TripStatus::Completed | TripStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: TripStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }

    /// A trip in this status occupies its driver and vehicle.
    pub fn is_active(self) -> bool {
        matches!(self, TripStatus::Pending | TripStatus::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TripStatus::Pending => "pending",
            TripStatus::InProgress => "in_progress",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a wire name; input is trimmed and lowercased first.
    pub fn parse(value: &str) -> Option<TripStatus> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Some(TripStatus::Pending),
            "in_progress" => Some(TripStatus::InProgress),
            "completed" => Some(TripStatus::Completed),
            "cancelled" => Some(TripStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rider {
    pub id: RiderId,
    pub name: String,
    pub phone: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    /// License number on file; duplicates across drivers are allowed.
    pub license: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Normalized plate; unique across vehicles.
    pub plate: String,
    pub model: Option<String>,
    /// Owning driver, if registered. Not required for trip binding.
    pub owner: Option<DriverId>,
    pub active: bool,
}

/// One ride booking linking a rider, a driver, and a vehicle.
///
/// `status` tracks the lifecycle stage; `soft_deleted` tracks visibility.
/// The two are orthogonal: a soft-deleted trip keeps its last status but
/// drops out of every active count and lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub rider: RiderId,
    pub driver: DriverId,
    pub vehicle: VehicleId,
    pub origin: String,
    pub destination: String,
    pub price: Decimal,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
    pub soft_deleted: bool,
}

impl Trip {
    /// True while the trip occupies its driver and vehicle.
    pub fn is_active(&self) -> bool {
        self.status.is_active() && !self.soft_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_in_progress_or_cancelled() {
        assert!(TripStatus::Pending.can_transition_to(TripStatus::InProgress));
        assert!(TripStatus::Pending.can_transition_to(TripStatus::Cancelled));
        assert!(!TripStatus::Pending.can_transition_to(TripStatus::Completed));
        assert!(!TripStatus::Pending.can_transition_to(TripStatus::Pending));
    }

    #[test]
    fn in_progress_moves_to_completed_or_cancelled() {
        assert!(TripStatus::InProgress.can_transition_to(TripStatus::Completed));
        assert!(TripStatus::InProgress.can_transition_to(TripStatus::Cancelled));
        assert!(!TripStatus::InProgress.can_transition_to(TripStatus::Pending));
    }

    #[test]
    fn terminal_statuses_allow_nothing() {
        for next in TripStatus::ALL {
            assert!(!TripStatus::Completed.can_transition_to(next));
            assert!(!TripStatus::Cancelled.can_transition_to(next));
        }
        assert!(TripStatus::Completed.is_terminal());
        assert!(TripStatus::Cancelled.is_terminal());
    }

    #[test]
    fn parse_accepts_wire_names_and_trims() {
        assert_eq!(TripStatus::parse("pending"), Some(TripStatus::Pending));
        assert_eq!(TripStatus::parse(" In_Progress "), Some(TripStatus::InProgress));
        assert_eq!(TripStatus::parse("completed"), Some(TripStatus::Completed));
        assert_eq!(TripStatus::parse("cancelled"), Some(TripStatus::Cancelled));
        assert_eq!(TripStatus::parse("flying"), None);
        assert_eq!(TripStatus::parse(""), None);
    }

    #[test]
    fn only_pending_and_in_progress_are_active() {
        assert!(TripStatus::Pending.is_active());
        assert!(TripStatus::InProgress.is_active());
        assert!(!TripStatus::Completed.is_active());
        assert!(!TripStatus::Cancelled.is_active());
    }
}
