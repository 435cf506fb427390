use std::fmt;
use std::str::FromStr;

use crate::coordinate::Coordinate;

pub type DriverId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Available,
    TransitToCollect,
    TransitToDropoff,
    Paused,
    Offline,
    Unregistered,
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DriverStatus::Available => "AVAILABLE",
            DriverStatus::TransitToCollect => "TRANSIT_TO_COLLECT",
            DriverStatus::TransitToDropoff => "TRANSIT_TO_DROPOFF",
            DriverStatus::Paused => "PAUSED",
            DriverStatus::Offline => "OFFLINE",
            DriverStatus::Unregistered => "UNREGISTERED",
        };
        f.write_str(s)
    }
}

impl FromStr for DriverStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(DriverStatus::Available),
            "TRANSIT_TO_COLLECT" => Ok(DriverStatus::TransitToCollect),
            "TRANSIT_TO_DROPOFF" => Ok(DriverStatus::TransitToDropoff),
            "PAUSED" => Ok(DriverStatus::Paused),
            "OFFLINE" => Ok(DriverStatus::Offline),
            "UNREGISTERED" => Ok(DriverStatus::Unregistered),
            other => Err(anyhow::anyhow!("invalid DriverStatus value: {}", other)),
        }
    }
}

/// An immutable courier snapshot, as observed at `last_ping_secs`.
/// `remaining_capacity` tracks simultaneous-order headroom left after
/// accepted jobs and is mutated only via
/// `state_machine::handle_driver_acceptance`; eligibility for new waves
/// is still judged against `max_capacity`, not `remaining_capacity`.
#[derive(Debug, Clone)]
pub struct Driver {
    pub id: DriverId,
    pub location: Coordinate,
    pub status: DriverStatus,
    pub max_capacity: u32,
    pub remaining_capacity: u32,
    pub last_ping_secs: u64,
}

impl Driver {
    pub fn new(id: impl Into<String>, location: Coordinate, status: DriverStatus) -> Self {
        Self {
            id: id.into(),
            location,
            status,
            max_capacity: 1,
            remaining_capacity: 1,
            last_ping_secs: 0,
        }
    }

    pub fn with_capacity(mut self, max_capacity: u32) -> Self {
        self.max_capacity = max_capacity;
        self.remaining_capacity = max_capacity;
        self
    }

    pub fn with_last_ping(mut self, last_ping_secs: u64) -> Self {
        self.last_ping_secs = last_ping_secs;
        self
    }

    pub fn is_eligible(&self, required_capacity: u32) -> bool {
        self.status == DriverStatus::Available && self.max_capacity >= required_capacity
    }
}
