//! Core types for the intersection simulation
//!
//! These are standalone types with no I/O attached.

use std::fmt;

use serde::Serialize;

use super::error::{TrafficError, TrafficResult};

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VehicleId(pub SimId);

/// Number of approaches feeding the intersection
pub const LANE_COUNT: usize = 4;

/// One of the four approaches to the intersection, by ordinal
/// (North = 0, East = 1, South = 2, West = 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LaneId(usize);

impl LaneId {
    pub const NORTH: LaneId = LaneId(0);
    pub const EAST: LaneId = LaneId(1);
    pub const SOUTH: LaneId = LaneId(2);
    pub const WEST: LaneId = LaneId(3);

    /// All lanes in ordinal order
    pub const ALL: [LaneId; LANE_COUNT] = [Self::NORTH, Self::EAST, Self::SOUTH, Self::WEST];

    /// Validate a raw ordinal coming from outside the core
    pub fn new(raw: usize) -> TrafficResult<Self> {
        if raw < LANE_COUNT {
            Ok(LaneId(raw))
        } else {
            Err(TrafficError::InvalidLane(raw))
        }
    }

    /// Resolve a direction name as used by the detector ("north", "East", ...)
    pub fn from_name(name: &str) -> TrafficResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "north" => Ok(Self::NORTH),
            "east" => Ok(Self::EAST),
            "south" => Ok(Self::SOUTH),
            "west" => Ok(Self::WEST),
            _ => Err(TrafficError::UnknownLaneName(name.to_string())),
        }
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "North",
            1 => "East",
            2 => "South",
            _ => "West",
        }
    }

    /// The lane `offset` positions after this one, wrapping around
    pub fn offset(self, offset: usize) -> LaneId {
        LaneId((self.0 + offset) % LANE_COUNT)
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

/// Type of vehicle in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    Regular,
    /// Ambulances, fire trucks and the like; they move faster and
    /// trigger priority scheduling
    Emergency,
}

impl VehicleCategory {
    /// Distance covered per step when unobstructed
    pub fn speed(self) -> f32 {
        match self {
            VehicleCategory::Regular => REGULAR_SPEED,
            VehicleCategory::Emergency => EMERGENCY_SPEED,
        }
    }
}

/// The scheduling discipline used for a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SchedulingAlgorithm {
    #[serde(rename = "Priority Scheduling")]
    Priority,
    #[serde(rename = "Shortest Job First")]
    ShortestJobFirst,
    #[default]
    #[serde(rename = "Round Robin")]
    RoundRobin,
}

impl SchedulingAlgorithm {
    pub fn label(self) -> &'static str {
        match self {
            SchedulingAlgorithm::Priority => "Priority Scheduling",
            SchedulingAlgorithm::ShortestJobFirst => "Shortest Job First",
            SchedulingAlgorithm::RoundRobin => "Round Robin",
        }
    }
}

impl fmt::Display for SchedulingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maximum vehicles admitted per lane per category on a single ingest
pub const LANE_CAPACITY: usize = 50;

/// Position at which a vehicle enters the intersection span
pub const ENTRY_THRESHOLD: f32 = 40.0;

/// Position at which a vehicle leaves the intersection span
pub const EXIT_THRESHOLD: f32 = 60.0;

/// Vehicles beyond this position have left the road and are retired
pub const ROAD_EXIT: f32 = 100.0;

/// Initial position of the first queued vehicle in a lane
pub const SPAWN_FRONT: f32 = 30.0;

/// Gap between consecutive vehicles when they are queued on ingest
pub const VEHICLE_GAP: f32 = 10.0;

/// Closest a vehicle may get to the one ahead of it in its lane
pub const MIN_SPACING: f32 = 6.0;

/// Distance a red-lane vehicle must keep from the entry threshold
pub const SAFE_MARGIN: f32 = 4.0;

pub const REGULAR_SPEED: f32 = 2.0;
pub const EMERGENCY_SPEED: f32 = 3.0;
