//! Standalone intersection simulation module
//!
//! This module contains the scheduling and motion core. It has no timers
//! and no I/O beyond log records, so it can be driven by the headless CLI,
//! by tests, or by any outer transport layer.

mod detector;
mod error;
mod intersection;
mod lane;
mod scheduler;
mod types;
mod world;

pub use detector::{
    from_named, parse_counts, CountSource, DetectionResults, FixedCounts, LaneCounts, RandomCounts,
};
pub use error::{TrafficError, TrafficResult};
pub use intersection::{SimIntersection, StepOutcome};
pub use lane::{in_span, IngestOutcome, Lane, LaneModel, Vehicle, VehiclePhase};
pub use scheduler::{Decision, Scheduler, SchedulerConfig, SchedulerState};
pub use types::{
    LaneId, SchedulingAlgorithm, SimId, VehicleCategory, VehicleId, EMERGENCY_SPEED,
    ENTRY_THRESHOLD, EXIT_THRESHOLD, LANE_CAPACITY, LANE_COUNT, MIN_SPACING, REGULAR_SPEED,
    ROAD_EXIT, SAFE_MARGIN, SPAWN_FRONT, VEHICLE_GAP,
};
pub use world::{LaneSnapshot, SimWorld, Snapshot};
