//! Lane queues and vehicle bookkeeping
//!
//! A lane owns its vehicles in arrival order: index 0 is the vehicle
//! closest to (or furthest through) the intersection.

use log::{debug, warn};
use ordered_float::OrderedFloat;

use super::error::TrafficResult;
use super::types::{
    LaneId, SimId, VehicleCategory, VehicleId, ENTRY_THRESHOLD, EXIT_THRESHOLD, LANE_CAPACITY,
    LANE_COUNT, SAFE_MARGIN, SPAWN_FRONT, VEHICLE_GAP,
};

/// Where a vehicle is along its lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehiclePhase {
    /// Waiting in the queue, well short of the intersection
    Queued,
    /// Within the safe margin of the entry threshold
    Approaching,
    /// Inside the intersection span
    Crossing,
    /// Past the intersection, driving off the road
    Exited,
}

/// A vehicle queued on one of the approaches
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub category: VehicleCategory,
    pub position: OrderedFloat<f32>,
    pub speed: f32,
}

impl Vehicle {
    pub fn new(id: VehicleId, category: VehicleCategory, position: f32) -> Self {
        Self {
            id,
            category,
            position: OrderedFloat(position),
            speed: category.speed(),
        }
    }

    pub fn in_intersection(&self) -> bool {
        in_span(self.position.into_inner())
    }

    pub fn phase(&self) -> VehiclePhase {
        let position = self.position.into_inner();
        if position > EXIT_THRESHOLD {
            VehiclePhase::Exited
        } else if position >= ENTRY_THRESHOLD {
            VehiclePhase::Crossing
        } else if position >= ENTRY_THRESHOLD - SAFE_MARGIN {
            VehiclePhase::Approaching
        } else {
            VehiclePhase::Queued
        }
    }

    /// Still needs right-of-way (has not cleared the intersection yet)
    pub fn is_pending(&self) -> bool {
        self.position.into_inner() <= EXIT_THRESHOLD
    }
}

/// True when `position` lies inside the intersection span
pub fn in_span(position: f32) -> bool {
    (ENTRY_THRESHOLD..=EXIT_THRESHOLD).contains(&position)
}

/// One approach to the intersection
#[derive(Debug, Clone)]
pub struct Lane {
    pub id: LaneId,
    vehicles: Vec<Vehicle>,
    /// Whether this lane held right-of-way at the last decision
    pub is_green: bool,
    /// Steps this lane has spent green
    pub green_steps: u64,
    /// Steps this lane has spent red while vehicles were waiting
    pub waiting_steps: u64,
    /// Vehicles from this lane that have left the road
    pub vehicles_passed: u64,
}

impl Lane {
    pub fn new(id: LaneId) -> Self {
        Self {
            id,
            vehicles: Vec::new(),
            is_green: false,
            green_steps: 0,
            waiting_steps: 0,
            vehicles_passed: 0,
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub(crate) fn vehicles_mut(&mut self) -> &mut Vec<Vehicle> {
        &mut self.vehicles
    }

    pub fn regular_count(&self) -> usize {
        self.pending_of(VehicleCategory::Regular)
    }

    pub fn emergency_count(&self) -> usize {
        self.pending_of(VehicleCategory::Emergency)
    }

    pub fn total_count(&self) -> usize {
        self.regular_count() + self.emergency_count()
    }

    /// True iff one of this lane's vehicles is inside the intersection span
    pub fn occupied(&self) -> bool {
        self.vehicles.iter().any(Vehicle::in_intersection)
    }

    fn pending_of(&self, category: VehicleCategory) -> usize {
        self.vehicles
            .iter()
            .filter(|v| v.category == category && v.is_pending())
            .count()
    }

    fn clear(&mut self) {
        self.vehicles.clear();
        self.is_green = false;
        self.green_steps = 0;
        self.waiting_steps = 0;
        self.vehicles_passed = 0;
    }
}

/// What an ingest call actually stored after clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    pub lane: LaneId,
    pub regular_admitted: usize,
    pub emergency_admitted: usize,
    /// Waiting vehicles that were dropped to make way for the new queue
    pub replaced: usize,
    /// A negative count was clamped to zero
    pub clamped_negative: bool,
    /// A count above the lane capacity was truncated
    pub truncated: bool,
}

/// The four lanes plus the id allocator for their vehicles
#[derive(Debug, Clone)]
pub struct LaneModel {
    lanes: [Lane; LANE_COUNT],
    next_id: usize,
}

impl Default for LaneModel {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestOutcome {
    /// Vehicles this ingest added beyond the queue it replaced
    pub fn net_added(&self) -> usize {
        (self.regular_admitted + self.emergency_admitted).saturating_sub(self.replaced)
    }
}

impl LaneModel {
    pub fn new() -> Self {
        Self {
            lanes: LaneId::ALL.map(Lane::new),
            next_id: 0,
        }
    }

    pub fn lanes(&self) -> &[Lane; LANE_COUNT] {
        &self.lanes
    }

    pub fn lanes_mut(&mut self) -> &mut [Lane; LANE_COUNT] {
        &mut self.lanes
    }

    pub fn lane(&self, lane: LaneId) -> &Lane {
        &self.lanes[lane.index()]
    }

    /// Replace the waiting queue of a lane with freshly counted vehicles
    ///
    /// Vehicles that already entered the intersection (or cleared it) stay
    /// where they are so a crossing is never cut short; everything behind
    /// the entry threshold is dropped and rebuilt from the counts. Negative
    /// counts are treated as zero. A vehicle still crossing counts against
    /// [`LANE_CAPACITY`] for its category, and anything above that is
    /// truncated.
    pub fn ingest(
        &mut self,
        lane_id: usize,
        regular_count: i64,
        emergency_count: i64,
    ) -> TrafficResult<IngestOutcome> {
        let lane = LaneId::new(lane_id)?;
        Ok(self.ingest_lane(lane, regular_count, emergency_count))
    }

    /// Same as [`LaneModel::ingest`] for an already validated lane
    pub fn ingest_lane(
        &mut self,
        lane: LaneId,
        regular_count: i64,
        emergency_count: i64,
    ) -> IngestOutcome {
        let mut next_id = self.next_id;
        let target = &mut self.lanes[lane.index()];

        let before = target.vehicles.len();
        target
            .vehicles
            .retain(|v| v.position.into_inner() >= ENTRY_THRESHOLD);
        let replaced = before - target.vehicles.len();

        let (regular, regular_clamped, regular_truncated) = clamp_count(
            lane,
            "regular",
            regular_count,
            LANE_CAPACITY.saturating_sub(target.regular_count()),
        );
        let (emergency, emergency_clamped, emergency_truncated) = clamp_count(
            lane,
            "emergency",
            emergency_count,
            LANE_CAPACITY.saturating_sub(target.emergency_count()),
        );

        let categories = std::iter::repeat(VehicleCategory::Regular)
            .take(regular)
            .chain(std::iter::repeat(VehicleCategory::Emergency).take(emergency));
        for (slot, category) in categories.enumerate() {
            let position = SPAWN_FRONT - slot as f32 * VEHICLE_GAP;
            target
                .vehicles
                .push(Vehicle::new(VehicleId(SimId(next_id)), category, position));
            next_id += 1;
        }
        self.next_id = next_id;

        debug!(
            "Lane {} ingested {} regular, {} emergency vehicles ({} replaced)",
            lane, regular, emergency, replaced
        );

        IngestOutcome {
            lane,
            regular_admitted: regular,
            emergency_admitted: emergency,
            replaced,
            clamped_negative: regular_clamped || emergency_clamped,
            truncated: regular_truncated || emergency_truncated,
        }
    }

    /// Remove every vehicle and zero the per-lane bookkeeping
    pub fn clear(&mut self) {
        for lane in &mut self.lanes {
            lane.clear();
        }
    }
}

/// Returns (admitted, was_negative, was_truncated); `room` is what is left
/// of the lane capacity for this category
fn clamp_count(lane: LaneId, kind: &str, count: i64, room: usize) -> (usize, bool, bool) {
    if count < 0 {
        warn!(
            "Lane {} received negative {} count {}, treating as 0",
            lane, kind, count
        );
        return (0, true, false);
    }
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    if count > room {
        warn!(
            "Lane {} received {} {} vehicles, keeping the first {}",
            lane, count, kind, room
        );
        return (room, false, true);
    }
    (count, false, false)
}
