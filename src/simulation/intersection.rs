//! Intersection motion and admission logic
//!
//! Standalone implementation that advances every vehicle by one step and
//! enforces that only one lane ever has vehicles inside the intersection.

use log::debug;
use ordered_float::OrderedFloat;

use super::lane::{in_span, Lane};
use super::types::{LaneId, VehicleId, ENTRY_THRESHOLD, MIN_SPACING, ROAD_EXIT, SAFE_MARGIN};

/// Result of advancing the intersection by one step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub intersection_clear: bool,
    /// Vehicle that was admitted into the intersection this step, if any
    pub admitted: Option<VehicleId>,
    /// Vehicles that drove off the road this step
    pub retired: usize,
}

/// The single shared intersection
#[derive(Debug, Clone)]
pub struct SimIntersection {
    /// True iff no vehicle from any lane is inside the span.
    /// Recomputed from vehicle positions after every step
    clear: bool,
    /// The lane currently holding the intersection (if any)
    occupied_by: Option<LaneId>,
    /// Vehicles admitted since the last reset
    pub total_admissions: u64,
}

impl Default for SimIntersection {
    fn default() -> Self {
        Self::new()
    }
}

impl SimIntersection {
    pub fn new() -> Self {
        Self {
            clear: true,
            occupied_by: None,
            total_admissions: 0,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.clear
    }

    pub fn occupied_by(&self) -> Option<LaneId> {
        self.occupied_by
    }

    /// Recompute occupancy from vehicle positions without moving anything
    pub fn refresh(&mut self, lanes: &[Lane]) -> bool {
        self.occupied_by = lanes.iter().find(|lane| lane.occupied()).map(|lane| lane.id);
        self.clear = self.occupied_by.is_none();
        self.clear
    }

    /// Advance every vehicle by one step
    ///
    /// Vehicles inside or past the intersection always keep moving. A vehicle
    /// about to enter may only do so from the green lane, and only if the
    /// intersection was clear when the step began. A vehicle leaving the span
    /// therefore never hands it straight to its follower. Red-lane vehicles
    /// creep up to a safe margin before the entry threshold. No vehicle
    /// closes in on the one ahead below [`MIN_SPACING`].
    pub fn step(&mut self, lanes: &mut [Lane], green_lane: Option<LaneId>) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        let mut occupancy: Vec<bool> = lanes.iter().map(Lane::occupied).collect();
        let was_clear = !occupancy.contains(&true);

        for (index, lane) in lanes.iter_mut().enumerate() {
            let is_green = green_lane == Some(lane.id);
            let lane_id = lane.id;

            let mut ahead: Option<f32> = None;
            let mut lane_occupied = false;

            for vehicle in lane.vehicles_mut().iter_mut() {
                let current = vehicle.position.into_inner();
                let next = current + vehicle.speed;
                let entering = current < ENTRY_THRESHOLD && next >= ENTRY_THRESHOLD;

                let mut advance = if current >= ENTRY_THRESHOLD {
                    true
                } else if entering {
                    is_green && was_clear && !lane_occupied
                } else if is_green {
                    true
                } else {
                    next <= ENTRY_THRESHOLD - SAFE_MARGIN
                };

                if let Some(ahead_position) = ahead {
                    if next > ahead_position - MIN_SPACING {
                        advance = false;
                    }
                }

                if advance {
                    if entering {
                        debug!(
                            "Vehicle {:?} from lane {} entered the intersection",
                            vehicle.id.0, lane_id
                        );
                        outcome.admitted = Some(vehicle.id);
                        self.total_admissions += 1;
                    }
                    vehicle.position = OrderedFloat(next);
                }

                let position = vehicle.position.into_inner();
                lane_occupied |= in_span(position);
                ahead = Some(position);
            }

            occupancy[index] = lane_occupied;

            let before = lane.vehicles().len();
            lane.vehicles_mut()
                .retain(|vehicle| vehicle.position.into_inner() <= ROAD_EXIT);
            let retired = before - lane.vehicles().len();
            lane.vehicles_passed += retired as u64;
            outcome.retired += retired;
        }

        debug_assert!(
            occupancy.iter().filter(|occupied| **occupied).count() <= 1,
            "more than one lane inside the intersection"
        );

        outcome.intersection_clear = self.refresh(lanes);
        outcome
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
