//! Main simulation world that ties everything together
//!
//! `SimWorld` owns all mutable state (lanes, scheduler memory, intersection
//! occupancy). Every step runs a scheduling decision and then applies motion,
//! to completion, before returning.

use log::{debug, info};
use serde::Serialize;

use super::detector::DetectionResults;
use super::error::TrafficResult;
use super::intersection::{SimIntersection, StepOutcome};
use super::lane::{IngestOutcome, Lane, LaneModel, VehiclePhase};
use super::scheduler::{Decision, Scheduler, SchedulerConfig, SchedulerState};
use super::types::{
    LaneId, SchedulingAlgorithm, VehicleCategory, ENTRY_THRESHOLD, EXIT_THRESHOLD, LANE_COUNT,
    ROAD_EXIT,
};

/// Per-lane view handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaneSnapshot {
    pub lane_id: LaneId,
    pub name: &'static str,
    pub regular_count: usize,
    pub emergency_count: usize,
    pub occupied: bool,
    pub is_green: bool,
    pub green_steps: u64,
    pub waiting_steps: u64,
    pub vehicles_passed: u64,
}

impl LaneSnapshot {
    fn from_lane(lane: &Lane) -> Self {
        Self {
            lane_id: lane.id,
            name: lane.id.name(),
            regular_count: lane.regular_count(),
            emergency_count: lane.emergency_count(),
            occupied: lane.occupied(),
            is_green: lane.is_green,
            green_steps: lane.green_steps,
            waiting_steps: lane.waiting_steps,
            vehicles_passed: lane.vehicles_passed,
        }
    }
}

/// State reported after every step or ingest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub step: u64,
    pub current_algorithm: SchedulingAlgorithm,
    pub next_green_lane: Option<LaneId>,
    pub intersection_clear: bool,
    pub lanes: Vec<LaneSnapshot>,
}

impl Snapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The main simulation world
#[derive(Debug, Clone)]
pub struct SimWorld {
    lanes: LaneModel,
    scheduler: Scheduler,
    scheduler_state: SchedulerState,
    intersection: SimIntersection,
    /// Steps completed since the last reset
    pub step_count: u64,
    /// Outcome of the most recent step
    pub last_outcome: StepOutcome,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    pub fn new() -> Self {
        Self::new_with_config(SchedulerConfig::default())
    }

    pub fn new_with_config(config: SchedulerConfig) -> Self {
        Self {
            lanes: LaneModel::new(),
            scheduler: Scheduler::new(config),
            scheduler_state: SchedulerState::default(),
            intersection: SimIntersection::new(),
            step_count: 0,
            last_outcome: StepOutcome {
                intersection_clear: true,
                ..StepOutcome::default()
            },
        }
    }

    pub fn lanes(&self) -> &[Lane; LANE_COUNT] {
        self.lanes.lanes()
    }

    pub fn lane(&self, lane: LaneId) -> &Lane {
        self.lanes.lane(lane)
    }

    pub fn scheduler_state(&self) -> &SchedulerState {
        &self.scheduler_state
    }

    pub fn intersection(&self) -> &SimIntersection {
        &self.intersection
    }

    pub fn is_clear(&self) -> bool {
        self.intersection.is_clear()
    }

    /// Total vehicles still waiting for or inside the intersection
    pub fn pending_vehicles(&self) -> usize {
        self.lanes().iter().map(Lane::total_count).sum()
    }

    /// Vehicles still on the road in any phase
    pub fn vehicles_on_road(&self) -> usize {
        self.lanes().iter().map(|lane| lane.vehicles().len()).sum()
    }

    /// Load counts for one lane and re-run the scheduling decision
    pub fn ingest(
        &mut self,
        lane_id: usize,
        regular_count: i64,
        emergency_count: i64,
    ) -> TrafficResult<Snapshot> {
        self.lanes.ingest(lane_id, regular_count, emergency_count)?;
        Ok(self.redecide())
    }

    /// Load a full detector result and re-run the scheduling decision
    ///
    /// Every lane id is validated before any lane is touched, so a bad entry
    /// leaves the world unchanged. Returns what each lane actually stored.
    pub fn ingest_counts(
        &mut self,
        counts: &DetectionResults,
    ) -> TrafficResult<(Snapshot, Vec<IngestOutcome>)> {
        let validated = counts
            .iter()
            .map(|(lane_id, lane_counts)| {
                LaneId::new(*lane_id).map(|lane| (lane, *lane_counts))
            })
            .collect::<TrafficResult<Vec<_>>>()?;

        let outcomes = validated
            .into_iter()
            .map(|(lane, lane_counts)| {
                self.lanes
                    .ingest_lane(lane, lane_counts.regular, lane_counts.emergency)
            })
            .collect();
        Ok((self.redecide(), outcomes))
    }

    fn redecide(&mut self) -> Snapshot {
        let clear = self.intersection.refresh(self.lanes.lanes());
        let decision = self
            .scheduler
            .decide(self.lanes.lanes(), &self.scheduler_state, clear);
        self.apply_decision(&decision);
        self.snapshot()
    }

    fn apply_decision(&mut self, decision: &Decision) {
        self.scheduler_state = decision.state;
        for lane in self.lanes.lanes_mut() {
            lane.is_green = decision.next_green_lane == Some(lane.id);
        }
    }

    /// Advance the simulation by one discrete step
    pub fn step(&mut self) -> Snapshot {
        let decision = self.scheduler.decide(
            self.lanes.lanes(),
            &self.scheduler_state,
            self.intersection.is_clear(),
        );
        self.apply_decision(&decision);

        for lane in self.lanes.lanes_mut() {
            if lane.is_green {
                lane.green_steps += 1;
            } else if lane.total_count() > 0 {
                lane.waiting_steps += 1;
            }
        }

        let outcome = self
            .intersection
            .step(self.lanes.lanes_mut(), decision.next_green_lane);
        self.step_count += 1;

        debug!(
            "Step {}: {} green={:?} clear={} retired={}",
            self.step_count,
            decision.algorithm,
            decision.next_green_lane,
            outcome.intersection_clear,
            outcome.retired
        );
        self.last_outcome = outcome;
        self.snapshot()
    }

    /// Clear all lanes, forget scheduling history and free the intersection
    pub fn reset(&mut self) -> Snapshot {
        self.lanes.clear();
        self.scheduler_state = SchedulerState::default();
        self.intersection.reset();
        self.step_count = 0;
        self.last_outcome = StepOutcome {
            intersection_clear: true,
            ..StepOutcome::default()
        };
        info!("Simulation reset");
        self.snapshot()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step_count,
            current_algorithm: self.scheduler_state.current_algorithm,
            next_green_lane: self.scheduler_state.current_green_lane,
            intersection_clear: self.intersection.is_clear(),
            lanes: self.lanes().iter().map(LaneSnapshot::from_lane).collect(),
        }
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Intersection Summary ===");
        println!("Step: {}", self.step_count);
        println!(
            "Algorithm: {}, Green lane: {}",
            self.scheduler_state.current_algorithm,
            self.scheduler_state
                .current_green_lane
                .map_or_else(|| "none".to_string(), |lane| lane.to_string())
        );
        println!(
            "Intersection: {}",
            match self.intersection.occupied_by() {
                Some(lane) => format!("occupied by {}", lane),
                None => "clear".to_string(),
            }
        );
        println!("--- Lanes ---");
        for lane in self.lanes() {
            println!(
                "  {:<5} regular={:<3} emergency={:<3} green={:<5} passed={:<4} waited={}",
                lane.id.name(),
                lane.regular_count(),
                lane.emergency_count(),
                lane.is_green,
                lane.vehicles_passed,
                lane.waiting_steps
            );
        }
    }

    /// Draw each lane as a strip in the terminal
    ///
    /// `.` road, `|` intersection edges, `r`/`e` regular and emergency
    /// vehicles waiting, `R`/`E` vehicles inside or past the intersection.
    pub fn draw_map(&self) {
        const CELL: f32 = 2.0;
        const START: f32 = -20.0;
        let width = ((ROAD_EXIT - START) / CELL) as usize + 1;

        for lane in self.lanes() {
            let mut row: Vec<char> = (0..width)
                .map(|cell| {
                    let position = START + cell as f32 * CELL;
                    if position == ENTRY_THRESHOLD || position == EXIT_THRESHOLD {
                        '|'
                    } else {
                        '.'
                    }
                })
                .collect();

            for vehicle in lane.vehicles() {
                let position = vehicle.position.into_inner();
                if position < START {
                    continue;
                }
                let cell = (((position - START) / CELL) as usize).min(width - 1);
                let waiting = matches!(
                    vehicle.phase(),
                    VehiclePhase::Queued | VehiclePhase::Approaching
                );
                row[cell] = match (vehicle.category, waiting) {
                    (VehicleCategory::Regular, true) => 'r',
                    (VehicleCategory::Regular, false) => 'R',
                    (VehicleCategory::Emergency, true) => 'e',
                    (VehicleCategory::Emergency, false) => 'E',
                };
            }

            let light = if lane.is_green { 'G' } else { 'R' };
            println!(
                "{:<5} [{}] {}",
                lane.id.name(),
                light,
                row.into_iter().collect::<String>()
            );
        }
    }
}
