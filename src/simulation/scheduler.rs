//! Right-of-way scheduling
//!
//! Picks a discipline from the live lane counts every step and proposes the
//! next green lane. The scheduler never grants entry to the intersection
//! itself; the simulator's admission check does that.

use std::cmp::Reverse;

use log::debug;

use super::lane::Lane;
use super::types::{LaneId, SchedulingAlgorithm, LANE_COUNT};

/// Tunables for algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Shortest Job First kicks in when the gap between the busiest and the
    /// quietest lane is strictly greater than this
    pub imbalance_threshold: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            imbalance_threshold: 4,
        }
    }
}

/// What the scheduler remembers between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerState {
    pub current_algorithm: SchedulingAlgorithm,
    /// `None` until the first lane is picked
    pub current_green_lane: Option<LaneId>,
    /// Last lane chosen by round robin
    pub round_robin_cursor: LaneId,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            current_algorithm: SchedulingAlgorithm::RoundRobin,
            current_green_lane: None,
            round_robin_cursor: LaneId::NORTH,
        }
    }
}

/// Outcome of one scheduling decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub algorithm: SchedulingAlgorithm,
    pub next_green_lane: Option<LaneId>,
    pub state: SchedulerState,
    /// The policy wanted another lane but a vehicle was still crossing
    pub held_for_crossing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Choose the next green lane
    ///
    /// Policies are tried in order (priority, shortest job first, round
    /// robin) and the first that yields a lane wins. If the intersection is
    /// not clear, the lane that currently holds it keeps the green until its
    /// vehicle has crossed.
    pub fn decide(
        &self,
        lanes: &[Lane],
        previous: &SchedulerState,
        intersection_clear: bool,
    ) -> Decision {
        let (algorithm, proposed, cursor) = if let Some(lane) = self.pick_priority(lanes) {
            (SchedulingAlgorithm::Priority, Some(lane), previous.round_robin_cursor)
        } else if let Some(lane) = self.pick_shortest_job(lanes) {
            (SchedulingAlgorithm::ShortestJobFirst, Some(lane), previous.round_robin_cursor)
        } else {
            let lane = self.pick_round_robin(lanes, previous.current_green_lane);
            (
                SchedulingAlgorithm::RoundRobin,
                lane,
                lane.unwrap_or(previous.round_robin_cursor),
            )
        };

        let occupying = if intersection_clear {
            None
        } else {
            lanes.iter().find(|lane| lane.occupied()).map(|lane| lane.id)
        };

        if let Some(holder) = occupying {
            if proposed != Some(holder) {
                debug!(
                    "{} proposed {:?}, keeping {} green until its crossing completes",
                    algorithm, proposed, holder
                );
                return Decision {
                    algorithm,
                    next_green_lane: Some(holder),
                    state: SchedulerState {
                        current_algorithm: algorithm,
                        current_green_lane: Some(holder),
                        round_robin_cursor: previous.round_robin_cursor,
                    },
                    held_for_crossing: true,
                };
            }
        }

        debug!("{} selected {:?}", algorithm, proposed);
        Decision {
            algorithm,
            next_green_lane: proposed,
            state: SchedulerState {
                current_algorithm: algorithm,
                current_green_lane: proposed,
                round_robin_cursor: cursor,
            },
            held_for_crossing: false,
        }
    }

    /// Lane with the most emergency vehicles, lowest ordinal on ties
    fn pick_priority(&self, lanes: &[Lane]) -> Option<LaneId> {
        lanes
            .iter()
            .filter(|lane| lane.emergency_count() > 0)
            .min_by_key(|lane| (Reverse(lane.emergency_count()), lane.id))
            .map(|lane| lane.id)
    }

    /// Quietest non-empty lane, but only when the lanes are badly unbalanced
    fn pick_shortest_job(&self, lanes: &[Lane]) -> Option<LaneId> {
        let max = lanes.iter().map(Lane::total_count).max()?;
        let min = lanes.iter().map(Lane::total_count).min()?;
        if max - min <= self.config.imbalance_threshold {
            return None;
        }

        lanes
            .iter()
            .filter(|lane| lane.total_count() > 0)
            .min_by_key(|lane| (lane.total_count(), lane.id))
            .map(|lane| lane.id)
    }

    /// Next non-empty lane after the previous green one
    fn pick_round_robin(&self, lanes: &[Lane], previous: Option<LaneId>) -> Option<LaneId> {
        let start = previous.map_or(LaneId::NORTH, |lane| lane.offset(1));
        (0..LANE_COUNT)
            .map(|step| start.offset(step))
            .find(|candidate| {
                lanes
                    .iter()
                    .any(|lane| lane.id == *candidate && lane.total_count() > 0)
            })
    }
}
