//! Vehicle count sources
//!
//! The real detector (camera + object recognition) lives outside this crate.
//! All the core needs from it is, per lane, how many regular and emergency
//! vehicles are waiting. These sources produce exactly that.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::Serialize;

use super::error::{TrafficError, TrafficResult};
use super::types::{LaneId, LANE_COUNT};

/// Raw counts for one lane as reported by a detector. Counts are signed
/// because detector noise can report negatives; the lane model clamps them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LaneCounts {
    pub regular: i64,
    pub emergency: i64,
}

impl LaneCounts {
    pub fn new(regular: i64, emergency: i64) -> Self {
        Self { regular, emergency }
    }
}

/// Detector output keyed by raw lane ordinal (not yet validated)
pub type DetectionResults = BTreeMap<usize, LaneCounts>;

/// Anything that can report per-lane vehicle counts
pub trait CountSource {
    fn next_counts(&mut self) -> DetectionResults;
}

/// Reports the same counts every time
#[derive(Debug, Clone)]
pub struct FixedCounts {
    counts: DetectionResults,
}

impl FixedCounts {
    pub fn new(counts: DetectionResults) -> Self {
        Self { counts }
    }
}

impl CountSource for FixedCounts {
    fn next_counts(&mut self) -> DetectionResults {
        self.counts.clone()
    }
}

/// Draws plausible counts for all four lanes from an RNG
#[derive(Debug, Clone)]
pub struct RandomCounts {
    rng: StdRng,
    max_regular: i64,
    emergency_chance: f64,
}

impl RandomCounts {
    pub fn new(max_regular: i64, emergency_chance: f64) -> Self {
        Self::from_rng(StdRng::from_rng(&mut rand::rng()), max_regular, emergency_chance)
    }

    /// Create a source with a seeded RNG for reproducible runs
    pub fn new_with_seed(seed: u64, max_regular: i64, emergency_chance: f64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), max_regular, emergency_chance)
    }

    fn from_rng(rng: StdRng, max_regular: i64, emergency_chance: f64) -> Self {
        Self {
            rng,
            max_regular: max_regular.max(0),
            emergency_chance: emergency_chance.clamp(0.0, 1.0),
        }
    }
}

impl CountSource for RandomCounts {
    fn next_counts(&mut self) -> DetectionResults {
        (0..LANE_COUNT)
            .map(|lane| {
                let regular = self.rng.random_range(0..=self.max_regular);
                let emergency = i64::from(self.rng.random_bool(self.emergency_chance));
                (lane, LaneCounts::new(regular, emergency))
            })
            .collect()
    }
}

/// Convert detector output keyed by direction name ("north", "east", ...)
pub fn from_named<'a, I>(named: I) -> TrafficResult<DetectionResults>
where
    I: IntoIterator<Item = (&'a str, LaneCounts)>,
{
    named
        .into_iter()
        .map(|(name, counts)| LaneId::from_name(name).map(|lane| (lane.index(), counts)))
        .collect()
}

/// Parse comma separated per-lane counts, e.g. `"10,1,10,10"`
///
/// Lanes are assigned in ordinal order; fewer than four values leave the
/// remaining lanes out of the result.
pub fn parse_counts(regular: &str, emergency: Option<&str>) -> TrafficResult<DetectionResults> {
    let regular = parse_list(regular)?;
    let emergency = match emergency {
        Some(list) => parse_list(list)?,
        None => Vec::new(),
    };

    if regular.len() > LANE_COUNT || emergency.len() > LANE_COUNT {
        return Err(TrafficError::MalformedCounts(format!(
            "expected at most {} values per list",
            LANE_COUNT
        )));
    }

    let lanes = regular.len().max(emergency.len());
    Ok((0..lanes)
        .map(|lane| {
            let counts = LaneCounts::new(
                regular.get(lane).copied().unwrap_or(0),
                emergency.get(lane).copied().unwrap_or(0),
            );
            (lane, counts)
        })
        .collect())
}

fn parse_list(list: &str) -> TrafficResult<Vec<i64>> {
    list.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<i64>()
                .map_err(|_| TrafficError::MalformedCounts(format!("{:?} is not a number", value)))
        })
        .collect()
}
