use std::collections::BTreeMap;

use log::info;

use crate::simulation::{IngestOutcome, Snapshot, StepOutcome};

/// Running totals for a headless run
#[derive(Debug, Clone, Default)]
pub struct SimulationStats {
    pub steps: u64,
    pub vehicles_ingested: u64,
    pub vehicles_passed: u64,
    pub admissions: u64,
    /// Steps on which more than one lane was inside the intersection.
    /// Anything other than zero is a bug
    pub exclusion_violations: u64,
    pub algorithm_steps: BTreeMap<&'static str, u64>,
}

impl SimulationStats {
    /// Count vehicles new to the road; a re-detected queue only adds the
    /// difference over the queue it replaced
    pub fn record_ingest(&mut self, outcomes: &[IngestOutcome]) -> usize {
        let added: usize = outcomes.iter().map(IngestOutcome::net_added).sum();
        self.vehicles_ingested += added as u64;
        added
    }

    /// Update statistics after a step
    pub fn record_step(&mut self, snapshot: &Snapshot, outcome: &StepOutcome) {
        self.steps += 1;
        self.vehicles_passed += outcome.retired as u64;
        if outcome.admitted.is_some() {
            self.admissions += 1;
        }
        if snapshot.lanes.iter().filter(|lane| lane.occupied).count() > 1 {
            self.exclusion_violations += 1;
        }
        *self
            .algorithm_steps
            .entry(snapshot.current_algorithm.label())
            .or_default() += 1;
    }

    /// Log the end-of-run report
    pub fn log_report(&self, vehicles_remaining: usize) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Steps run: {}", self.steps);
        info!("Vehicles ingested: {}", self.vehicles_ingested);
        info!("Vehicles admitted: {}", self.admissions);
        info!("Vehicles passed: {}", self.vehicles_passed);
        info!("Vehicles remaining: {}", vehicles_remaining);
        info!("Exclusion violations: {}", self.exclusion_violations);
        for (algorithm, steps) in &self.algorithm_steps {
            info!("Steps under {}: {}", algorithm, steps);
        }
        info!(
            "Throughput: {:.1}%",
            if self.vehicles_ingested > 0 {
                (self.vehicles_passed as f32 / self.vehicles_ingested as f32) * 100.0
            } else {
                0.0
            }
        );
    }
}
