use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use traffic_sched::simulation::{
    parse_counts, CountSource, DetectionResults, FixedCounts, RandomCounts, SchedulerConfig,
    SimWorld, Snapshot,
};
use traffic_sched::stats::SimulationStats;

#[derive(Parser)]
#[command(name = "traffic_sched")]
#[command(about = "Four-way intersection scheduler and simulator")]
struct Cli {
    /// Maximum number of simulation steps to run
    #[arg(long, default_value = "60")]
    steps: u32,

    /// Step at a fixed cadence and stop early once every lane is empty
    #[arg(long)]
    auto: bool,

    /// Delay between steps in auto mode, in milliseconds
    #[arg(long, default_value = "250")]
    interval_ms: u64,

    /// Regular vehicles per lane, comma separated in North,East,South,West order
    #[arg(long)]
    counts: Option<String>,

    /// Emergency vehicles per lane, comma separated in North,East,South,West order
    #[arg(long)]
    emergency: Option<String>,

    /// Seed for randomly generated counts (used when --counts is not given)
    #[arg(long)]
    seed: Option<u64>,

    /// Re-read counts from the source every N steps (0 = only once at start)
    #[arg(long, default_value = "0")]
    redetect_every: u32,

    /// Lane count gap above which Shortest Job First is used
    #[arg(long, default_value = "4")]
    imbalance_threshold: usize,

    /// Print every snapshot as a JSON line instead of the text summary
    #[arg(long)]
    json: bool,

    /// Print the text summary and lane map every N steps
    #[arg(long, default_value = "10")]
    report_every: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut source = build_source(&cli)?;

    let mut world = SimWorld::new_with_config(SchedulerConfig {
        imbalance_threshold: cli.imbalance_threshold,
    });
    run_headless(&cli, &mut world, source.as_mut())
}

fn build_source(cli: &Cli) -> Result<Box<dyn CountSource>> {
    if cli.counts.is_none() && cli.emergency.is_none() {
        return Ok(Box::new(match cli.seed {
            Some(seed) => RandomCounts::new_with_seed(seed, 12, 0.15),
            None => RandomCounts::new(12, 0.15),
        }));
    }

    let counts = parse_counts(cli.counts.as_deref().unwrap_or(""), cli.emergency.as_deref())
        .context("Invalid --counts/--emergency")?;
    if counts.is_empty() {
        bail!("No vehicle counts given");
    }
    Ok(Box::new(FixedCounts::new(counts)))
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli, world: &mut SimWorld, source: &mut dyn CountSource) -> Result<()> {
    info!(
        "Running intersection simulation: up to {} steps{}",
        cli.steps,
        if cli.auto {
            format!(", auto mode every {}ms", cli.interval_ms)
        } else {
            String::new()
        }
    );

    let mut stats = SimulationStats::default();
    let snapshot = detect(world, source, &mut stats)?;
    report(cli, world, &snapshot)?;

    for step in 1..=cli.steps {
        if cli.redetect_every > 0 && step % cli.redetect_every == 0 {
            detect(world, source, &mut stats)?;
        }

        let snapshot = world.step();
        let violations = stats.exclusion_violations;
        stats.record_step(&snapshot, &world.last_outcome);

        if stats.exclusion_violations > violations {
            warn!("More than one lane inside the intersection at step {}", step);
        }

        if cli.json || (cli.report_every > 0 && step % cli.report_every == 0) {
            report(cli, world, &snapshot)?;
        }

        if cli.auto {
            if world.vehicles_on_road() == 0 {
                info!("All lanes empty after {} steps", step);
                break;
            }
            std::thread::sleep(Duration::from_millis(cli.interval_ms));
        }
    }

    if !cli.json {
        println!("=== Final State ===");
        world.print_summary();
        world.draw_map();
    }
    stats.log_report(world.vehicles_on_road());
    Ok(())
}

fn detect(
    world: &mut SimWorld,
    source: &mut dyn CountSource,
    stats: &mut SimulationStats,
) -> Result<Snapshot> {
    let counts: DetectionResults = source.next_counts();
    let (snapshot, outcomes) = world
        .ingest_counts(&counts)
        .context("Failed to ingest detector counts")?;
    let added = stats.record_ingest(&outcomes);
    info!(
        "Ingested {} new vehicles, {} chose {}",
        added,
        snapshot.current_algorithm,
        snapshot
            .next_green_lane
            .map_or_else(|| "no lane".to_string(), |lane| lane.to_string())
    );
    Ok(snapshot)
}

fn report(cli: &Cli, world: &SimWorld, snapshot: &Snapshot) -> Result<()> {
    if cli.json {
        println!("{}", snapshot.to_json().context("Failed to encode snapshot")?);
    } else {
        world.print_summary();
        world.draw_map();
        println!();
    }
    Ok(())
}
