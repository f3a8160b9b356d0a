//! Plane fleet simulation driven by SSI task allocation

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};

use planes_ssi::auction::ssi::logging as ssi_log;
use planes_ssi::config::load_config;
use planes_ssi::logger;
use planes_ssi::planes::{
    build_report, generate_random_problem, load_problem, save_problem, write_report_json,
    Problem, ProblemGenParams, SimulationConfig, World,
};

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "mode", rename_all = "lowercase")]
enum ProblemSource {
    Random(ProblemGenParams),
    File { path: PathBuf },
}

impl Default for ProblemSource {
    fn default() -> Self {
        ProblemSource::Random(ProblemGenParams::default())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct OutputConfig {
    dir: String,
    use_timestamp: bool,
    timestamp_fmt: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "results".to_string(),
            use_timestamp: true,
            timestamp_fmt: "%Y-%m-%d_%H-%M-%S".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SimConfig {
    problem: ProblemSource,
    simulation: SimulationConfig,
    output_config: OutputConfig,
    log_level: Option<String>,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (.pkl or .json); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Problem file to run instead of the configured source
    #[arg(long)]
    problem: Option<PathBuf>,

    /// Log filter, e.g. "warn" or "info,ssi=debug" (overrides config)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config: SimConfig = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config {}: {:#}", path.display(), e);
                return Err(e);
            }
        },
        None => SimConfig::default(),
    };
    if let Some(path) = cli.problem {
        config.problem = ProblemSource::File { path };
    }

    let output = &config.output_config;
    let result_dir = if output.use_timestamp {
        let date_str = Local::now().format(&output.timestamp_fmt).to_string();
        Path::new(&output.dir).join(date_str)
    } else {
        Path::new(&output.dir).to_path_buf()
    };
    std::fs::create_dir_all(&result_dir)?;

    let level = cli
        .log_level
        .or_else(|| config.log_level.clone())
        .unwrap_or_default();
    let _guard = logger::init(result_dir.join("simulation.log"), &level)?;

    if let Some(path) = &cli.config {
        info!("Loaded configuration from {}", path.display());
    }
    info!("Results will be saved to: {}", result_dir.display());

    let problem: Problem = match &config.problem {
        ProblemSource::Random(params) => {
            info!(
                "Generating {} planes and {} random tasks",
                params.planes, params.tasks
            );
            let problem = generate_random_problem(params)?;
            save_problem(&problem, &result_dir.join("problem.json"))?;
            problem
        }
        ProblemSource::File { path } => {
            info!("Loading problem from file: {}", path.display());
            if let Err(e) = std::fs::copy(path, result_dir.join("problem.json")) {
                warn!("Failed to copy problem file: {}", e);
            }
            load_problem(path)?
        }
    };

    let plane_count = problem.planes.len();
    let task_count = problem.tasks.len();
    let sim_start = Instant::now();
    let mut world = World::new(problem, config.simulation)?;

    info!(
        "Running simulation with {} planes and {} tasks",
        plane_count, task_count
    );
    let ticks = world.run()?;

    ssi_log::log_allocation(world.last_allocation());
    ssi_log::log_route_table(world.allocator(), world.planes());

    let report = build_report(&world, ticks, sim_start);
    let summary_path = write_report_json(&report, &result_dir)?;
    info!(
        "{} of {} tasks completed, {:.1} m flown",
        report.completed_tasks.len(),
        report.task_count,
        report.total_distance
    );
    info!("JSON summary saved to {}", summary_path.display());

    Ok(())
}
