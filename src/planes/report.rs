use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use super::world::World;

#[derive(Debug, Clone, Serialize)]
pub struct PlaneTarget {
    pub plane_id: u32,
    pub task_id: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickLog {
    pub tick: u64,
    /// Simulation second at the start of the tick
    pub time: u64,
    pub active_tasks: usize,
    pub accepted_bids: usize,
    pub stale_bids: usize,
    pub unallocated: usize,
    pub completed: Vec<u32>,
    pub targets: Vec<PlaneTarget>,
    pub allocation_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub ticks: Vec<TickLog>,
    pub completed_tasks: Vec<u32>,
    pub remaining_tasks: usize,
    pub total_distance: f64,
    pub plane_count: usize,
    pub task_count: usize,
    pub total_duration_ms: f64,
    pub time_per_tick_ms: f64,
}

pub fn build_report(world: &World, ticks: Vec<TickLog>, sim_start: Instant) -> SimulationReport {
    let completed_tasks: Vec<u32> = world.completed().iter().map(|t| t.0).collect();
    let remaining_tasks = world.tasks().len() + world.upcoming();

    let total_duration_ms = sim_start.elapsed().as_secs_f64() * 1000.0;
    let time_per_tick_ms = if ticks.is_empty() {
        0.0
    } else {
        total_duration_ms / (ticks.len() as f64)
    };

    SimulationReport {
        ticks,
        task_count: completed_tasks.len() + remaining_tasks,
        completed_tasks,
        remaining_tasks,
        total_distance: world.distance_flown(),
        plane_count: world.planes().len(),
        total_duration_ms,
        time_per_tick_ms,
    }
}

/// Write `summary.json` into `result_dir`, creating the directory if needed.
pub fn write_report_json<P: AsRef<Path>>(
    report: &SimulationReport,
    result_dir: P,
) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(result_dir.as_ref())?;
    let summary_path = result_dir.as_ref().join("summary.json");
    let mut summary_file = File::create(&summary_path)?;
    serde_json::to_writer_pretty(&mut summary_file, report)?;
    Ok(summary_path)
}
