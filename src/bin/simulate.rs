use chrono::{SecondsFormat, Utc};
use clap::Parser;
use packman_ghost_core::config::SimulationConfig;
use packman_ghost_core::engine::GameEngine;
use packman_ghost_core::error::ConfigError;
use packman_ghost_core::grid::{Grid, Tile};
use packman_ghost_core::level::{classic_grid, load_maze};
use packman_ghost_core::rng::Rng;
use packman_ghost_core::types::{Cell, Direction, GhostMode, RuntimeEvent, Snapshot};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

const STALL_LIMIT_SEC: f32 = 2.0;
const AUTOPILOT_TURN_CHANCE: f32 = 0.02;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    seconds: Option<f32>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    maze: Option<PathBuf>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seconds: f32,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    seconds: f32,
    ticks: u64,
    #[serde(rename = "finalMode")]
    final_mode: GhostMode,
    #[serde(rename = "modeChanges")]
    mode_changes: usize,
    #[serde(rename = "pelletsTaken")]
    pellets_taken: usize,
    reversals: usize,
    #[serde(rename = "frightenedSec")]
    frightened_sec: f32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageModeChanges")]
    average_mode_changes: f32,
    #[serde(rename = "finalModeCounts")]
    final_mode_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (grid, config) = match load_inputs(&cli) {
        Ok(inputs) => inputs,
        Err(error) => {
            tracing::error!(%error, "failed to load simulation inputs");
            std::process::exit(2);
        }
    };

    let scenarios = resolve_scenarios(&cli);
    let started_at = timestamp();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, Utc::now().timestamp_millis()));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        tracing::info!(
            match_id = %match_id,
            scenario = %scenario.name,
            seed = scenario.seed,
            seconds = scenario.seconds,
            "scenario started"
        );
        let scenario_run = match run_scenario(&scenario, &grid, &config) {
            Ok(run) => run,
            Err(error) => {
                tracing::error!(scenario = %scenario.name, %error, "engine rejected configuration");
                std::process::exit(2);
            }
        };

        for anomaly in &scenario_run.anomaly_records {
            tracing::warn!(
                match_id = %match_id,
                scenario = %scenario.name,
                tick = anomaly.tick,
                message = %anomaly.message,
                "anomaly detected"
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();

        tracing::info!(
            match_id = %match_id,
            scenario = %scenario.name,
            ticks = scenario_run.result.ticks,
            mode_changes = scenario_run.result.mode_changes,
            pellets = scenario_run.result.pellets_taken,
            reversals = scenario_run.result.reversals,
            anomalies = scenario_run.anomaly_records.len(),
            "scenario finished"
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        started_at,
        timestamp(),
        scenario_results,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            tracing::error!(path = %path.display(), %error, "summary write failed");
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    tracing::info!(
        match_id = %match_id,
        scenarios = summary.scenario_count,
        anomalies = summary.anomaly_count,
        average_mode_changes = summary.average_mode_changes,
        summary_out = ?summary_out_written,
        "run finished"
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn load_inputs(cli: &Cli) -> Result<(Grid, SimulationConfig), ConfigError> {
    let grid = match cli.maze.as_deref() {
        Some(path) => load_maze(path)?,
        None => classic_grid()?,
    };
    let config = match cli.config.as_deref() {
        Some(path) => SimulationConfig::from_path(path)?,
        None => SimulationConfig::default(),
    };
    Ok((grid, config))
}

/// Steers the player with random turns, re-rolling immediately when it stalls.
struct Autopilot {
    rng: Rng,
}

impl Autopilot {
    fn new(seed: u32) -> Self {
        Self {
            rng: Rng::new(seed ^ 0x9e37_79b9),
        }
    }

    fn next_input(&mut self, stalled: bool) -> Option<Direction> {
        if stalled || self.rng.chance(AUTOPILOT_TURN_CHANCE) {
            return Some(Direction::PRIORITY[self.rng.pick_index(Direction::PRIORITY.len())]);
        }
        None
    }
}

fn run_scenario(
    scenario: &Scenario,
    grid: &Grid,
    config: &SimulationConfig,
) -> Result<ScenarioRunResult, ConfigError> {
    let mut engine = GameEngine::new(grid.clone(), config.clone(), scenario.seed)?;
    for issue in engine.issues() {
        tracing::warn!(scenario = %scenario.name, %issue, "configuration issue");
    }

    let dt = config.tick_sec();
    let total_ticks = (scenario.seconds / dt).ceil().max(0.0) as u64;
    let mut autopilot = Autopilot::new(scenario.seed);
    let mut stall_sec = vec![0.0f32; engine.ghosts().len()];

    let mut mode_changes = 0;
    let mut pellets_taken = 0;
    let mut reversals = 0;
    let mut frightened_sec = 0.0f32;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut final_mode = engine.modes().current_mode();
    let mut last_tick = 0u64;

    for _ in 0..total_ticks {
        let stalled = engine.player().direction.is_none();
        if let Some(dir) = autopilot.next_input(stalled) {
            engine.set_player_input(dir);
        }
        engine.step(dt);
        let snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;
        final_mode = snapshot.mode;
        if snapshot.frightened {
            frightened_sec += dt;
        }

        for message in collect_snapshot_anomalies(&snapshot, &engine.grid, &mut stall_sec, dt) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }

        for event in &snapshot.events {
            match event {
                RuntimeEvent::ModeChanged { .. } => mode_changes += 1,
                RuntimeEvent::PelletTaken { .. } => pellets_taken += 1,
                RuntimeEvent::GhostReversed { .. } => reversals += 1,
            }
        }
    }

    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            seconds: scenario.seconds,
            ticks: last_tick,
            final_mode,
            mode_changes,
            pellets_taken,
            reversals,
            frightened_sec: (frightened_sec * 10.0).round() / 10.0,
            anomalies,
        },
        anomaly_records,
    })
}

fn collect_snapshot_anomalies(
    snapshot: &Snapshot,
    grid: &Grid,
    stall_sec: &mut [f32],
    dt: f32,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.frightened != (snapshot.mode == GhostMode::Frightened) {
        anomalies.push(format!(
            "mode {:?} disagrees with frightened flag {}",
            snapshot.mode, snapshot.frightened
        ));
    }

    for (ghost, stalled) in snapshot.ghosts.iter().zip(stall_sec.iter_mut()) {
        if grid.tile(Cell::new(ghost.x, ghost.y)) == Tile::Wall {
            anomalies.push(format!(
                "ghost inside wall: {} at ({}, {})",
                ghost.name, ghost.x, ghost.y
            ));
        }
        if ghost.dir.is_none() {
            *stalled += dt;
            if *stalled > STALL_LIMIT_SEC {
                anomalies.push(format!("ghost stalled: {}", ghost.name));
            }
        } else {
            *stalled = 0.0;
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(rand::random));

    if cli.single || cli.seconds.is_some() {
        let seconds = clamp_seconds(cli.seconds.unwrap_or(60.0));
        return vec![Scenario {
            name: format!("custom-{}s", seconds.round() as i64),
            seconds,
            seed,
        }];
    }

    vec![
        Scenario {
            name: "quick-check-60s".to_string(),
            seconds: 60.0,
            seed,
        },
        Scenario {
            name: "full-schedule-150s".to_string(),
            seconds: 150.0,
            seed: normalize_seed(seed as u64 + 1),
        },
    ]
}

fn clamp_seconds(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(1.0, 3_600.0)
    } else {
        60.0
    }
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn mode_key(mode: GhostMode) -> String {
    match mode {
        GhostMode::Scatter => "scatter",
        GhostMode::Chase => "chase",
        GhostMode::Frightened => "frightened",
        GhostMode::Returning => "returning",
    }
    .to_string()
}

fn build_run_summary(
    match_id: String,
    started_at: String,
    finished_at: String,
    scenarios: Vec<ScenarioResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let total_mode_changes: usize = scenarios.iter().map(|s| s.mode_changes).sum();
    let average_mode_changes = if scenario_count == 0 {
        0.0
    } else {
        total_mode_changes as f32 / scenario_count as f32
    };
    let mut final_mode_counts = BTreeMap::new();
    for scenario in &scenarios {
        *final_mode_counts
            .entry(mode_key(scenario.final_mode))
            .or_insert(0) += 1;
    }
    RunSummary {
        match_id,
        started_at,
        finished_at,
        scenario_count,
        anomaly_count,
        average_mode_changes,
        final_mode_counts,
        scenarios,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use packman_ghost_core::types::{GhostSnapshot, PlayerSnapshot};

    fn make_scenario_result(final_mode: GhostMode, mode_changes: usize) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            seconds: 60.0,
            ticks: 3_600,
            final_mode,
            mode_changes,
            pellets_taken: 0,
            reversals: 0,
            frightened_sec: 0.0,
            anomalies: Vec::new(),
        }
    }

    fn ghost_at(x: i32, y: i32, dir: Direction) -> GhostSnapshot {
        GhostSnapshot {
            name: "g".to_string(),
            x,
            y,
            world_x: x as f32 + 0.5,
            world_y: y as f32 + 0.5,
            dir,
            target_x: x,
            target_y: y,
        }
    }

    fn snapshot_with(ghosts: Vec<GhostSnapshot>, mode: GhostMode, frightened: bool) -> Snapshot {
        Snapshot {
            tick: 1,
            elapsed_sec: 0.0,
            mode,
            frightened,
            pellets_left: 0,
            player: PlayerSnapshot {
                x: 1,
                y: 1,
                world_x: 1.5,
                world_y: 1.5,
                dir: Direction::None,
            },
            ghosts,
            events: Vec::new(),
        }
    }

    #[test]
    fn default_match_id_contains_seed_and_timestamp() {
        assert_eq!(default_match_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_averages_mode_changes() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            "a".to_string(),
            "b".to_string(),
            vec![
                make_scenario_result(GhostMode::Chase, 6),
                make_scenario_result(GhostMode::Frightened, 9),
            ],
            1,
        );
        assert!((summary.average_mode_changes - 7.5).abs() < f32::EPSILON);
        assert_eq!(summary.scenario_count, 2);
        assert_eq!(summary.final_mode_counts.get("chase"), Some(&1));
        assert_eq!(summary.final_mode_counts.get("frightened"), Some(&1));
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let now = Utc::now().timestamp_millis();
        let target = std::env::temp_dir()
            .join(format!("packman-ghost-missing-{now}"))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            timestamp(),
            timestamp(),
            vec![make_scenario_result(GhostMode::Chase, 7)],
            0,
        );
        let result = write_summary(&target, &summary);
        assert!(result.is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            10,
            "same anomaly".to_string(),
        );
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            11,
            "same anomaly".to_string(),
        );

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tick, 10);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn snapshot_checks_flag_walls_stalls_and_mode_mismatch() {
        let grid = classic_grid().expect("classic maze");
        let mut stall = vec![0.0f32; 2];
        let snapshot = snapshot_with(
            vec![ghost_at(0, 0, Direction::Left), ghost_at(1, 1, Direction::None)],
            GhostMode::Chase,
            true,
        );

        let first = collect_snapshot_anomalies(&snapshot, &grid, &mut stall, 1.5);
        assert_eq!(first.len(), 2);
        assert!(first[0].contains("disagrees"));
        assert!(first[1].contains("inside wall"));

        let second = collect_snapshot_anomalies(&snapshot, &grid, &mut stall, 1.0);
        assert!(second.iter().any(|message| message.contains("stalled")));
    }

    #[test]
    fn classic_scenario_runs_clean() {
        let grid = classic_grid().expect("classic maze");
        let config = SimulationConfig::default();
        let scenario = Scenario {
            name: "test-30s".to_string(),
            seconds: 30.0,
            seed: 77,
        };
        let run = run_scenario(&scenario, &grid, &config).expect("scenario runs");
        assert!(run.result.anomalies.is_empty(), "{:?}", run.result.anomalies);
        assert_eq!(run.result.ticks, 1_800);
        assert!(run.result.mode_changes >= 2);
    }

    #[test]
    fn explicit_seconds_imply_single_scenario() {
        let cli = Cli::parse_from(["simulate", "--seconds", "12", "--seed", "5"]);
        let scenarios = resolve_scenarios(&cli);
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].seed, 5);
        assert_eq!(scenarios[0].name, "custom-12s");

        let cli = Cli::parse_from(["simulate", "--seed", "5"]);
        assert_eq!(resolve_scenarios(&cli).len(), 2);
    }
}
