use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType, SetTitle},
};
use dotlife_core::{Generation, Life, LifeConfig, RoundStats};
use dotlife_render::write_frame;
use serde::Serialize;
use tracing::info;

const ROUND_PAUSE: Duration = Duration::from_millis(10);
const DEFAULT_HEADLESS_ROUNDS: usize = 24;
const MAX_HEADLESS_ROUNDS: usize = 10_000;

fn main() -> Result<()> {
    init_tracing();

    let mut life = Life::new(LifeConfig::default()).context("invalid grid configuration")?;
    life.randomize();

    if std::env::var_os("DOTLIFE_HEADLESS").is_some() {
        let report = run_headless(&mut life, headless_round_budget())?;
        info!(
            target = "dotlife::headless",
            rounds = report.summary.round_count,
            final_alive = report.summary.final_alive,
            total_born = report.summary.total_born,
            total_killed = report.summary.total_killed,
            border_clean = report.summary.border_clean,
            "Headless run completed"
        );
        return Ok(());
    }

    info!("Starting dotlife terminal loop");
    run(life)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Drives the interactive loop: render, step, retitle, pause, clear.
///
/// The frame for a generation is always flushed before the step computing
/// the following generation runs. There is no normal exit; the process runs
/// until externally terminated, and any terminal write failure aborts it.
fn run(mut life: Life) -> Result<()> {
    let mut out = io::stdout();
    let mut generation = Generation::zero();

    loop {
        write_frame(life.grid(), &mut out).context("failed to write frame")?;
        out.flush().context("failed to flush frame")?;

        let stats = life.step();
        execute!(out, SetTitle(status_title(&stats, generation)))
            .context("failed to update terminal title")?;

        thread::sleep(ROUND_PAUSE);
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))
            .context("failed to clear terminal")?;
        generation = generation.next();
    }
}

fn status_title(stats: &RoundStats, generation: Generation) -> String {
    format!(
        "Killed: {}, Born: {}, Alive: {}, T={}",
        stats.killed, stats.born, stats.alive, generation.0
    )
}

fn run_headless(life: &mut Life, rounds: usize) -> Result<HeadlessReport> {
    let mut report = HeadlessReport::new(life.grid().live_cells());
    let mut frame = Vec::new();
    let mut generation = Generation::zero();

    for _ in 0..rounds {
        frame.clear();
        write_frame(life.grid(), &mut frame).context("failed to render headless frame")?;
        let stats = life.step();
        report.record(generation, stats);
        generation = generation.next();
    }

    report.finalize(life);

    if let Some(path) = report_file_path_from_env() {
        report
            .write_json(&path)
            .with_context(|| format!("failed to write headless report to {}", path.display()))?;
    }

    Ok(report)
}

fn headless_round_budget() -> usize {
    std::env::var("DOTLIFE_HEADLESS_ROUNDS")
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .map(|value| value.min(MAX_HEADLESS_ROUNDS))
        .unwrap_or(DEFAULT_HEADLESS_ROUNDS)
}

fn report_file_path_from_env() -> Option<PathBuf> {
    std::env::var_os("DOTLIFE_HEADLESS_REPORT").and_then(|raw| {
        if raw.is_empty() {
            None
        } else {
            Some(PathBuf::from(raw))
        }
    })
}

#[derive(Debug, Clone, Serialize)]
struct HeadlessReport {
    initial_alive: usize,
    rounds: Vec<RoundRecord>,
    summary: ReportSummary,
}

impl HeadlessReport {
    fn new(initial_alive: usize) -> Self {
        Self {
            initial_alive,
            rounds: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    fn record(&mut self, generation: Generation, stats: RoundStats) {
        self.rounds.push(RoundRecord {
            round: generation.0,
            killed: stats.killed,
            born: stats.born,
            alive: stats.alive,
        });
    }

    fn finalize(&mut self, life: &Life) {
        self.summary = ReportSummary::from_rounds(&self.rounds, life);
    }

    fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).context("failed to serialize headless report")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
struct RoundRecord {
    round: u64,
    killed: usize,
    born: usize,
    alive: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
struct ReportSummary {
    round_count: usize,
    total_killed: usize,
    total_born: usize,
    final_alive: usize,
    border_clean: bool,
}

impl ReportSummary {
    fn from_rounds(rounds: &[RoundRecord], life: &Life) -> Self {
        Self {
            round_count: rounds.len(),
            total_killed: rounds.iter().map(|round| round.killed).sum(),
            total_born: rounds.iter().map(|round| round.born).sum(),
            final_alive: rounds
                .last()
                .map_or_else(|| life.grid().live_cells(), |round| round.alive),
            border_clean: life.grid().border_is_dead(),
        }
    }
}
