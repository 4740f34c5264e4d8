use std::io::Write;
use std::process::ExitCode;

use mate_engine::{Host, MateSnapshot, Universe};
use serde::Serialize;
use tracing::{error, info};

use super::bootstrap::{build_universe, RunnerConfig, RunnerError};

/// One line of runner output.
#[derive(Debug, Serialize)]
struct TickLine<'a> {
    tick: u64,
    now_ms: u64,
    mates: &'a [MateSnapshot],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) ticks: u64,
    pub(crate) peak_mates: usize,
    pub(crate) sounds: u64,
}

/// Starts the universe and advances it `ticks` times on a simulated clock,
/// writing the snapshot of every tick as one JSON line.
pub(crate) fn run_ticks<H: Host>(
    universe: &mut Universe<H>,
    ticks: u64,
    tick_ms: u64,
    out: &mut impl Write,
) -> Result<RunSummary, RunnerError> {
    universe.start();
    let mut summary = RunSummary::default();
    for tick in 0..ticks {
        let now_ms = tick.saturating_mul(tick_ms);
        universe.advance(now_ms as f64, false);
        let mates = universe.snapshot();
        summary.ticks += 1;
        summary.peak_mates = summary.peak_mates.max(mates.len());
        summary.sounds += mates.iter().filter(|mate| mate.sound.is_some()).count() as u64;

        let line = TickLine {
            tick,
            now_ms,
            mates: &mates,
        };
        serde_json::to_writer(&mut *out, &line).map_err(RunnerError::Encode)?;
        out.write_all(b"\n").map_err(RunnerError::Output)?;
    }
    out.flush().map_err(RunnerError::Output)?;
    universe.stop();
    Ok(summary)
}

pub(crate) fn run(config: RunnerConfig, out: &mut impl Write) -> ExitCode {
    let result = build_universe(&config)
        .and_then(|mut universe| run_ticks(&mut universe, config.ticks, config.tick_ms, out));
    match result {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                peak_mates = summary.peak_mates,
                sounds = summary.sounds,
                "run_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run_failed");
            ExitCode::FAILURE
        }
    }
}
