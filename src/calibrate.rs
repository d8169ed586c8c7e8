use std::time::Duration;

use anyhow::Result;
use lightsout_core::TrialPhase;
use lightsout_sequencer::{ReactOutcome, ReactionSequencer, TracingSurface};
use lightsout_timing::{Clock, HighPrecisionClock, TimingStats};
use rand::Rng;
use tracing::{info, warn};

use crate::config::Settings;

/// Plays `trials` trials headless, reacting `reaction_ms` after each
/// lights-out, and returns how far each measured reaction overshot.
pub fn run_trials<C, R>(
    sequencer: &mut ReactionSequencer<C, R>,
    trials: usize,
    reaction_ms: u64,
) -> Vec<Duration>
where
    C: Clock,
    R: Rng,
{
    let mut overshoot = Vec::with_capacity(trials);

    for _ in 0..trials {
        sequencer.start();
        while sequencer.phase() == TrialPhase::Sequencing {
            let Some(deadline) = sequencer.next_deadline() else {
                break;
            };
            sequencer.clock().sleep_until(deadline);
            sequencer.poll();
        }

        sequencer.clock().sleep(Duration::from_millis(reaction_ms));
        match sequencer.react() {
            ReactOutcome::Completed {
                reaction_time_ms, ..
            } => overshoot.push(Duration::from_millis(
                reaction_time_ms.saturating_sub(reaction_ms),
            )),
            other => warn!(?other, "calibration trial did not complete"),
        }
    }

    overshoot
}

pub fn run(settings: &Settings, trials: usize, reaction_ms: u64) -> Result<TimingStats> {
    let mut sequencer = ReactionSequencer::new(
        settings.sequencer.clone(),
        HighPrecisionClock::new(),
        rand::rng(),
    )?;
    sequencer.attach(TracingSurface::new());

    info!(trials, reaction_ms, "starting calibration run");
    let samples = run_trials(&mut sequencer, trials, reaction_ms);
    let stats = TimingStats::from_samples(&samples);

    info!(
        samples = stats.samples,
        "timer overshoot: mean {:.3} ms, jitter {:.3} ms, max {:.3} ms",
        stats.mean_ms(),
        stats.jitter_ms(),
        stats.max_ns / 1_000_000.0,
    );
    Ok(stats)
}
