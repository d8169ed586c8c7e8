use lightsout_core::{Snapshot, TrialPhase};
use tracing::info;

/// Sink for trial snapshots. Called once on attach and then after every
/// state change; surfaces never mutate the trial.
pub trait DisplaySurface {
    fn render(&mut self, snapshot: &Snapshot);
}

impl<F> DisplaySurface for F
where
    F: FnMut(&Snapshot),
{
    fn render(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// Logs phase transitions and results
#[derive(Debug, Default)]
pub struct TracingSurface {
    last_phase: Option<(u64, TrialPhase)>,
}

impl TracingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySurface for TracingSurface {
    fn render(&mut self, snapshot: &Snapshot) {
        let key = (snapshot.trial_id, snapshot.phase);
        if self.last_phase == Some(key) {
            return;
        }
        self.last_phase = Some(key);
        info!(
            trial = snapshot.trial_id,
            phase = %snapshot.phase,
            "{}",
            snapshot.headline()
        );
    }
}
