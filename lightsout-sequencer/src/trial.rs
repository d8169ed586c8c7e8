use lightsout_core::{FaultReason, LampBank, Snapshot, TrialPhase};

/// The live trial. Exactly one exists at a time; `start()` replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    pub id: u64,
    pub lamps: LampBank,
    pub phase: TrialPhase,
    pub timestamps: TrialTimestamps,
    pub fault: Option<FaultReason>,
}

/// Milliseconds on the sequencer's clock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialTimestamps {
    pub start: u64,
    /// Set when the lamps go dark
    pub armed: Option<u64>,
    /// Set by a valid reaction only
    pub response: Option<u64>,
}

impl Trial {
    /// Placeholder before the first start
    pub fn idle() -> Self {
        Self {
            id: 0,
            lamps: LampBank::new(),
            phase: TrialPhase::Idle,
            timestamps: TrialTimestamps::default(),
            fault: None,
        }
    }

    pub fn begin(id: u64, now_ms: u64) -> Self {
        Self {
            id,
            lamps: LampBank::new(),
            phase: TrialPhase::Sequencing,
            timestamps: TrialTimestamps {
                start: now_ms,
                ..TrialTimestamps::default()
            },
            fault: None,
        }
    }

    pub fn reaction_time_ms(&self) -> Option<u64> {
        if self.phase != TrialPhase::Completed {
            return None;
        }
        let armed = self.timestamps.armed?;
        self.timestamps.response.map(|r| r.saturating_sub(armed))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            trial_id: self.id,
            lamps: self.lamps,
            phase: self.phase,
            reaction_time_ms: self.reaction_time_ms(),
            fault_reason: self.fault,
        }
    }
}
