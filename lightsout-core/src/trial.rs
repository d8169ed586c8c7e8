use crate::lamp::{LAMP_COUNT, LampBank};
use crate::phase::TrialPhase;
use crate::tier::{Tier, classify};
use serde::{Deserialize, Serialize};

/// Why a trial aborted
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultReason {
    EarlyPress,
}

/// Read-only view of the live trial handed to display surfaces
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub trial_id: u64,
    pub lamps: LampBank,
    pub phase: TrialPhase,
    pub reaction_time_ms: Option<u64>,
    pub fault_reason: Option<FaultReason>,
}

impl Snapshot {
    pub fn lamp_states(&self) -> [bool; LAMP_COUNT] {
        self.lamps.states()
    }

    pub fn tier(&self) -> Option<Tier> {
        self.reaction_time_ms.map(classify)
    }

    /// One line of player-facing text for the current phase
    pub fn headline(&self) -> String {
        match (self.phase, self.reaction_time_ms, self.fault_reason) {
            (TrialPhase::Completed, Some(ms), _) => {
                format!("Your Reaction Time: {ms} ms. {}", classify(ms).message())
            }
            (TrialPhase::Faulted, _, Some(FaultReason::EarlyPress)) => {
                "You pressed too early! Retry again.".to_string()
            }
            (TrialPhase::Sequencing | TrialPhase::Armed, _, _) => {
                "Press Enter or tap the button when all lights turn off!".to_string()
            }
            _ => "Press Space or tap to start".to_string(),
        }
    }
}

/// Terminal result of a trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Completed { reaction_time_ms: u64, tier: Tier },
    Faulted { reason: FaultReason },
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial_id: u64,
    pub outcome: Outcome,
}

impl TrialRecord {
    pub fn reaction_time_ms(&self) -> Option<u64> {
        match self.outcome {
            Outcome::Completed {
                reaction_time_ms, ..
            } => Some(reaction_time_ms),
            Outcome::Faulted { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_follows_phase() {
        let mut snap = Snapshot::default();
        assert_eq!(snap.headline(), "Press Space or tap to start");

        snap.phase = TrialPhase::Sequencing;
        assert!(snap.headline().starts_with("Press Enter"));

        snap.phase = TrialPhase::Completed;
        snap.reaction_time_ms = Some(342);
        assert_eq!(
            snap.headline(),
            "Your Reaction Time: 342 ms. Great reflexes!"
        );
        assert_eq!(snap.tier(), Some(Tier::Tier2));
    }

    #[test]
    fn faulted_headline() {
        let snap = Snapshot {
            phase: TrialPhase::Faulted,
            fault_reason: Some(FaultReason::EarlyPress),
            ..Snapshot::default()
        };
        assert_eq!(snap.headline(), "You pressed too early! Retry again.");
        assert_eq!(snap.tier(), None);
    }

    #[test]
    fn record_serializes_with_outcome_tag() {
        let record = TrialRecord {
            trial_id: 3,
            outcome: Outcome::Completed {
                reaction_time_ms: 180,
                tier: Tier::Tier1,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["outcome"]["kind"], "completed");
        assert_eq!(json["outcome"]["tier"], "tier1");
        assert_eq!(record.reaction_time_ms(), Some(180));
    }
}
