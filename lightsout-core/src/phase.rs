use serde::{Deserialize, Serialize};

/// Lifecycle of a single trial
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialPhase {
    #[default]
    Idle,
    Sequencing,
    Armed,
    Completed,
    Faulted,
}

impl TrialPhase {
    /// Phases in which a react signal has an effect
    pub fn accepts_reaction(&self) -> bool {
        matches!(self, Self::Sequencing | Self::Armed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Faulted)
    }

    /// True while lamp or go-dark timers may still fire
    pub fn is_sequencing(&self) -> bool {
        matches!(self, Self::Sequencing)
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sequencing => "sequencing",
            Self::Armed => "armed",
            Self::Completed => "completed",
            Self::Faulted => "faulted",
        }
    }
}

impl std::fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_phases_accept_reactions() {
        use TrialPhase::*;
        let accepting: Vec<_> = [Idle, Sequencing, Armed, Completed, Faulted]
            .into_iter()
            .filter(|p| p.accepts_reaction())
            .collect();
        assert_eq!(accepting, vec![Sequencing, Armed]);
    }

    #[test]
    fn terminal_phases() {
        assert!(TrialPhase::Completed.is_terminal());
        assert!(TrialPhase::Faulted.is_terminal());
        assert!(!TrialPhase::Armed.is_terminal());
        assert!(!TrialPhase::Idle.is_terminal());
        assert_eq!(TrialPhase::default(), TrialPhase::Idle);
    }
}
