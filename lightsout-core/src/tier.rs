use serde::{Deserialize, Serialize};

/// Reaction speed ranking, fastest first
#[derive(Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

/// Inclusive upper bounds for the first three tiers, checked in order
const TIER_LIMITS_MS: [(u64, Tier); 3] = [
    (200, Tier::Tier1),
    (500, Tier::Tier2),
    (800, Tier::Tier3),
];

/// Ranks a reaction time. Total over all inputs.
pub fn classify(reaction_time_ms: u64) -> Tier {
    TIER_LIMITS_MS
        .iter()
        .find(|(limit, _)| reaction_time_ms <= *limit)
        .map(|(_, tier)| *tier)
        .unwrap_or(Tier::Tier4)
}

impl Tier {
    pub fn message(&self) -> &'static str {
        match self {
            Tier::Tier1 => "Woahhh! Your fingers are lightning fast!",
            Tier::Tier2 => "Great reflexes!",
            Tier::Tier3 => "Not bad! Keep practicing.",
            Tier::Tier4 => "Too slow... even turtles are faster than this.",
        }
    }
}
