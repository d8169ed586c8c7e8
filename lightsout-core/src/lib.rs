pub mod lamp;
pub mod phase;
pub mod tier;
pub mod trial;

pub use lamp::{LAMP_COUNT, LampBank};
pub use phase::TrialPhase;
pub use tier::{Tier, classify};
pub use trial::{FaultReason, Outcome, Snapshot, TrialRecord};
