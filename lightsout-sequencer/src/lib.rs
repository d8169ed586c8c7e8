pub mod config;
pub mod display;
pub mod input;
pub mod session;
pub mod state;
pub mod trial;
pub use config::{ConfigError, MAX_SEQUENCE_MS, SequencerConfig};
pub use display::{DisplaySurface, TracingSurface};
pub use input::{Command, Key, command_for_key, command_for_tap};
pub use session::{Session, SessionSummary};
pub use state::{ReactOutcome, ReactionSequencer};
pub use trial::{Trial, TrialTimestamps};
