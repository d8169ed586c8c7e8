pub mod clock;
pub mod queue;
pub mod stats;

pub use clock::{Clock, HighPrecisionClock, ManualClock};
pub use queue::{TimerHandle, TimerQueue};
pub use stats::TimingStats;
