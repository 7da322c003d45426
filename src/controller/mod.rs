//! Controller module for the countdown timer.
//!
//! This module contains the countdown state machine and the loop that feeds
//! it one-second ticks:
//! - `timer`: TimerController with transitions and lifecycle hooks
//! - `ticker`: async tick loop for foreground sessions

pub mod error;
pub mod ticker;
pub mod timer;

pub use error::ControllerError;
pub use ticker::{run_ticks, TickOutcome};
pub use timer::{TimerController, TimerEvent};

/// Current wall-clock time in epoch seconds.
pub fn now_epoch_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}
