//! Countdown Timer Library
//!
//! This library provides the core functionality for the countdown CLI.
//! It includes:
//! - Timer controller with start/pause/stop and background hand-off
//! - Session persistence in a JSON key-value file
//! - Wake-up alarms through launchd or systemd timers
//! - CLI command parsing and display utilities
//! - Type definitions for settings and session state

pub mod cli;
pub mod controller;
pub mod store;
pub mod types;
pub mod wakeup;

// Re-export commonly used types for convenience
pub use types::{ButtonStates, TimerSession, TimerSettings, TimerState};

pub use controller::{
    now_epoch_seconds, run_ticks, ControllerError, TickOutcome, TimerController, TimerEvent,
};

pub use store::{JsonFileStore, MemoryStore, SessionStore, StoreError};

pub use wakeup::{
    build_scheduler, handle_timer_expired, LaunchdWakeupScheduler, MockWakeupScheduler,
    NoopWakeupScheduler, SchedulerBackend, SystemdWakeupScheduler, WakeupError, WakeupScheduler,
};
