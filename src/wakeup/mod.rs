//! Background wake-up scheduling for the countdown timer.
//!
//! When the app leaves the foreground with the timer running, the remaining
//! time becomes one OS-level alarm. The alarm starts `countdown expire` at or
//! after the fire time, even when no countdown process is alive, and that
//! invocation runs [`handle_timer_expired`] against the persisted snapshot.
//!
//! # Backends
//!
//! - [`LaunchdWakeupScheduler`]: LaunchAgent with a calendar trigger (macOS)
//! - [`SystemdWakeupScheduler`]: transient systemd user timer (Linux)
//! - [`NoopWakeupScheduler`]: no alarm; completion is recovered on the next
//!   foreground resume
//! - [`MockWakeupScheduler`]: records calls for tests

pub mod error;
pub mod launchctl;
pub mod launchd;
pub mod plist;
pub mod systemd;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub use error::{Result, WakeupError};
pub use launchd::LaunchdWakeupScheduler;
pub use plist::{CalendarInterval, WakeupAgent};
pub use systemd::SystemdWakeupScheduler;

use crate::store::{self, SessionStore};
use crate::types::TimerState;

/// Arms and disarms the single background wake-up.
pub trait WakeupScheduler {
    /// Arms a wake-up at `fire_at` epoch seconds, replacing any armed one.
    fn schedule(&self, fire_at: i64) -> Result<()>;

    /// Disarms the pending wake-up; a no-op when none is armed.
    fn cancel(&self) -> Result<()>;
}

impl<T: WakeupScheduler + ?Sized> WakeupScheduler for Box<T> {
    fn schedule(&self, fire_at: i64) -> Result<()> {
        (**self).schedule(fire_at)
    }

    fn cancel(&self) -> Result<()> {
        (**self).cancel()
    }
}

/// Handles a fired wake-up.
///
/// Runs without a live controller: marks the persisted session Stopped at
/// full length and clears the recorded wake-up. Idempotent.
pub fn handle_timer_expired<S: SessionStore + ?Sized>(store: &S) -> store::Result<()> {
    let mut session = store.load()?;

    if session.state == TimerState::Running {
        tracing::info!("Countdown finished in the background");
    }

    session.state = TimerState::Stopped;
    session.scheduled_wakeup_at = None;
    session.seconds_remaining = session.total_length_seconds;
    store.save(&session)
}

// ============================================================================
// Backend selection
// ============================================================================

/// Which OS alarm facility arms the wake-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SchedulerBackend {
    /// launchd on macOS, systemd elsewhere
    #[default]
    Auto,
    Launchd,
    Systemd,
    /// Disable wake-up alarms
    None,
}

impl SchedulerBackend {
    fn resolve(self) -> Self {
        match self {
            SchedulerBackend::Auto if cfg!(target_os = "macos") => SchedulerBackend::Launchd,
            SchedulerBackend::Auto => SchedulerBackend::Systemd,
            other => other,
        }
    }
}

/// Builds the scheduler for `backend`, pointing wake-ups at `store_path`.
pub fn build_scheduler(
    backend: SchedulerBackend,
    store_path: PathBuf,
) -> Result<Box<dyn WakeupScheduler>> {
    let backend = backend.resolve();
    if backend == SchedulerBackend::None {
        return Ok(Box::new(NoopWakeupScheduler));
    }

    let binary_path = std::env::current_exe().map_err(WakeupError::BinaryPathResolution)?;
    let scheduler: Box<dyn WakeupScheduler> = match backend {
        SchedulerBackend::Launchd => {
            Box::new(LaunchdWakeupScheduler::new(binary_path, store_path)?)
        }
        _ => Box::new(SystemdWakeupScheduler::new(binary_path, store_path)),
    };
    Ok(scheduler)
}

// ============================================================================
// NoopWakeupScheduler
// ============================================================================

/// Scheduler that never arms an alarm.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWakeupScheduler;

impl WakeupScheduler for NoopWakeupScheduler {
    fn schedule(&self, fire_at: i64) -> Result<()> {
        tracing::warn!(
            "Wake-up alarms are disabled; epoch {} will be caught up on next launch",
            fire_at
        );
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// MockWakeupScheduler
// ============================================================================

/// Mock scheduler for testing.
#[derive(Debug, Default)]
pub struct MockWakeupScheduler {
    armed: Mutex<Option<i64>>,
    schedule_calls: Mutex<Vec<i64>>,
    cancel_count: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockWakeupScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// The currently armed fire time.
    #[must_use]
    pub fn armed(&self) -> Option<i64> {
        *self.armed.lock().unwrap()
    }

    #[must_use]
    pub fn schedule_calls(&self) -> Vec<i64> {
        self.schedule_calls.lock().unwrap().clone()
    }

    #[must_use]
    pub fn cancel_count(&self) -> usize {
        self.cancel_count.load(Ordering::SeqCst)
    }

    /// Simulates the OS delivering the armed wake-up.
    ///
    /// Returns false when nothing was armed.
    pub fn fire<S: SessionStore + ?Sized>(&self, store: &S) -> store::Result<bool> {
        let fired = self.armed.lock().unwrap().take();
        if fired.is_none() {
            return Ok(false);
        }
        handle_timer_expired(store)?;
        Ok(true)
    }
}

impl WakeupScheduler for MockWakeupScheduler {
    fn schedule(&self, fire_at: i64) -> Result<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(WakeupError::Mock);
        }
        self.schedule_calls.lock().unwrap().push(fire_at);
        *self.armed.lock().unwrap() = Some(fire_at);
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        self.cancel_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(WakeupError::Mock);
        }
        *self.armed.lock().unwrap() = None;
        Ok(())
    }
}
