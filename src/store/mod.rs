//! Session persistence for the countdown timer.
//!
//! The timer snapshot and the configured timer length live in a key-value
//! store. The controller and the wake-up handler both reach it through the
//! [`SessionStore`] port, so neither depends on where the data is kept.

pub mod error;
pub mod file;

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

pub use error::{Result, StoreError};
pub use file::{default_store_path, JsonFileStore, Preferences};

use crate::types::{TimerSession, TimerSettings, DEFAULT_TIMER_LENGTH_MINUTES};

/// Persistence port for the timer snapshot.
pub trait SessionStore {
    /// Loads the persisted snapshot.
    ///
    /// On first launch, returns a stopped full-length session.
    fn load(&self) -> Result<TimerSession>;

    /// Persists a complete snapshot, replacing the previous one.
    fn save(&self, session: &TimerSession) -> Result<()>;

    /// Returns the configured timer length in minutes.
    fn timer_length_minutes(&self) -> Result<u32>;

    /// Returns the configured timer length in seconds.
    fn timer_length_seconds(&self) -> Result<u32> {
        Ok(TimerSettings::sanitized(self.timer_length_minutes()?).length_seconds())
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Box<T> {
    fn load(&self) -> Result<TimerSession> {
        (**self).load()
    }

    fn save(&self, session: &TimerSession) -> Result<()> {
        (**self).save(session)
    }

    fn timer_length_minutes(&self) -> Result<u32> {
        (**self).timer_length_minutes()
    }

    fn timer_length_seconds(&self) -> Result<u32> {
        (**self).timer_length_seconds()
    }
}

/// In-memory store for testing.
#[derive(Debug)]
pub struct MemoryStore {
    session: Mutex<Option<TimerSession>>,
    timer_length_minutes: AtomicU32,
    save_count: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_length_minutes(DEFAULT_TIMER_LENGTH_MINUTES)
    }

    #[must_use]
    pub fn with_length_minutes(minutes: u32) -> Self {
        Self {
            session: Mutex::new(None),
            timer_length_minutes: AtomicU32::new(minutes),
            save_count: AtomicUsize::new(0),
        }
    }

    pub fn set_timer_length_minutes(&self, minutes: u32) {
        self.timer_length_minutes.store(minutes, Ordering::SeqCst);
    }

    /// Returns the last saved snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<TimerSession> {
        self.session.lock().ok().and_then(|s| s.clone())
    }

    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<TimerSession> {
        let stored = self
            .session
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .clone();
        match stored {
            Some(session) => Ok(session),
            None => Ok(TimerSession::new(self.timer_length_seconds()?)),
        }
    }

    fn save(&self, session: &TimerSession) -> Result<()> {
        *self.session.lock().map_err(|_| StoreError::Poisoned)? = Some(session.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn timer_length_minutes(&self) -> Result<u32> {
        Ok(self.timer_length_minutes.load(Ordering::SeqCst))
    }
}
