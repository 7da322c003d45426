//! Timer controller for the countdown.
//!
//! This module provides the countdown state machine:
//! - State transitions (Stopped → Running ⇄ Paused → Stopped)
//! - One-second ticks driven by an external event loop
//! - UI updates published as [`TimerEvent`]s
//! - Background hand-off to a wake-up alarm and recovery on resume

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::error::{ControllerError, Result};
use crate::store::SessionStore;
use crate::types::{ButtonStates, TimerSession, TimerState};
use crate::wakeup::WakeupScheduler;

// ============================================================================
// TimerEvent
// ============================================================================

/// UI updates published by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Start/pause/stop enablement changed
    ButtonsChanged(ButtonStates),
    /// Progress bar position
    ProgressChanged {
        /// Seconds counted down
        value: u32,
        /// Length of the cycle
        max: u32,
    },
    /// Countdown text in `M:SS`
    CountdownChanged(String),
    /// The countdown was reset to Stopped
    Finished,
}

// ============================================================================
// TimerController
// ============================================================================

/// Countdown state machine backed by a session store and a wake-up scheduler.
pub struct TimerController<S, W> {
    /// In-memory session
    session: TimerSession,
    /// Whether ticks currently count down
    ticking: bool,
    store: S,
    scheduler: W,
    /// UI event sender
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl<S: SessionStore, W: WakeupScheduler> TimerController<S, W> {
    /// Creates a controller holding a fresh stopped session.
    ///
    /// Call [`enter_foreground`](Self::enter_foreground) to restore the
    /// persisted session.
    pub fn new(
        store: S,
        scheduler: W,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Result<Self> {
        let length = store.timer_length_seconds()?;
        Ok(Self {
            session: TimerSession::new(length),
            ticking: false,
            store,
            scheduler,
            event_tx,
        })
    }

    /// Starts or resumes the countdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer is already running.
    pub fn start(&mut self) -> Result<()> {
        let previous = self.session.state;
        if !previous.can_start() {
            return Err(ControllerError::InvalidTransition {
                operation: "start",
                state: previous,
            });
        }

        self.session.state = TimerState::Running;
        self.ticking = true;
        info!(
            "Timer started from {} with {}s remaining",
            previous, self.session.seconds_remaining
        );

        self.publish_all();
        self.persist()
    }

    /// Pauses the countdown, freezing the remaining time.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer is not running.
    pub fn pause(&mut self) -> Result<()> {
        if self.session.state != TimerState::Running {
            return Err(ControllerError::InvalidTransition {
                operation: "pause",
                state: self.session.state,
            });
        }

        self.ticking = false;
        self.session.state = TimerState::Paused;
        if self.session.scheduled_wakeup_at.take().is_some() {
            self.cancel_wakeup();
        }
        info!("Timer paused at {}s", self.session.seconds_remaining);

        self.publish(TimerEvent::ButtonsChanged(self.session.buttons()));
        self.persist()
    }

    /// Stops the countdown from any state.
    pub fn stop(&mut self) -> Result<()> {
        self.ticking = false;
        self.cancel_wakeup();
        self.session.scheduled_wakeup_at = None;
        info!("Timer stopped");
        self.finish()
    }

    /// Resets to a stopped, full-length session using the configured length.
    pub fn finish(&mut self) -> Result<()> {
        let length = self.store.timer_length_seconds()?;

        if self.session.scheduled_wakeup_at.is_some() {
            self.cancel_wakeup();
        }
        self.ticking = false;
        self.session = TimerSession::new(length);
        debug!("Timer reset to {}s", length);

        self.publish(TimerEvent::Finished);
        self.publish_all();
        self.persist()
    }

    /// Handles one tick of the one-second event loop.
    ///
    /// Ignored unless the timer is running in the foreground.
    pub fn on_tick(&mut self) -> Result<()> {
        if !self.ticking || self.session.state != TimerState::Running {
            return Ok(());
        }

        self.session.seconds_remaining = self.session.seconds_remaining.saturating_sub(1);
        debug!("Tick: {}s remaining", self.session.seconds_remaining);

        if self.session.seconds_remaining == 0 {
            info!("Countdown finished");
            return self.finish();
        }

        self.publish_progress();
        self.publish(TimerEvent::CountdownChanged(self.session.countdown_text()));
        Ok(())
    }

    /// Anchors a ticking countdown to the wall clock.
    ///
    /// Arms the wake-up at `now + seconds_remaining` and persists it while
    /// ticks keep counting, so a process killed before
    /// [`enter_background`](Self::enter_background) still leaves a snapshot
    /// the next resume can correct and an alarm that completes it.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails or the wake-up cannot be armed.
    pub fn anchor(&mut self, now: i64) -> Result<()> {
        if !self.ticking || self.session.scheduled_wakeup_at.is_some() {
            return Ok(());
        }

        let wakeup_at = self.arm(now)?;
        info!("Foreground countdown anchored, wake-up at {}", wakeup_at);
        Ok(())
    }

    /// Re-derives the remaining time of an anchored countdown from the wall
    /// clock and persists it.
    ///
    /// Catches up on ticks lost while the machine was suspended. Finishes the
    /// countdown once the anchor has passed.
    pub fn checkpoint(&mut self, now: i64) -> Result<()> {
        if !self.ticking || self.session.scheduled_wakeup_at.is_none() {
            return Ok(());
        }

        self.sync_to_anchor(now);
        if self.session.seconds_remaining == 0 {
            info!("Countdown finished while the foreground was stalled");
            return self.finish();
        }

        debug!("Checkpoint: {}s remaining", self.session.seconds_remaining);
        self.publish_progress();
        self.publish(TimerEvent::CountdownChanged(self.session.countdown_text()));
        self.persist()
    }

    /// Hands the countdown to the wake-up scheduler and persists the session.
    ///
    /// A running timer stops ticking and arms a wake-up at
    /// `now + seconds_remaining`. The snapshot is always written, even when
    /// arming fails.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails or the wake-up cannot be armed.
    pub fn enter_background(&mut self, now: i64) -> Result<()> {
        if self.session.state != TimerState::Running {
            return self.persist();
        }

        if self.session.scheduled_wakeup_at.is_some() {
            // Already armed, either anchored in the foreground or backgrounded
            if self.ticking {
                self.ticking = false;
                self.sync_to_anchor(now);
            }
            return self.persist();
        }

        self.ticking = false;
        let wakeup_at = self.arm(now)?;

        info!(
            "Backgrounded with {}s remaining, wake-up at {}",
            self.session.seconds_remaining, wakeup_at
        );
        Ok(())
    }

    /// Restores the persisted session and catches up on time spent away.
    ///
    /// Cancels any pending wake-up. A running or paused session recorded
    /// with a wake-up loses the wall-clock time elapsed since it was
    /// backgrounded; if nothing remains the timer finishes.
    pub fn enter_foreground(&mut self, now: i64) -> Result<()> {
        let loaded = self.store.load()?;
        self.cancel_wakeup();
        self.ticking = false;

        if loaded.state == TimerState::Stopped {
            let length = self.store.timer_length_seconds()?;
            self.session = TimerSession::new(length);
            self.publish_all();
            return self.persist();
        }

        let backgrounded_at = loaded.backgrounded_at();
        self.session = TimerSession {
            scheduled_wakeup_at: None,
            ..loaded
        };

        let mut remaining = i64::from(self.session.seconds_remaining);
        if let Some(backgrounded_at) = backgrounded_at {
            // A clock set backwards never adds time
            let elapsed = (now - backgrounded_at).max(0);
            remaining -= elapsed;
            debug!("Away for {}s, {}s remaining", elapsed, remaining.max(0));
        }

        if remaining <= 0 {
            info!("Countdown finished while in the background");
            return self.finish();
        }

        self.session.seconds_remaining =
            u32::try_from(remaining).unwrap_or(self.session.seconds_remaining);
        if self.session.state == TimerState::Running {
            self.ticking = true;
        }

        self.publish_all();
        self.persist()
    }

    /// Returns the in-memory session.
    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    /// Returns the current state.
    pub fn state(&self) -> TimerState {
        self.session.state
    }

    /// Returns true while foreground ticks count down.
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &W {
        &self.scheduler
    }

    /// Arms the wake-up at `now + seconds_remaining` and persists it.
    ///
    /// The snapshot is written even when arming fails.
    fn arm(&mut self, now: i64) -> Result<i64> {
        let wakeup_at = now + i64::from(self.session.seconds_remaining);
        self.session.scheduled_wakeup_at = Some(wakeup_at);

        let armed = self.scheduler.schedule(wakeup_at);
        self.persist()?;
        armed?;
        Ok(wakeup_at)
    }

    /// Sets the remaining time to what is left until the armed wake-up.
    fn sync_to_anchor(&mut self, now: i64) {
        if let Some(wakeup_at) = self.session.scheduled_wakeup_at {
            let left = (wakeup_at - now).clamp(0, i64::from(self.session.total_length_seconds));
            self.session.seconds_remaining =
                u32::try_from(left).unwrap_or(self.session.seconds_remaining);
        }
    }

    fn cancel_wakeup(&self) {
        if let Err(e) = self.scheduler.cancel() {
            warn!("Failed to cancel wake-up: {}", e);
        }
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.session)?;
        Ok(())
    }

    fn publish(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("Timer event dropped, no listener");
        }
    }

    fn publish_progress(&self) {
        self.publish(TimerEvent::ProgressChanged {
            value: self.session.progress(),
            max: self.session.total_length_seconds,
        });
    }

    fn publish_all(&self) {
        self.publish(TimerEvent::ButtonsChanged(self.session.buttons()));
        self.publish_progress();
        self.publish(TimerEvent::CountdownChanged(self.session.countdown_text()));
    }

    /// Returns a mutable reference to the session (for testing).
    #[cfg(test)]
    pub fn session_mut(&mut self) -> &mut TimerSession {
        &mut self.session
    }
}

// ============================================================================
// Tests
// ============================================================================
