//! Core data types for the countdown timer.
//!
//! This module defines the data structures used for:
//! - Timer state and the persisted timer session
//! - Button enablement derived from the timer state
//! - The configured timer length
//! - Countdown text formatting

use serde::{Deserialize, Serialize};

// ============================================================================
// TimerState
// ============================================================================

/// Represents the current state of the countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerState {
    /// Timer is idle at full length
    #[default]
    Stopped,
    /// Timer is frozen with time remaining
    Paused,
    /// Timer is counting down
    Running,
}

impl TimerState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Stopped => "Stopped",
            TimerState::Paused => "Paused",
            TimerState::Running => "Running",
        }
    }

    /// Returns true if `start()` is a valid transition from this state.
    pub fn can_start(&self) -> bool {
        matches!(self, TimerState::Stopped | TimerState::Paused)
    }
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimerSettings
// ============================================================================

/// Default timer length in minutes when nothing has been configured.
pub const DEFAULT_TIMER_LENGTH_MINUTES: u32 = 10;

/// User-configured timer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    /// Countdown length in minutes (1-120)
    pub timer_length_minutes: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            timer_length_minutes: DEFAULT_TIMER_LENGTH_MINUTES,
        }
    }
}

impl TimerSettings {
    /// Builds settings from a stored length, falling back to the default
    /// when the value is out of range.
    pub fn sanitized(timer_length_minutes: u32) -> Self {
        let settings = Self {
            timer_length_minutes,
        };
        match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                tracing::warn!("Ignoring stored timer length {}: {}", timer_length_minutes, e);
                Self::default()
            }
        }
    }

    /// Returns the configured length in seconds.
    pub fn length_seconds(&self) -> u32 {
        self.timer_length_minutes.saturating_mul(60)
    }

    /// Validates the settings.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.timer_length_minutes < 1 || self.timer_length_minutes > 120 {
            return Err("timer length must be between 1 and 120 minutes".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// TimerSession
// ============================================================================

/// The complete timer snapshot, persisted and restored as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSession {
    /// Current state
    pub state: TimerState,
    /// Length of the current cycle in seconds
    pub total_length_seconds: u32,
    /// Seconds left in the current cycle
    pub seconds_remaining: u32,
    /// Epoch seconds of the armed background wake-up, if any
    pub scheduled_wakeup_at: Option<i64>,
}

impl TimerSession {
    /// Creates a stopped, full-length session.
    pub fn new(total_length_seconds: u32) -> Self {
        Self {
            state: TimerState::Stopped,
            total_length_seconds,
            seconds_remaining: total_length_seconds,
            scheduled_wakeup_at: None,
        }
    }

    /// Seconds counted down so far; the value shown on the progress bar.
    pub fn progress(&self) -> u32 {
        self.total_length_seconds.saturating_sub(self.seconds_remaining)
    }

    /// The `M:SS` countdown text for the remaining time.
    pub fn countdown_text(&self) -> String {
        format_countdown(self.seconds_remaining)
    }

    /// Epoch seconds at which the session was backgrounded.
    ///
    /// The wake-up is armed at `backgrounded_at + seconds_remaining` and the
    /// remaining time is frozen while in the background, so the difference
    /// recovers the backgrounding instant.
    pub fn backgrounded_at(&self) -> Option<i64> {
        self.scheduled_wakeup_at
            .map(|wakeup_at| wakeup_at - i64::from(self.seconds_remaining))
    }

    /// Returns the button enablement for the current state.
    pub fn buttons(&self) -> ButtonStates {
        ButtonStates::for_state(self.state)
    }
}

// ============================================================================
// ButtonStates
// ============================================================================

/// Enabled state of the start/pause/stop controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonStates {
    pub start: bool,
    pub pause: bool,
    pub stop: bool,
}

impl ButtonStates {
    /// Derives button enablement from the timer state.
    pub fn for_state(state: TimerState) -> Self {
        match state {
            TimerState::Running => Self {
                start: false,
                pause: true,
                stop: true,
            },
            TimerState::Stopped => Self {
                start: true,
                pause: false,
                stop: false,
            },
            TimerState::Paused => Self {
                start: true,
                pause: false,
                stop: true,
            },
        }
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Formats seconds as `M:SS`: unpadded minutes, two-digit seconds.
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

// ============================================================================
// Tests
// ============================================================================
