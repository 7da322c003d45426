//! Display utilities for the countdown CLI.
//!
//! This module provides formatted output for:
//! - Transition results and status
//! - The live countdown line of `watch`
//! - Error messages

use std::io::{self, Write};

use crate::controller::TimerEvent;
use crate::types::{format_countdown, ButtonStates, TimerSession, TimerState};

/// Width of the status progress bar in cells.
const PROGRESS_BAR_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows a success message for start or resume.
    pub fn show_start_success(session: &TimerSession) {
        println!("> Countdown running");
        println!("  Remaining: {}", session.countdown_text());
    }

    /// Shows a success message for pause.
    pub fn show_pause_success(session: &TimerSession) {
        println!("|| Countdown paused");
        println!("  Remaining: {}", session.countdown_text());
    }

    /// Shows a success message for stop.
    pub fn show_stop_success(session: &TimerSession) {
        println!("[] Countdown stopped");
        println!("  Reset to: {}", session.countdown_text());
    }

    /// Shows the current countdown.
    pub fn show_status(session: &TimerSession) {
        println!("Countdown status");
        println!("─────────────────────────────");
        println!("State: {}", session.state);
        println!("Remaining: {}", session.countdown_text());
        println!(
            "Progress: {} {}/{}",
            Self::progress_bar(session.progress(), session.total_length_seconds),
            format_countdown(session.progress()),
            format_countdown(session.total_length_seconds)
        );
        println!("Controls: {}", Self::format_buttons(session.buttons()));
    }

    /// Shows the configured timer length.
    pub fn show_config(minutes: u32) {
        println!("Timer length: {} minutes", minutes);
        println!("  Applies from the next stopped cycle");
    }

    /// Shows why `watch` has nothing to count.
    pub fn show_not_running(state: TimerState) {
        match state {
            TimerState::Paused => println!("Countdown is paused; run `countdown start` to resume"),
            _ => println!("Countdown is not running; run `countdown start` first"),
        }
    }

    /// Shows that `watch` was interrupted while the countdown continues.
    pub fn show_watch_detached(session: &TimerSession) {
        println!();
        println!("Countdown continues in the background ({} left)", session.countdown_text());
    }

    /// Renders one controller event for `watch`.
    pub fn show_event(event: &TimerEvent) {
        match event {
            TimerEvent::CountdownChanged(text) => {
                print!("\r  {:>6}", text);
                let _ = io::stdout().flush();
            }
            TimerEvent::Finished => {
                println!();
                println!("* Countdown finished");
            }
            TimerEvent::ButtonsChanged(_) | TimerEvent::ProgressChanged { .. } => {}
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Renders `value` out of `max` as a fixed-width bar.
    fn progress_bar(value: u32, max: u32) -> String {
        let filled = if max == 0 {
            0
        } else {
            (value.min(max) as usize * PROGRESS_BAR_WIDTH) / max as usize
        };
        format!(
            "[{}{}]",
            "#".repeat(filled),
            "-".repeat(PROGRESS_BAR_WIDTH - filled)
        )
    }

    /// Lists the controls that are currently enabled.
    fn format_buttons(buttons: ButtonStates) -> String {
        let enabled: Vec<&str> = [
            ("start", buttons.start),
            ("pause", buttons.pause),
            ("stop", buttons.stop),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect();
        enabled.join(", ")
    }
}

// ============================================================================
// Tests
// ============================================================================
