//! Command definitions for the countdown CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::wakeup::SchedulerBackend;

// ============================================================================
// CLI Structure
// ============================================================================

/// Countdown timer that keeps counting while nothing is running
#[derive(Parser, Debug)]
#[command(
    name = "countdown",
    version,
    about = "Countdown timer that survives process exit",
    long_about = "A single countdown timer with start, pause and stop.\n\
                  The session is persisted between invocations and a system alarm \
                  resets it when time runs out while no process is running.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Session store file [default: ~/.countdown/session.json]
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Backend used to arm the expiry alarm
    #[arg(long, global = true, value_enum, default_value_t = SchedulerBackend::Auto)]
    pub wakeup: SchedulerBackend,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start or resume the countdown
    Start,

    /// Pause the running countdown
    Pause,

    /// Stop the countdown and reset it
    Stop,

    /// Show the current countdown
    Status,

    /// Count down in the terminal until finished or interrupted
    Watch,

    /// Show or change the timer length
    Config(ConfigArgs),

    /// Reset an expired countdown (invoked by the wake-up alarm)
    #[command(hide = true)]
    Expire,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Config Command Arguments
// ============================================================================

/// Arguments for the config command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Timer length in minutes (1-120), applied on the next cycle
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    pub length: Option<u32>,
}

// ============================================================================
// Tests
// ============================================================================
