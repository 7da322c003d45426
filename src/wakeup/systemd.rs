//! systemd-backed wake-up scheduler (Linux).
//!
//! Arms a transient user timer with `systemd-run`. Calendar timers follow the
//! realtime clock, so a trigger that passed during suspend fires on resume.

use std::path::PathBuf;
use std::process::{Command, Output};

use chrono::DateTime;

use super::error::{Result, WakeupError};
use super::WakeupScheduler;

/// Transient unit name shared by the timer and its service.
pub const UNIT_NAME: &str = "countdown-wakeup";

#[derive(Debug, Clone)]
pub struct SystemdWakeupScheduler {
    binary_path: PathBuf,
    store_path: PathBuf,
}

impl SystemdWakeupScheduler {
    pub fn new(binary_path: PathBuf, store_path: PathBuf) -> Self {
        Self {
            binary_path,
            store_path,
        }
    }

    /// Formats `fire_at` as a systemd calendar event in UTC.
    pub fn on_calendar(fire_at: i64) -> Result<String> {
        let time =
            DateTime::from_timestamp(fire_at, 0).ok_or(WakeupError::InvalidFireTime(fire_at))?;
        Ok(time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    }

    /// Arguments passed to `systemd-run`.
    pub fn run_args(&self, fire_at: i64) -> Result<Vec<String>> {
        Ok(vec![
            "--user".to_string(),
            format!("--unit={}", UNIT_NAME),
            format!("--on-calendar={}", Self::on_calendar(fire_at)?),
            "--timer-property=AccuracySec=1s".to_string(),
            "--collect".to_string(),
            "--".to_string(),
            self.binary_path.to_string_lossy().to_string(),
            "--store".to_string(),
            self.store_path.to_string_lossy().to_string(),
            "expire".to_string(),
        ])
    }

    fn stop_timer(&self) -> Result<Output> {
        Command::new("systemctl")
            .args(["--user", "stop", &format!("{}.timer", UNIT_NAME)])
            .output()
            .map_err(|e| WakeupError::CommandExecution {
                command: "systemctl",
                message: e.to_string(),
            })
    }
}

impl WakeupScheduler for SystemdWakeupScheduler {
    fn schedule(&self, fire_at: i64) -> Result<()> {
        let args = self.run_args(fire_at)?;

        // Replace, never stack
        let _ = self.stop_timer();

        let output = Command::new("systemd-run")
            .args(&args)
            .output()
            .map_err(|e| WakeupError::CommandExecution {
                command: "systemd-run",
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WakeupError::Arm(stderr.to_string()));
        }

        tracing::info!("Wake-up timer armed for epoch {}", fire_at);
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        let output = self.stop_timer()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_not_loaded(&stderr) {
                tracing::debug!("No wake-up timer loaded, nothing to cancel");
                return Ok(());
            }
            return Err(WakeupError::Disarm(stderr.to_string()));
        }

        tracing::info!("Wake-up timer stopped");
        Ok(())
    }
}

/// True when `systemctl stop` failed only because no timer was armed.
fn is_not_loaded(stderr: &str) -> bool {
    stderr.contains("not loaded")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_calendar_is_utc_timestamp() {
        // 2026-10-19 09:30:05 UTC
        let calendar = SystemdWakeupScheduler::on_calendar(1_792_402_205).unwrap();
        assert_eq!(calendar, "2026-10-19 09:30:05 UTC");
    }

    #[test]
    fn test_on_calendar_rejects_out_of_range() {
        assert!(SystemdWakeupScheduler::on_calendar(i64::MAX).is_err());
    }

    #[test]
    fn test_run_args_invoke_expire() {
        let scheduler = SystemdWakeupScheduler::new(
            PathBuf::from("/usr/bin/countdown"),
            PathBuf::from("/home/me/.countdown/session.json"),
        );

        let args = scheduler.run_args(0).unwrap();

        assert_eq!(args[0], "--user");
        assert_eq!(args[1], "--unit=countdown-wakeup");
        assert_eq!(args[2], "--on-calendar=1970-01-01 00:00:00 UTC");
        let command_start = args.iter().position(|a| a == "--").unwrap();
        assert_eq!(
            &args[command_start + 1..],
            &[
                "/usr/bin/countdown",
                "--store",
                "/home/me/.countdown/session.json",
                "expire"
            ]
        );
    }

    #[test]
    fn test_missing_timer_is_not_loaded() {
        let stderr = "Failed to stop countdown-wakeup.timer: \
                      Unit countdown-wakeup.timer not loaded.\n";
        assert!(is_not_loaded(stderr));
    }

    #[test]
    fn test_other_stop_failures_are_errors() {
        assert!(!is_not_loaded("Failed to connect to bus: No medium found\n"));
        assert!(!is_not_loaded(""));
    }
}
