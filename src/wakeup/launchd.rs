//! launchd-backed wake-up scheduler (macOS).

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{Result, WakeupError};
use super::plist::{CalendarInterval, WakeupAgent};
use super::{launchctl, WakeupScheduler};

/// Arms the wake-up as a LaunchAgent with a calendar trigger.
///
/// launchd starts the agent even when no countdown process is alive, and
/// catches up on a missed calendar trigger after the machine wakes.
#[derive(Debug, Clone)]
pub struct LaunchdWakeupScheduler {
    binary_path: PathBuf,
    store_path: PathBuf,
    plist_path: PathBuf,
    log_dir: PathBuf,
}

impl LaunchdWakeupScheduler {
    /// Creates a scheduler writing to `~/Library/LaunchAgents`.
    pub fn new(binary_path: PathBuf, store_path: PathBuf) -> Result<Self> {
        let home_dir = dirs::home_dir().ok_or(WakeupError::HomeDirectoryNotFound)?;
        let plist_path =
            home_dir.join(format!("Library/LaunchAgents/{}.plist", WakeupAgent::LABEL));
        Ok(Self::with_paths(
            binary_path,
            store_path,
            plist_path,
            home_dir.join(".countdown/logs"),
        ))
    }

    /// Creates a scheduler with explicit agent and log locations.
    pub fn with_paths(
        binary_path: PathBuf,
        store_path: PathBuf,
        plist_path: PathBuf,
        log_dir: PathBuf,
    ) -> Self {
        Self {
            binary_path,
            store_path,
            plist_path,
            log_dir,
        }
    }

    /// Returns the agent plist path.
    pub fn plist_path(&self) -> &Path {
        &self.plist_path
    }

    /// Builds the agent for a fire time.
    pub fn agent(&self, fire_at: i64) -> Result<WakeupAgent> {
        let interval = CalendarInterval::at_or_after(fire_at)?;
        Ok(WakeupAgent::new(
            self.binary_path.to_string_lossy(),
            self.store_path.to_string_lossy(),
            interval,
        )
        .with_log_dir(self.log_dir.to_string_lossy()))
    }

    /// Writes the agent plist for `fire_at`, overwriting any previous one.
    pub fn write_agent(&self, fire_at: i64) -> Result<()> {
        let plist_xml = self.agent(fire_at)?.to_xml()?;

        fs::create_dir_all(&self.log_dir).map_err(WakeupError::DirectoryCreation)?;
        if let Some(parent) = self.plist_path.parent() {
            fs::create_dir_all(parent).map_err(WakeupError::DirectoryCreation)?;
        }
        fs::write(&self.plist_path, plist_xml).map_err(WakeupError::PlistWrite)
    }
}

impl WakeupScheduler for LaunchdWakeupScheduler {
    fn schedule(&self, fire_at: i64) -> Result<()> {
        // Replace, never stack
        let _ = launchctl::unload(&self.plist_path);
        self.write_agent(fire_at)?;
        launchctl::load(&self.plist_path)?;

        tracing::info!("Wake-up agent armed for epoch {}", fire_at);
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        if !self.plist_path.exists() {
            tracing::debug!("No wake-up agent installed, nothing to cancel");
            return Ok(());
        }

        let _ = launchctl::unload(&self.plist_path);
        fs::remove_file(&self.plist_path).map_err(WakeupError::PlistRemove)?;

        tracing::info!("Wake-up agent removed");
        Ok(())
    }
}
