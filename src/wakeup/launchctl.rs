//! Thin wrapper over `launchctl load`/`unload` for the wake-up agent.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use super::error::{Result, WakeupError};

/// Runs `launchctl <subcommand> <plist_path>`, mapping an unsuccessful exit
/// to `on_failure(stderr)`.
fn launchctl(
    subcommand: &str,
    plist_path: &Path,
    on_failure: fn(String) -> WakeupError,
) -> Result<()> {
    let output = Command::new("launchctl")
        .args([OsStr::new(subcommand), plist_path.as_os_str()])
        .output()
        .map_err(|e| WakeupError::CommandExecution {
            command: "launchctl",
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(on_failure(stderr.trim().to_string()));
    }

    tracing::debug!("launchctl {} succeeded for {:?}", subcommand, plist_path);
    Ok(())
}

/// Registers the agent so launchd fires it at its calendar interval.
pub fn load(plist_path: &Path) -> Result<()> {
    launchctl("load", plist_path, WakeupError::Arm)
}

/// Deregisters the agent.
///
/// Fails when the agent is not loaded; callers that only want a clean slate
/// ignore the error.
pub fn unload(plist_path: &Path) -> Result<()> {
    launchctl("unload", plist_path, WakeupError::Disarm)
}
