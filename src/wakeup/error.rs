//! Error types for wake-up scheduling.

use std::io;
use thiserror::Error;

/// Wake-up scheduling error type.
#[derive(Debug, Error)]
pub enum WakeupError {
    /// Failed to resolve the countdown binary path.
    #[error("Failed to resolve countdown binary path: {0}")]
    BinaryPathResolution(#[source] io::Error),

    /// Home directory not found.
    #[error("Failed to get home directory")]
    HomeDirectoryNotFound,

    /// The fire time cannot be expressed as a calendar date.
    #[error("Invalid wake-up time: {0}")]
    InvalidFireTime(i64),

    /// Failed to create directory.
    #[error("Failed to create directory: {0}")]
    DirectoryCreation(#[source] io::Error),

    /// Failed to write plist file.
    #[error("Failed to write plist file: {0}")]
    PlistWrite(#[source] io::Error),

    /// Failed to remove plist file.
    #[error("Failed to remove plist file: {0}")]
    PlistRemove(#[source] io::Error),

    /// Failed to serialize plist.
    #[error("Failed to serialize plist: {0}")]
    PlistSerialize(#[source] plist::Error),

    /// Failed to convert plist to UTF-8 string.
    #[error("Failed to convert plist to UTF-8: {0}")]
    PlistUtf8(#[source] std::string::FromUtf8Error),

    /// Failed to execute a scheduler command.
    #[error("Failed to execute {command}: {message}")]
    CommandExecution {
        command: &'static str,
        message: String,
    },

    /// The OS scheduler rejected the wake-up.
    #[error("Failed to arm wake-up: {0}")]
    Arm(String),

    /// The OS scheduler failed to disarm the wake-up.
    #[error("Failed to disarm wake-up: {0}")]
    Disarm(String),

    /// Simulated failure from the mock scheduler.
    #[error("Mock scheduler failure")]
    Mock,
}

/// Result type for wake-up scheduling operations.
pub type Result<T> = std::result::Result<T, WakeupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_command_execution() {
        let err = WakeupError::CommandExecution {
            command: "launchctl",
            message: "not found".to_string(),
        };
        assert!(err.to_string().contains("launchctl"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_error_display_arm() {
        let err = WakeupError::Arm("unit exists".to_string());
        assert!(err.to_string().contains("arm"));
        assert!(err.to_string().contains("unit exists"));
    }

    #[test]
    fn test_error_display_invalid_fire_time() {
        let err = WakeupError::InvalidFireTime(-1);
        assert!(err.to_string().contains("-1"));
    }
}
