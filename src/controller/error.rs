//! Error types for the timer controller.

use thiserror::Error;

use crate::store::StoreError;
use crate::types::TimerState;
use crate::wakeup::WakeupError;

/// Timer controller error type.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The operation is not valid in the current state.
    #[error("Cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: TimerState,
    },

    /// Persisting or loading the session failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Arming the background wake-up failed.
    #[error(transparent)]
    Wakeup(#[from] WakeupError),
}

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let err = ControllerError::InvalidTransition {
            operation: "pause",
            state: TimerState::Stopped,
        };
        assert_eq!(err.to_string(), "Cannot pause while Stopped");
    }

    #[test]
    fn test_from_store_error() {
        let err: ControllerError = StoreError::HomeDirectoryNotFound.into();
        assert!(matches!(err, ControllerError::Store(_)));
        assert!(err.to_string().contains("home directory"));
    }
}
