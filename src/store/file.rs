//! JSON key-value file backing the session store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{Result, StoreError};
use super::SessionStore;
use crate::types::{TimerSession, TimerSettings, TimerState, DEFAULT_TIMER_LENGTH_MINUTES};

/// Store location relative to the home directory.
const DEFAULT_STORE_PATH: &str = ".countdown/session.json";

/// Returns `~/.countdown/session.json`.
pub fn default_store_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(StoreError::HomeDirectoryNotFound)?;
    Ok(home.join(DEFAULT_STORE_PATH))
}

// ============================================================================
// Preferences
// ============================================================================

/// On-disk key-value layout.
///
/// `alarmSetTime` holds the epoch second of the armed wake-up, `0` when none
/// is armed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub timer_state: TimerState,
    pub previous_timer_length_seconds: u32,
    pub seconds_remaining: u32,
    pub alarm_set_time: i64,
    pub timer_length_minutes: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            timer_state: TimerState::Stopped,
            previous_timer_length_seconds: 0,
            seconds_remaining: 0,
            alarm_set_time: 0,
            timer_length_minutes: DEFAULT_TIMER_LENGTH_MINUTES,
        }
    }
}

impl Preferences {
    /// The length setting, with out-of-range values replaced by the default.
    pub fn settings(&self) -> TimerSettings {
        TimerSettings::sanitized(self.timer_length_minutes)
    }

    /// Rebuilds the session held in these preferences.
    pub fn session(&self) -> TimerSession {
        if self.previous_timer_length_seconds == 0 {
            // Nothing saved yet
            return TimerSession::new(self.settings().length_seconds());
        }

        TimerSession {
            state: self.timer_state,
            total_length_seconds: self.previous_timer_length_seconds,
            seconds_remaining: self
                .seconds_remaining
                .min(self.previous_timer_length_seconds),
            scheduled_wakeup_at: (self.alarm_set_time > 0).then_some(self.alarm_set_time),
        }
    }

    /// Overwrites the session keys, leaving the settings untouched.
    pub fn set_session(&mut self, session: &TimerSession) {
        self.timer_state = session.state;
        self.previous_timer_length_seconds = session.total_length_seconds;
        self.seconds_remaining = session.seconds_remaining;
        self.alarm_set_time = session.scheduled_wakeup_at.unwrap_or(0);
    }
}

// ============================================================================
// JsonFileStore
// ============================================================================

/// Session store persisted as a JSON file.
///
/// Every write replaces the file through a rename, so readers observe either
/// the previous snapshot or the new one.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(default_store_path()?))
    }

    /// Returns the store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all keys; a missing file yields the defaults.
    pub fn read_preferences(&self) -> Result<Preferences> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No store at {:?}, using defaults", self.path);
                return Ok(Preferences::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Reads all keys, replacing an unparsable file's contents with the
    /// defaults so the next write repairs it.
    fn read_preferences_or_default(&self) -> Result<Preferences> {
        match self.read_preferences() {
            Err(StoreError::Parse { path, source }) => {
                tracing::warn!("Discarding unreadable store {:?}: {}", path, source);
                Ok(Preferences::default())
            }
            other => other,
        }
    }

    /// Writes all keys.
    pub fn write_preferences(&self, preferences: &Preferences) -> Result<()> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_vec_pretty(preferences).map_err(StoreError::Serialize)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(write_err)?;

        Ok(())
    }

    /// Sets the configured timer length, keeping the saved session.
    pub fn set_timer_length_minutes(&self, minutes: u32) -> Result<()> {
        TimerSettings {
            timer_length_minutes: minutes,
        }
        .validate()
        .map_err(StoreError::InvalidSettings)?;

        let mut preferences = self.read_preferences_or_default()?;
        preferences.timer_length_minutes = minutes;
        self.write_preferences(&preferences)?;

        tracing::info!("Timer length set to {} minutes", minutes);
        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<TimerSession> {
        Ok(self.read_preferences_or_default()?.session())
    }

    fn save(&self, session: &TimerSession) -> Result<()> {
        let mut preferences = self.read_preferences_or_default()?;
        preferences.set_session(session);
        self.write_preferences(&preferences)?;

        tracing::debug!(
            "Saved session: state={}, remaining={}, alarm={}",
            preferences.timer_state,
            preferences.seconds_remaining,
            preferences.alarm_set_time
        );
        Ok(())
    }

    fn timer_length_minutes(&self) -> Result<u32> {
        Ok(self.read_preferences_or_default()?.settings().timer_length_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/session.json"));
        (dir, store)
    }

    mod preferences_tests {
        use super::*;

        #[test]
        fn test_uses_persisted_key_names() {
            let preferences = Preferences {
                timer_state: TimerState::Running,
                previous_timer_length_seconds: 600,
                seconds_remaining: 120,
                alarm_set_time: 1120,
                timer_length_minutes: 10,
            };
            let json = serde_json::to_value(&preferences).unwrap();

            assert_eq!(json["timerState"], "Running");
            assert_eq!(json["previousTimerLengthSeconds"], 600);
            assert_eq!(json["secondsRemaining"], 120);
            assert_eq!(json["alarmSetTime"], 1120);
            assert_eq!(json["timerLengthMinutes"], 10);
        }

        #[test]
        fn test_missing_keys_use_defaults() {
            let preferences: Preferences =
                serde_json::from_str(r#"{"timerLengthMinutes": 25}"#).unwrap();
            assert_eq!(preferences.timer_state, TimerState::Stopped);
            assert_eq!(preferences.alarm_set_time, 0);
            assert_eq!(preferences.timer_length_minutes, 25);
        }

        #[test]
        fn test_session_first_launch_uses_length_setting() {
            let preferences = Preferences {
                timer_length_minutes: 5,
                ..Preferences::default()
            };
            assert_eq!(preferences.session(), TimerSession::new(300));
        }

        #[test]
        fn test_zero_alarm_means_unset() {
            let preferences = Preferences {
                timer_state: TimerState::Paused,
                previous_timer_length_seconds: 600,
                seconds_remaining: 300,
                alarm_set_time: 0,
                timer_length_minutes: 10,
            };
            assert_eq!(preferences.session().scheduled_wakeup_at, None);
        }

        #[test]
        fn test_set_session_keeps_length_setting() {
            let mut preferences = Preferences {
                timer_length_minutes: 42,
                ..Preferences::default()
            };
            let session = TimerSession {
                state: TimerState::Running,
                total_length_seconds: 600,
                seconds_remaining: 10,
                scheduled_wakeup_at: Some(99),
            };

            preferences.set_session(&session);

            assert_eq!(preferences.timer_length_minutes, 42);
            assert_eq!(preferences.alarm_set_time, 99);
            assert_eq!(preferences.session(), session);
        }
    }

    mod json_file_store_tests {
        use super::*;

        #[test]
        fn test_load_without_file_is_first_launch() {
            let (_dir, store) = temp_store();
            let session = store.load().unwrap();

            assert_eq!(session, TimerSession::new(600));
            assert!(!store.path().exists());
        }

        #[test]
        fn test_save_creates_parent_directories() {
            let (_dir, store) = temp_store();
            let session = TimerSession {
                state: TimerState::Paused,
                total_length_seconds: 600,
                seconds_remaining: 321,
                scheduled_wakeup_at: None,
            };

            store.save(&session).unwrap();

            assert!(store.path().exists());
            assert_eq!(store.load().unwrap(), session);
            assert!(!store.path().with_extension("json.tmp").exists());
        }

        #[test]
        fn test_length_setting_survives_session_save() {
            let (_dir, store) = temp_store();
            store.set_timer_length_minutes(25).unwrap();

            store.save(&TimerSession::new(600)).unwrap();

            assert_eq!(store.timer_length_minutes().unwrap(), 25);
        }

        #[test]
        fn test_rejects_out_of_range_length() {
            let (_dir, store) = temp_store();

            let result = store.set_timer_length_minutes(0);

            assert!(matches!(result, Err(StoreError::InvalidSettings(_))));
            assert!(!store.path().exists());
        }

        #[test]
        fn test_corrupt_file_is_parse_error() {
            let (_dir, store) = temp_store();
            fs::create_dir_all(store.path().parent().unwrap()).unwrap();
            fs::write(store.path(), "not json").unwrap();

            let result = store.read_preferences();
            assert!(matches!(result, Err(StoreError::Parse { .. })));
        }

        #[test]
        fn test_corrupt_file_loads_as_first_launch() {
            let (_dir, store) = temp_store();
            fs::create_dir_all(store.path().parent().unwrap()).unwrap();
            fs::write(store.path(), "not json").unwrap();

            assert_eq!(store.load().unwrap(), TimerSession::new(600));
            assert_eq!(store.timer_length_minutes().unwrap(), 10);
        }

        #[test]
        fn test_save_repairs_corrupt_file() {
            let (_dir, store) = temp_store();
            fs::create_dir_all(store.path().parent().unwrap()).unwrap();
            fs::write(store.path(), "{ truncated").unwrap();
            let session = TimerSession {
                state: TimerState::Paused,
                total_length_seconds: 600,
                seconds_remaining: 30,
                scheduled_wakeup_at: None,
            };

            store.save(&session).unwrap();

            assert_eq!(store.read_preferences().unwrap().session(), session);
        }

        #[test]
        fn test_hand_edited_huge_length_uses_default() {
            let (_dir, store) = temp_store();
            fs::create_dir_all(store.path().parent().unwrap()).unwrap();
            fs::write(store.path(), r#"{"timerLengthMinutes": 4294967295}"#).unwrap();

            assert_eq!(store.timer_length_minutes().unwrap(), 10);
            assert_eq!(store.timer_length_seconds().unwrap(), 600);
            assert_eq!(store.load().unwrap(), TimerSession::new(600));
        }
    }
}
