//! Plist structure definition and generation logic for the wake-up agent.

use chrono::{DateTime, Datelike, Local, TimeDelta, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use super::error::{Result, WakeupError};

/// A launchd calendar trigger.
///
/// launchd matches calendar intervals at minute resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarInterval {
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Hour")]
    pub hour: u32,
    #[serde(rename = "Minute")]
    pub minute: u32,
}

impl CalendarInterval {
    /// Returns the first whole local minute at or after `fire_at`.
    pub fn at_or_after(fire_at: i64) -> Result<Self> {
        let utc =
            DateTime::from_timestamp(fire_at, 0).ok_or(WakeupError::InvalidFireTime(fire_at))?;
        Ok(Self::rounded_up(utc.with_timezone(&Local)))
    }

    /// Rounds `time` up to the next whole minute in its own time zone.
    pub fn rounded_up<Tz: TimeZone>(time: DateTime<Tz>) -> Self {
        let seconds = time.second();
        let time = if seconds > 0 {
            time + TimeDelta::seconds(i64::from(60 - seconds))
        } else {
            time
        };

        Self {
            month: time.month(),
            day: time.day(),
            hour: time.hour(),
            minute: time.minute(),
        }
    }
}

/// launchd agent that runs `countdown expire` once the timer runs out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WakeupAgent {
    /// Service label (reverse domain format)
    #[serde(rename = "Label")]
    pub label: String,

    /// Program to execute with its arguments
    #[serde(rename = "ProgramArguments")]
    pub program_arguments: Vec<String>,

    /// When launchd should start the program
    #[serde(rename = "StartCalendarInterval")]
    pub start_calendar_interval: CalendarInterval,

    /// Never start on load; only on the calendar trigger
    #[serde(rename = "RunAtLoad")]
    pub run_at_load: bool,

    /// Path to stdout log file
    #[serde(rename = "StandardOutPath", skip_serializing_if = "Option::is_none")]
    pub standard_out_path: Option<String>,

    /// Path to stderr log file
    #[serde(rename = "StandardErrorPath", skip_serializing_if = "Option::is_none")]
    pub standard_error_path: Option<String>,
}

impl WakeupAgent {
    /// The service label for the countdown wake-up agent.
    pub const LABEL: &'static str = "com.example.countdown.wakeup";

    /// Creates a wake-up agent configuration.
    ///
    /// # Arguments
    /// * `binary_path` - Absolute path to the countdown binary
    /// * `store_path` - Session store the expired handler should update
    /// * `interval` - Calendar trigger
    pub fn new(
        binary_path: impl Into<String>,
        store_path: impl Into<String>,
        interval: CalendarInterval,
    ) -> Self {
        Self {
            label: Self::LABEL.to_string(),
            program_arguments: vec![
                binary_path.into(),
                "--store".to_string(),
                store_path.into(),
                "expire".to_string(),
            ],
            start_calendar_interval: interval,
            run_at_load: false,
            standard_out_path: None,
            standard_error_path: None,
        }
    }

    /// Redirects stdout/stderr into `log_dir`.
    pub fn with_log_dir(mut self, log_dir: impl AsRef<str>) -> Self {
        let log_dir = log_dir.as_ref();
        self.standard_out_path = Some(format!("{}/wakeup.out.log", log_dir));
        self.standard_error_path = Some(format!("{}/wakeup.err.log", log_dir));
        self
    }

    /// Generates the plist XML string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_xml(&self) -> Result<String> {
        let mut buf = Vec::new();
        plist::to_writer_xml(&mut buf, self).map_err(WakeupError::PlistSerialize)?;
        String::from_utf8(buf).map_err(WakeupError::PlistUtf8)
    }
}
