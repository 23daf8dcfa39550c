//! Feedback types

use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::Duration;

/// How long a single tone sounds
pub const TONE_DURATION: Duration = Duration::from_millis(100);

/// How long the input field stays highlighted after a good scan
pub const PULSE_DURATION: Duration = Duration::from_millis(400);

/// Outcome class, encoded as tone frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Validation failure or nothing to undo
    Error,
    /// Undo completed or client finished
    Confirm,
    /// Scan accepted
    Success,
}

impl Tone {
    pub fn frequency_hz(&self) -> u32 {
        match self {
            Tone::Error => 300,
            Tone::Confirm => 600,
            Tone::Success => 1000,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Error => "error",
            Tone::Confirm => "confirm",
            Tone::Success => "success",
        }
    }
}

/// Operator log line category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Info,
    Success,
    Undo,
    Error,
}

/// One line in the operator log
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub entry_id: u64,
    pub at: DateTime<Local>,
    pub kind: EntryKind,
    pub text: String,
}
