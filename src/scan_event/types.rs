//! Scan event types

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Container number format: 4 uppercase letters + 7 ASCII digits (e.g. ABCD1234567)
pub const CONTAINER_PATTERN: &str = r"^[A-Z]{4}[0-9]{7}$";

/// Character set the recognizer is restricted to
pub const CONTAINER_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Date format shared with the ledger server
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn container_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CONTAINER_PATTERN).expect("container pattern is valid"))
}

/// Check a candidate against the container number format
pub fn is_container_id(candidate: &str) -> bool {
    container_regex().is_match(candidate)
}

/// Raw operator input at the moment of confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanInput {
    /// Selected date as typed (YYYY-MM-DD)
    pub date: String,
    /// Selected client
    pub client: String,
    /// Input field text (manual entry or recognized id)
    pub container: String,
    /// Quantity field
    pub quantity: i64,
}

/// A validated scan, ready to be applied to the ledger as a signed delta
///
/// Serialized form is the `/api/scan` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanContext {
    pub date: NaiveDate,
    pub client: String,
    pub container: String,
    #[serde(rename = "qty")]
    pub quantity: i64,
}

impl ScanContext {
    /// Same context with the quantity sign flipped (compensating delta)
    ///
    /// `ScanEventBuilder` never yields `i64::MIN`, so this cannot overflow.
    pub fn negated(&self) -> Self {
        Self {
            quantity: -self.quantity,
            ..self.clone()
        }
    }

    /// Date rendered in the server format
    pub fn date_str(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}
