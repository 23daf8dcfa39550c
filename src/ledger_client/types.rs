//! Ledger wire types

use serde::{Deserialize, Serialize};

/// Page served by the ledger server for paired handheld scanners
pub const PAIRING_PATH: &str = "/components/scanner.html";

/// Outcome of a ledger adjustment (`POST /api/scan` response)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerResult {
    pub message: String,

    /// Open count left; absent when the server tracks no limit
    #[serde(default)]
    pub remaining: Option<i64>,

    #[serde(default)]
    pub total: Option<i64>,
}

impl LedgerResult {
    /// True when the server reported a capacity for this container/client
    pub fn has_progress(&self) -> bool {
        self.remaining.is_some()
    }

    /// `remaining / total`, absent values rendered as a dash
    pub fn progress(&self) -> String {
        format!("{} / {}", fmt_count(self.remaining), fmt_count(self.total))
    }
}

fn fmt_count(value: Option<i64>) -> String {
    value.map_or_else(|| "—".to_string(), |v| v.to_string())
}

/// `GET /api/server-info` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub ip: String,
    pub port: u16,
}

impl ServerInfo {
    /// URL a handheld opens to pair with this terminal's server
    pub fn pairing_url(&self) -> String {
        format!("http://{}:{}{}", self.ip, self.port, PAIRING_PATH)
    }
}

/// `POST /api/finish` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishRequest {
    pub client: String,
}

/// `POST /api/finish` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinishResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_remaining_is_open_ended() {
        let result: LedgerResult = serde_json::from_str(
            r#"{"message":"Прийнято","remaining":null,"total":null}"#,
        )
        .unwrap();
        assert!(!result.has_progress());

        let missing: LedgerResult = serde_json::from_str(r#"{"message":"Прийнято"}"#).unwrap();
        assert_eq!(missing, result);
    }

    #[test]
    fn test_progress_format() {
        let result = LedgerResult {
            message: "OK".to_string(),
            remaining: Some(10),
            total: Some(15),
        };
        assert_eq!(result.progress(), "10 / 15");

        let partial = LedgerResult {
            message: "OK".to_string(),
            remaining: Some(3),
            total: None,
        };
        assert_eq!(partial.progress(), "3 / —");
    }

    #[test]
    fn test_pairing_url() {
        let info = ServerInfo {
            ip: "192.168.1.20".to_string(),
            port: 3000,
        };
        assert_eq!(
            info.pairing_url(),
            "http://192.168.1.20:3000/components/scanner.html"
        );
    }
}
