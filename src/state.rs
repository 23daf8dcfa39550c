//! Application configuration
//!
//! Environment-driven, `.env` is loaded by the binary before this is read.

use crate::recognition_source::{FfmpegConfig, DEFAULT_RETRY_DELAY_MS};
use std::time::Duration;

/// `EnvFilter` directive used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "intake_scanner=debug";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Ledger server base URL
    pub server_url: String,
    /// HTTP timeout for ledger calls
    pub http_timeout_secs: u64,
    /// Camera device path or stream URL
    pub camera_input: String,
    /// ffmpeg input format for the camera (empty for URLs)
    pub camera_format: Option<String>,
    /// Per-frame capture timeout
    pub frame_timeout_secs: u64,
    /// Delay between recognition attempts
    pub retry_delay_ms: u64,
    /// Tesseract language
    pub ocr_lang: String,
    /// Operator log lines kept in memory
    pub log_capacity: usize,
    /// Audible outcome tones
    pub audio: bool,
    /// External tone player (`beep`-style); terminal bell when unset
    pub tone_command: Option<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: std::env::var("SCANNER_SERVER_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            http_timeout_secs: env_or("SCANNER_HTTP_TIMEOUT_SECS", 10),
            camera_input: std::env::var("SCANNER_CAMERA_INPUT")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            camera_format: match std::env::var("SCANNER_CAMERA_FORMAT") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => Some(v.trim().to_string()),
                Err(_) => Some("v4l2".to_string()),
            },
            frame_timeout_secs: env_or("SCANNER_FRAME_TIMEOUT_SECS", 5),
            retry_delay_ms: env_or("SCANNER_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS),
            ocr_lang: std::env::var("SCANNER_OCR_LANG").unwrap_or_else(|_| "eng".to_string()),
            log_capacity: env_or("SCANNER_LOG_CAPACITY", 500),
            audio: std::env::var("SCANNER_AUDIO")
                .map(|v| !matches!(v.trim(), "off" | "0" | "false"))
                .unwrap_or(true),
            tone_command: std::env::var("SCANNER_TONE_COMMAND")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        }
    }
}

impl AppConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn ffmpeg(&self) -> FfmpegConfig {
        FfmpegConfig {
            input: self.camera_input.clone(),
            format: self.camera_format.clone(),
            timeout: Duration::from_secs(self.frame_timeout_secs),
        }
    }
}
