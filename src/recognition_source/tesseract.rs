//! Tesseract CLI recognizer
//!
//! The frame is piped to `tesseract stdin stdout` with a character whitelist.

use super::types::{Frame, TextRecognizer};
use crate::error::RecognitionError;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// TesseractRecognizer instance
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    language: String,
    timeout: Duration,
}

impl TesseractRecognizer {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn args(&self, charset: &str) -> Vec<String> {
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
            "-c".to_string(),
            format!("tessedit_char_whitelist={}", charset),
        ]
    }

    async fn run(&self, frame: &Frame, charset: &str) -> Result<String, RecognitionError> {
        let mut child = Command::new("tesseract")
            .args(self.args(charset))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RecognitionError::Recognizer(format!("tesseract spawn failed: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&frame.data)
                .await
                .map_err(|e| RecognitionError::Recognizer(format!("frame write failed: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| RecognitionError::Recognizer(format!("tesseract failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Recognizer(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("eng")
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, frame: &Frame, charset: &str) -> Result<String, RecognitionError> {
        match tokio::time::timeout(self.timeout, self.run(frame, charset)).await {
            Ok(result) => result,
            Err(_) => Err(RecognitionError::Recognizer(format!(
                "tesseract timeout ({}ms)",
                self.timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan_event::CONTAINER_CHARSET;

    #[test]
    fn test_args_carry_whitelist() {
        let args = TesseractRecognizer::default().args(CONTAINER_CHARSET);
        assert_eq!(args[..4], ["stdin", "stdout", "-l", "eng"]);
        assert_eq!(
            args[5],
            "tessedit_char_whitelist=ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
        );
    }
}
