//! ffmpeg-backed frame source
//!
//! Each `grab_frame` spawns ffmpeg for exactly one frame and pipes it back as
//! MJPEG. Works for V4L2 devices (`-f v4l2 -i /dev/video0`) and for stream
//! URLs (RTSP/HTTP, no input format).

use super::types::{Frame, FrameSource};
use crate::error::RecognitionError;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::process::Command;

/// ffmpeg frame source configuration
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    /// Device path or stream URL
    pub input: String,
    /// Input format (`v4l2`, `avfoundation`, ...); None for URLs
    pub format: Option<String>,
    /// Per-frame timeout
    pub timeout: Duration,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            input: "/dev/video0".to_string(),
            format: Some("v4l2".to_string()),
            timeout: Duration::from_secs(5),
        }
    }
}

/// FfmpegFrameSource instance
pub struct FfmpegFrameSource {
    config: FfmpegConfig,
    open: AtomicBool,
}

impl FfmpegFrameSource {
    pub fn new(config: FfmpegConfig) -> Self {
        Self {
            config,
            open: AtomicBool::new(false),
        }
    }

    /// ffmpeg arguments for a single-frame grab
    pub fn capture_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(format) = &self.config.format {
            args.push("-f".to_string());
            args.push(format.clone());
        }
        if self.config.input.starts_with("rtsp://") {
            args.push("-rtsp_transport".to_string());
            args.push("tcp".to_string());
        }
        args.extend(
            [
                "-i",
                self.config.input.as_str(),
                "-frames:v",
                "1",
                "-f",
                "image2pipe",
                "-vcodec",
                "mjpeg",
                "-loglevel",
                "error",
                "-y",
                "-",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args
    }

    /// Check if ffmpeg is available
    pub async fn check_ffmpeg() -> Result<String, RecognitionError> {
        let output = Command::new("ffmpeg")
            .arg("-version")
            .output()
            .await
            .map_err(|e| RecognitionError::FeedUnavailable(format!("ffmpeg not found: {}", e)))?;

        if !output.status.success() {
            return Err(RecognitionError::FeedUnavailable(
                "ffmpeg version check failed".to_string(),
            ));
        }

        let version = String::from_utf8_lossy(&output.stdout);
        let first_line = version.lines().next().unwrap_or("unknown");
        Ok(first_line.to_string())
    }
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    async fn open(&self) -> Result<(), RecognitionError> {
        let version = Self::check_ffmpeg().await?;
        self.open.store(true, Ordering::SeqCst);

        tracing::debug!(
            input = %self.config.input,
            format = ?self.config.format,
            ffmpeg = %version,
            "Camera feed opened"
        );
        Ok(())
    }

    async fn grab_frame(&self) -> Result<Frame, RecognitionError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(RecognitionError::NoFrame("feed not open".to_string()));
        }

        // kill_on_drop: a timed-out grab takes ffmpeg down with it
        let child = Command::new("ffmpeg")
            .args(self.capture_args())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RecognitionError::NoFrame(format!("ffmpeg spawn failed: {}", e)))?;

        match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(RecognitionError::NoFrame(format!(
                        "ffmpeg failed: {}",
                        stderr.trim()
                    )));
                }

                if output.stdout.is_empty() {
                    return Err(RecognitionError::NoFrame(
                        "ffmpeg returned empty output".to_string(),
                    ));
                }

                Ok(Frame::new(output.stdout))
            }
            Ok(Err(e)) => Err(RecognitionError::NoFrame(format!(
                "ffmpeg execution failed: {}",
                e
            ))),
            Err(_) => Err(RecognitionError::NoFrame(format!(
                "ffmpeg timeout ({}ms)",
                self.config.timeout.as_millis()
            ))),
        }
    }

    fn release(&self) {
        self.open.store(false, Ordering::SeqCst);
        tracing::debug!(input = %self.config.input, "Camera feed closed");
    }
}
