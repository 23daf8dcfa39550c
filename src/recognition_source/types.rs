//! Recognition source types and seams

use crate::error::RecognitionError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Delay between recognition attempts while armed
pub const DEFAULT_RETRY_DELAY_MS: u64 = 150;

/// One captured camera frame (JPEG bytes)
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            captured_at: Utc::now(),
        }
    }
}

/// A live video feed
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Acquire the feed for one arm cycle
    async fn open(&self) -> Result<(), RecognitionError>;

    /// Capture a single frame
    async fn grab_frame(&self) -> Result<Frame, RecognitionError>;

    /// Give the feed back; called once when the owning arm cycle ends.
    /// A cycle superseded by a re-arm leaves it to the newer one.
    fn release(&self);
}

/// Optical character recognition over a frame
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Raw recognized text, restricted to `charset`
    async fn recognize(&self, frame: &Frame, charset: &str) -> Result<String, RecognitionError>;
}

/// Camera session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Armed,
    Recognizing,
    Matched,
}

impl CameraState {
    pub fn is_armed(&self) -> bool {
        !matches!(self, CameraState::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraState::Idle => "idle",
            CameraState::Armed => "armed",
            CameraState::Recognizing => "recognizing",
            CameraState::Matched => "matched",
        }
    }
}

/// How an armed cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A container number was read
    Matched(String),
    /// Disarmed from outside before a match
    Stopped,
    /// A cycle was already running; this call did nothing
    AlreadyArmed,
}
