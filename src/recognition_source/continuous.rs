//! Continuous camera channel
//!
//! Cooperative polling: grab a frame, OCR it, test the pattern, sleep, repeat.
//! The armed flag is read when each attempt fires, so a stop issued while the
//! loop sleeps takes effect before the next capture.

use super::types::{CameraState, FrameSource, ScanOutcome, TextRecognizer, DEFAULT_RETRY_DELAY_MS};
use crate::error::RecognitionError;
use crate::scan_event::{is_container_id, CONTAINER_CHARSET};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Arming state plus the id of the cycle that owns it
#[derive(Debug)]
struct Arming {
    state: CameraState,
    cycle: u64,
}

/// Shared arming flag; clone it to stop the loop from elsewhere
///
/// Each arm cycle gets its own id. A cycle that was stopped and then
/// superseded by a fresh arming sees a different id and can no longer
/// advance or disarm the new one.
#[derive(Debug, Clone)]
pub struct ArmHandle {
    inner: Arc<Mutex<Arming>>,
}

impl ArmHandle {
    fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Arming {
                state: CameraState::Idle,
                cycle: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Arming> {
        // Plain data, a poisoned lock still holds a valid value
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> CameraState {
        self.lock().state
    }

    pub fn is_armed(&self) -> bool {
        self.state().is_armed()
    }

    /// Stop the loop. Returns false if it was not running.
    pub fn disarm(&self) -> bool {
        let mut arming = self.lock();
        let was_armed = arming.state.is_armed();
        if was_armed {
            tracing::debug!(from = arming.state.as_str(), cycle = arming.cycle, "Camera disarmed externally");
        }
        arming.state = CameraState::Idle;
        was_armed
    }

    /// Idle -> Armed; returns the new cycle id, None if a cycle is running
    fn try_arm(&self) -> Option<u64> {
        let mut arming = self.lock();
        if arming.state.is_armed() {
            return None;
        }
        arming.cycle = arming.cycle.wrapping_add(1);
        arming.state = CameraState::Armed;
        Some(arming.cycle)
    }

    /// Move between armed sub-states; false once disarmed or superseded
    fn advance(&self, cycle: u64, next: CameraState) -> bool {
        let mut arming = self.lock();
        if arming.cycle != cycle || !arming.state.is_armed() {
            return false;
        }
        arming.state = next;
        true
    }

    /// Back to Idle, unless a newer cycle has taken over. Returns whether
    /// `cycle` was still the current one.
    fn finish(&self, cycle: u64) -> bool {
        let mut arming = self.lock();
        if arming.cycle != cycle {
            return false;
        }
        arming.state = CameraState::Idle;
        true
    }
}

/// Camera feed held for one arm cycle - Drop releases it and disarms
///
/// A superseded cycle leaves the feed to the cycle that re-opened it.
struct FeedLease {
    frames: Arc<dyn FrameSource>,
    handle: ArmHandle,
    cycle: u64,
}

impl Drop for FeedLease {
    fn drop(&mut self) {
        if self.handle.finish(self.cycle) {
            self.frames.release();
            tracing::debug!(cycle = self.cycle, "Camera feed released");
        } else {
            tracing::debug!(cycle = self.cycle, "Camera feed kept by newer cycle");
        }
    }
}

/// Strip all whitespace from raw OCR output
pub fn normalize_candidate(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// ContinuousChannel instance
pub struct ContinuousChannel {
    frames: Arc<dyn FrameSource>,
    recognizer: Arc<dyn TextRecognizer>,
    retry_delay: Duration,
    handle: ArmHandle,
}

impl ContinuousChannel {
    pub fn new(frames: Arc<dyn FrameSource>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self::with_retry_delay(
            frames,
            recognizer,
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        )
    }

    pub fn with_retry_delay(
        frames: Arc<dyn FrameSource>,
        recognizer: Arc<dyn TextRecognizer>,
        retry_delay: Duration,
    ) -> Self {
        Self {
            frames,
            recognizer,
            retry_delay,
            handle: ArmHandle::new(),
        }
    }

    /// Handle for stopping the loop from outside
    pub fn handle(&self) -> ArmHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> CameraState {
        self.handle.state()
    }

    /// Run one arm cycle until a match or an external stop
    ///
    /// Fails only when the feed cannot be opened. Per-attempt capture and OCR
    /// errors are logged and retried.
    pub async fn scan(&self) -> Result<ScanOutcome, RecognitionError> {
        let Some(cycle) = self.handle.try_arm() else {
            tracing::warn!("Camera scan already running");
            return Ok(ScanOutcome::AlreadyArmed);
        };

        if let Err(e) = self.frames.open().await {
            self.handle.finish(cycle);
            tracing::warn!(error = %e, "Camera feed could not be opened");
            return Err(e);
        }

        let _lease = FeedLease {
            frames: self.frames.clone(),
            handle: self.handle.clone(),
            cycle,
        };

        tracing::info!(cycle, retry_delay_ms = self.retry_delay.as_millis() as u64, "Camera armed");

        let mut attempts: u64 = 0;
        loop {
            // Checked at fire time, not when the sleep was scheduled
            if !self.handle.advance(cycle, CameraState::Recognizing) {
                tracing::info!(attempts, "Camera scan stopped");
                return Ok(ScanOutcome::Stopped);
            }
            attempts += 1;

            match self.attempt().await {
                Ok(Some(container)) => {
                    if !self.handle.advance(cycle, CameraState::Matched) {
                        tracing::debug!(container = %container, "Match discarded, camera disarmed");
                        return Ok(ScanOutcome::Stopped);
                    }
                    tracing::info!(container = %container, attempts, "Container recognized");
                    return Ok(ScanOutcome::Matched(container));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(attempt = attempts, error = %e, "Recognition attempt failed");
                }
            }

            tokio::time::sleep(self.retry_delay).await;
        }
    }

    /// One capture + OCR pass
    async fn attempt(&self) -> Result<Option<String>, RecognitionError> {
        let frame = self.frames.grab_frame().await?;
        let raw = self.recognizer.recognize(&frame, CONTAINER_CHARSET).await?;
        let candidate = normalize_candidate(&raw);

        if is_container_id(&candidate) {
            let frame_age_ms = (chrono::Utc::now() - frame.captured_at).num_milliseconds();
            tracing::debug!(candidate = %candidate, frame_age_ms, "Container number in frame");
            Ok(Some(candidate))
        } else {
            tracing::trace!(candidate = %candidate, "No container number in frame");
            Ok(None)
        }
    }
}
