//! RecognitionSource - Container Number Input
//!
//! ## Responsibilities
//!
//! - Manual channel: keyed entry, emitted on confirmation
//! - Continuous channel: camera frame -> OCR -> pattern check loop
//! - Feed lifecycle: one open and one release per arm cycle
//!
//! ## Module layout
//! - `types`: seams (`FrameSource`, `TextRecognizer`) and state
//! - `manual`: input field
//! - `continuous`: polling loop and arm handle
//! - `ffmpeg`, `tesseract`: concrete camera and OCR backends

mod continuous;
mod ffmpeg;
mod manual;
mod tesseract;
mod types;

pub use continuous::{normalize_candidate, ArmHandle, ContinuousChannel};
pub use ffmpeg::{FfmpegConfig, FfmpegFrameSource};
pub use manual::ManualChannel;
pub use tesseract::TesseractRecognizer;
pub use types::{
    CameraState, Frame, FrameSource, ScanOutcome, TextRecognizer, DEFAULT_RETRY_DELAY_MS,
};
