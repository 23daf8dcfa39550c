//! Intake Scanner Library
//!
//! Operator scanning terminal for container intake against client orders.
//!
//! ## Architecture (5 Components)
//!
//! 1. RecognitionSource - Manual entry and camera OCR loop
//! 2. ScanEventBuilder - Input validation, ScanContext
//! 3. LedgerClient - Ledger server adapter (scan/orders/finish)
//! 4. UndoController - Single-slot undo via negated delta
//! 5. FeedbackChannel - Operator log, tones, success pulse
//!
//! `ScanSession` wires them together for the terminal.
//!
//! ## Design Principles
//!
//! - The server owns every running total; the terminal keeps only the undo slot
//! - No automatic retry; the operator re-scans
//! - Feedback is best-effort and never blocks a scan

pub mod error;
pub mod feedback;
pub mod ledger_client;
pub mod recognition_source;
pub mod scan_event;
pub mod scan_session;
pub mod state;
pub mod undo_controller;

pub use error::{Error, Result};
pub use scan_session::ScanSession;
pub use state::AppConfig;
