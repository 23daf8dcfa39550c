//! FeedbackChannel - Operator Feedback
//!
//! ## Responsibilities
//!
//! - Operator log (bounded ring buffer, newest entry last)
//! - Outcome tones (300 / 600 / 1000 Hz)
//! - Success pulse on the input field
//!
//! Everything here is best-effort. A tone that cannot be played is logged at
//! debug level and the operator still gets the log line.

mod types;

pub use types::{EntryKind, LogEntry, Tone, PULSE_DURATION, TONE_DURATION};

use chrono::Local;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;
use std::time::Instant;
use tokio::sync::mpsc;

/// Anything that can sound a tone
pub trait ToneSink: Send + Sync {
    fn play(&self, tone: Tone) -> std::io::Result<()>;
}

/// Silent fallback when no audio is available or wanted
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTone;

impl ToneSink for NullTone {
    fn play(&self, _tone: Tone) -> std::io::Result<()> {
        Ok(())
    }
}

/// Terminal bell
///
/// A terminal has a single bell pitch: every tone sounds the same BEL and the
/// operator cannot tell error, confirm and success apart by ear. The frequency
/// only shows up in the diagnostic log. Use [`CommandTone`] where distinct
/// pitches matter.
pub struct BellTone {
    out: Mutex<Box<dyn Write + Send>>,
}

impl BellTone {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl ToneSink for BellTone {
    fn play(&self, tone: Tone) -> std::io::Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "bell writer poisoned"))?;
        out.write_all(b"\x07")?;
        out.flush()?;

        tracing::trace!(
            tone = tone.as_str(),
            frequency_hz = tone.frequency_hz(),
            duration_ms = TONE_DURATION.as_millis() as u64,
            "Tone played"
        );
        Ok(())
    }
}

/// Pitched tones through an external player with `beep`-style arguments
/// (`-f <hz> -l <ms>`)
///
/// The player is spawned and not waited on, so a slow device never holds up a
/// scan. Needs a Tokio runtime to reap the child.
pub struct CommandTone {
    program: String,
}

impl CommandTone {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for one tone
    pub fn args(tone: Tone) -> Vec<String> {
        vec![
            "-f".to_string(),
            tone.frequency_hz().to_string(),
            "-l".to_string(),
            TONE_DURATION.as_millis().to_string(),
        ]
    }
}

impl ToneSink for CommandTone {
    fn play(&self, tone: Tone) -> std::io::Result<()> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "tone player needs a tokio runtime",
            ));
        }

        tokio::process::Command::new(&self.program)
            .args(Self::args(tone))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()?;

        tracing::trace!(
            program = %self.program,
            tone = tone.as_str(),
            frequency_hz = tone.frequency_hz(),
            "Tone played"
        );
        Ok(())
    }
}

/// Ring buffer for operator log lines
pub struct OperatorLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl OperatorLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    fn push(&mut self, kind: EntryKind, text: String) -> LogEntry {
        let entry = LogEntry {
            entry_id: self.next_id,
            at: Local::now(),
            kind,
            text,
        };
        self.next_id += 1;

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.clone());
        entry
    }

    /// Last `count` entries, oldest first (what a scrolled-to-bottom view shows)
    pub fn tail(&self, count: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn newest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// All retained lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OperatorLog {
    fn default() -> Self {
        Self::new(500)
    }
}

/// FeedbackChannel instance
pub struct FeedbackChannel {
    log: OperatorLog,
    tone: Box<dyn ToneSink>,
    pulse_until: Option<Instant>,
    listener: Option<mpsc::UnboundedSender<LogEntry>>,
}

impl FeedbackChannel {
    pub fn new(log_capacity: usize, tone: Box<dyn ToneSink>) -> Self {
        Self {
            log: OperatorLog::new(log_capacity),
            tone,
            pulse_until: None,
            listener: None,
        }
    }

    /// Log-only feedback
    pub fn silent(log_capacity: usize) -> Self {
        Self::new(log_capacity, Box::new(NullTone))
    }

    /// Forward every new log line to a renderer
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<LogEntry> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listener = Some(tx);
        rx
    }

    pub fn log(&self) -> &OperatorLog {
        &self.log
    }

    /// Plain log line, no tone
    pub fn info(&mut self, text: impl Into<String>) {
        self.append(EntryKind::Info, text.into());
    }

    /// Accepted scan: log, high tone, pulse
    pub fn success(&mut self, text: impl Into<String>) {
        self.append(EntryKind::Success, text.into());
        self.beep(Tone::Success);
        self.pulse_until = Some(Instant::now() + PULSE_DURATION);
    }

    /// Undo done or client finished: log, mid tone
    pub fn confirm(&mut self, text: impl Into<String>) {
        self.append(EntryKind::Undo, text.into());
        self.beep(Tone::Confirm);
    }

    /// Operator mistake: log, low tone
    pub fn error(&mut self, text: impl Into<String>) {
        self.reject(text, Some(Tone::Error));
    }

    /// Failure the operator should see but that has no tone of its own
    pub fn failure(&mut self, text: impl Into<String>) {
        self.reject(text, None);
    }

    /// Error line with an optional tone (see `Error::tone`)
    pub fn reject(&mut self, text: impl Into<String>, tone: Option<Tone>) {
        self.append(EntryKind::Error, text.into());
        if let Some(tone) = tone {
            self.beep(tone);
        }
    }

    /// Whether the input field highlight is still on
    pub fn is_pulsing(&self) -> bool {
        self.is_pulsing_at(Instant::now())
    }

    pub fn is_pulsing_at(&self, now: Instant) -> bool {
        self.pulse_until.is_some_and(|until| now < until)
    }

    fn append(&mut self, kind: EntryKind, text: String) {
        let entry = self.log.push(kind, text);

        if let Some(tx) = &self.listener {
            if tx.send(entry).is_err() {
                self.listener = None;
            }
        }
    }

    fn beep(&self, tone: Tone) {
        if let Err(e) = self.tone.play(tone) {
            tracing::debug!(tone = tone.as_str(), error = %e, "Tone unavailable, log only");
        }
    }
}
