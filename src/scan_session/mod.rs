//! ScanSession - Operator Terminal Session
//!
//! ## Responsibilities
//!
//! - Hold the operator's current selection (date, client, quantity)
//! - Route confirmed input through ScanEventBuilder -> LedgerApi
//! - Keep the undo slot current
//! - Turn every outcome into operator feedback
//!
//! The session is driven from one task. The camera loop runs beside it and
//! hands matches back through `handle_camera_outcome`.

pub mod messages;

use crate::error::{Error, RecognitionError, Result, ValidationError};
use crate::feedback::FeedbackChannel;
use crate::ledger_client::{LedgerApi, LedgerResult};
use crate::recognition_source::{ContinuousChannel, ManualChannel, ScanOutcome};
use crate::scan_event::{parse_date, ScanContext, ScanEventBuilder, ScanInput};
use crate::undo_controller::{UndoController, UndoOutcome};
use std::sync::Arc;

/// ScanSession instance
pub struct ScanSession {
    ledger: Arc<dyn LedgerApi>,
    builder: ScanEventBuilder,
    undo: UndoController,
    feedback: FeedbackChannel,
    input: ManualChannel,
    date: String,
    client: String,
    quantity: i64,
    clients: Vec<String>,
}

impl ScanSession {
    pub fn new(ledger: Arc<dyn LedgerApi>, feedback: FeedbackChannel) -> Self {
        Self {
            ledger,
            builder: ScanEventBuilder::new(),
            undo: UndoController::new(),
            feedback,
            input: ManualChannel::new(),
            date: String::new(),
            client: String::new(),
            quantity: 1,
            clients: Vec::new(),
        }
    }

    pub fn feedback(&self) -> &FeedbackChannel {
        &self.feedback
    }

    pub fn feedback_mut(&mut self) -> &mut FeedbackChannel {
        &mut self.feedback
    }

    pub fn input(&self) -> &ManualChannel {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut ManualChannel {
        &mut self.input
    }

    pub fn last_scan(&self) -> Option<&ScanContext> {
        self.undo.last_scan()
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn clients(&self) -> &[String] {
        &self.clients
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }

    /// Select a client; once orders are loaded only listed clients are accepted
    pub fn set_client(&mut self, client: &str) -> Result<()> {
        let client = client.trim();
        if !self.clients.is_empty() && !self.clients.iter().any(|c| c == client) {
            return Err(self.report(ValidationError::MissingClient.into(), messages::PICK_CLIENT));
        }
        self.client = client.to_string();
        Ok(())
    }

    /// Enter pressed in the input field
    pub async fn confirm_scan(&mut self) -> Result<LedgerResult> {
        let input = ScanInput {
            date: self.date.clone(),
            client: self.client.clone(),
            container: self.input.confirm(),
            quantity: self.quantity,
        };

        let ctx = match self.builder.build(&input) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::debug!(error = %e, "Scan rejected before submission");
                return Err(self.report(e.into(), messages::FILL_ALL_FIELDS));
            }
        };

        // Handed off: ready the field for the next container right away
        self.input.clear_and_focus();

        match self.ledger.submit(&ctx).await {
            Ok(result) => {
                self.feedback.success(messages::scan_line(&result));
                self.undo.record_success(ctx);
                Ok(result)
            }
            Err(e) => {
                tracing::error!(
                    client = %ctx.client,
                    container = %ctx.container,
                    qty = ctx.quantity,
                    error = %e,
                    "Scan submission failed"
                );
                let text = messages::server_error(&e);
                Err(self.report(e, text))
            }
        }
    }

    /// Put a container number in the field and confirm it
    pub async fn scan_container(&mut self, container: &str) -> Result<LedgerResult> {
        self.input.set_text(container);
        self.confirm_scan().await
    }

    /// Revert the last accepted scan
    pub async fn undo(&mut self) -> Result<UndoOutcome> {
        match self.undo.undo(self.ledger.as_ref()).await {
            Ok(outcome) => {
                self.feedback.confirm(messages::undo_line(&outcome));
                Ok(outcome)
            }
            Err(Error::NoOp) => Err(self.report(Error::NoOp, messages::NOTHING_TO_UNDO)),
            Err(e) => {
                let text = messages::server_error(&e);
                Err(self.report(e, text))
            }
        }
    }

    /// Fetch the clients with orders on the selected date
    pub async fn load_orders(&mut self) -> Result<Vec<String>> {
        let date = match parse_date(&self.date) {
            Ok(date) => date,
            Err(e) => return Err(self.report(e.into(), messages::PICK_DATE)),
        };

        match self.ledger.orders(date).await {
            Ok(clients) => {
                self.feedback.info(messages::orders_loaded(clients.len()));
                self.clients = clients.clone();
                self.client.clear();
                Ok(clients)
            }
            Err(e) => {
                tracing::error!(date = %date, error = %e, "Loading orders failed");
                let text = messages::server_error(&e);
                Err(self.report(e, text))
            }
        }
    }

    /// Close intake for the selected client
    pub async fn finish_client(&mut self) -> Result<()> {
        if self.client.trim().is_empty() {
            return Err(self.report(ValidationError::MissingClient.into(), messages::PICK_CLIENT));
        }

        let client = self.client.clone();
        match self.ledger.finish(&client).await {
            Ok(_) => {
                self.feedback.confirm(messages::finished(&client));
                Ok(())
            }
            Err(e) => {
                tracing::error!(client = %client, error = %e, "Finish failed");
                let text = messages::server_error(&e);
                Err(self.report(e, text))
            }
        }
    }

    /// Address a handheld scanner should open
    pub async fn pairing_url(&mut self) -> Result<String> {
        match self.ledger.server_info().await {
            Ok(info) => {
                let url = info.pairing_url();
                self.feedback.info(messages::pairing(&url));
                Ok(url)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Server info unavailable");
                let text = messages::server_error(&e);
                Err(self.report(e, text))
            }
        }
    }

    /// Log an error line, with the tone its class calls for, and hand it back
    fn report(&mut self, err: Error, text: impl Into<String>) -> Error {
        self.feedback.reject(text, err.tone());
        err
    }

    /// Camera armed notice
    pub fn camera_armed(&mut self) {
        self.feedback.info(messages::CAMERA_ON);
    }

    /// Feed the result of one camera arm cycle back into the session
    ///
    /// A match is submitted exactly like a manually confirmed entry.
    pub async fn handle_camera_outcome(
        &mut self,
        outcome: std::result::Result<ScanOutcome, RecognitionError>,
    ) -> Option<Result<LedgerResult>> {
        match outcome {
            Ok(ScanOutcome::Matched(container)) => {
                self.feedback.info(messages::recognized(&container));
                self.feedback.info(messages::CAMERA_OFF);
                Some(self.scan_container(&container).await)
            }
            Ok(ScanOutcome::Stopped) => {
                self.feedback.info(messages::CAMERA_OFF);
                None
            }
            Ok(ScanOutcome::AlreadyArmed) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Camera unavailable");
                self.report(e.into(), messages::CAMERA_FAILED);
                None
            }
        }
    }

    /// Arm the camera, wait for a match or stop, then submit
    pub async fn run_camera(&mut self, camera: &ContinuousChannel) -> Option<Result<LedgerResult>> {
        if camera.state().is_armed() {
            tracing::warn!("Camera scan already running");
            return None;
        }
        self.camera_armed();
        let outcome = camera.scan().await;
        self.handle_camera_outcome(outcome).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{Tone, ToneSink};
    use crate::ledger_client::fake::RecordingLedger;
    use crate::recognition_source::{Frame, FrameSource, TextRecognizer};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn session(ledger: Arc<RecordingLedger>) -> ScanSession {
        let mut session = ScanSession::new(ledger, FeedbackChannel::silent(100));
        session.set_date("2024-01-01");
        session.set_client("Acme").unwrap();
        session.set_quantity(5);
        session
    }

    fn acme(qty: i64) -> ScanContext {
        ScanContext {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            client: "Acme".to_string(),
            container: "ABCD1234567".to_string(),
            quantity: qty,
        }
    }

    #[tokio::test]
    async fn test_scan_then_undo_scenario() {
        let ledger = Arc::new(RecordingLedger::new().with_capacity("Acme", 15));
        let mut session = session(ledger.clone());

        let result = session.scan_container("ABCD1234567").await.unwrap();
        assert_eq!(result.remaining, Some(10));
        assert_eq!(result.total, Some(15));
        assert_eq!(
            session.feedback().log().newest().unwrap().text,
            "OK | Залишилось: 10 / 15"
        );
        assert_eq!(session.last_scan(), Some(&acme(5)));
        assert_eq!(session.input().text(), "");
        assert!(session.feedback().is_pulsing());

        let outcome = session.undo().await.unwrap();
        assert_eq!(ledger.last_submitted(), Some(acme(-5)));
        assert_eq!(outcome.result.remaining, Some(15));
        assert!(session.last_scan().is_none());
        assert_eq!(
            session.feedback().log().newest().unwrap().text,
            "↩️ Відмінено: 5 | Залишилось: 15 / 15"
        );

        // Second undo: no call, error feedback
        let calls = ledger.calls();
        assert!(matches!(session.undo().await, Err(Error::NoOp)));
        assert_eq!(ledger.calls(), calls);
        assert_eq!(
            session.feedback().log().newest().unwrap().text,
            "❌ Немає що відміняти"
        );
    }

    #[tokio::test]
    async fn test_missing_fields_make_no_call() {
        let ledger = Arc::new(RecordingLedger::new());

        let cases: [(&str, &str, &str); 3] = [
            ("", "Acme", "ABCD1234567"),
            ("2024-01-01", "", "ABCD1234567"),
            ("2024-01-01", "Acme", ""),
        ];

        for (date, client, container) in cases {
            let mut session = ScanSession::new(ledger.clone(), FeedbackChannel::silent(10));
            session.set_date(date);
            session.set_client(client).unwrap();
            session.input_mut().set_text(container);

            let result = session.confirm_scan().await;
            assert!(matches!(result, Err(Error::Validation(_))));
            assert_eq!(
                session.feedback().log().newest().unwrap().text,
                "❌ Заповніть всі поля"
            );
            assert!(session.last_scan().is_none());
        }

        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_open_ended_result_shows_message_only() {
        let ledger = Arc::new(RecordingLedger::new());
        let mut session = session(ledger);

        session.scan_container("pallet-12").await.unwrap();
        assert_eq!(session.feedback().log().newest().unwrap().text, "OK");
    }

    #[tokio::test]
    async fn test_submission_failure_keeps_previous_slot() {
        let ledger = Arc::new(RecordingLedger::new().with_capacity("Acme", 15));
        let mut session = session(ledger.clone());

        session.scan_container("ABCD1234567").await.unwrap();

        ledger.fail_next("connection refused");
        let result = session.scan_container("WXYZ7654321").await;
        assert!(matches!(result, Err(Error::Submission(_))));
        assert_eq!(session.last_scan(), Some(&acme(5)));
        assert!(session
            .feedback()
            .log()
            .newest()
            .unwrap()
            .text
            .starts_with("❌ Помилка сервера"));
        assert_eq!(session.input().text(), "");
    }

    #[tokio::test]
    async fn test_undo_clears_slot_even_on_failure() {
        let ledger = Arc::new(RecordingLedger::new());
        let mut session = session(ledger.clone());

        session.scan_container("ABCD1234567").await.unwrap();
        ledger.fail_next("timeout");

        assert!(matches!(session.undo().await, Err(Error::Submission(_))));
        assert!(session.last_scan().is_none());
        assert_eq!(ledger.last_submitted(), Some(acme(-5)));
    }

    #[tokio::test]
    async fn test_load_orders_and_finish() {
        let ledger = Arc::new(RecordingLedger::new().with_clients(&["Acme", "Globex"]));
        let mut session = ScanSession::new(ledger.clone(), FeedbackChannel::silent(10));

        assert!(matches!(session.load_orders().await, Err(Error::Validation(_))));
        assert!(matches!(session.finish_client().await, Err(Error::Validation(_))));

        session.set_date("2024-01-01");
        let clients = session.load_orders().await.unwrap();
        assert_eq!(clients, vec!["Acme", "Globex"]);
        assert_eq!(
            session.feedback().log().newest().unwrap().text,
            "✔ Завантажено клієнтів: 2"
        );

        assert!(session.set_client("Initech").is_err());
        session.set_client("Globex").unwrap();
        session.finish_client().await.unwrap();
        assert_eq!(*ledger.finished.lock().unwrap(), vec!["Globex"]);
        assert_eq!(
            session.feedback().log().newest().unwrap().text,
            "✔ Завершено: Globex"
        );
    }

    #[tokio::test]
    async fn test_pairing_url() {
        let ledger = Arc::new(RecordingLedger::new());
        let mut session = ScanSession::new(ledger, FeedbackChannel::silent(10));

        let url = session.pairing_url().await.unwrap();
        assert_eq!(url, "http://10.0.0.5:3000/components/scanner.html");
    }

    struct StillCamera;

    #[async_trait]
    impl FrameSource for StillCamera {
        async fn open(&self) -> std::result::Result<(), RecognitionError> {
            Ok(())
        }
        async fn grab_frame(&self) -> std::result::Result<Frame, RecognitionError> {
            Ok(Frame::new(vec![1, 2, 3]))
        }
        fn release(&self) {}
    }

    struct FixedOcr(&'static str);

    #[async_trait]
    impl TextRecognizer for FixedOcr {
        async fn recognize(
            &self,
            _frame: &Frame,
            _charset: &str,
        ) -> std::result::Result<String, RecognitionError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_camera_match_submits() {
        let ledger = Arc::new(RecordingLedger::new().with_capacity("Acme", 15));
        let mut session = session(ledger.clone());
        let camera = ContinuousChannel::with_retry_delay(
            Arc::new(StillCamera),
            Arc::new(FixedOcr("ABCD 1234567")),
            Duration::from_millis(1),
        );

        let result = session.run_camera(&camera).await.unwrap().unwrap();
        assert_eq!(result.remaining, Some(10));
        assert_eq!(ledger.last_submitted(), Some(acme(5)));
        assert_eq!(
            session.feedback().log().lines(),
            vec![
                "📷 Камера увімкнена. Наведи на номер контейнера...",
                "📄 Розпізнано: ABCD1234567",
                "📵 Камеру вимкнено",
                "OK | Залишилось: 10 / 15",
            ]
        );
    }

    #[tokio::test]
    async fn test_camera_open_failure_is_reported() {
        let ledger = Arc::new(RecordingLedger::new());
        let mut session = session(ledger.clone());

        let handled = session
            .handle_camera_outcome(Err(RecognitionError::FeedUnavailable("busy".to_string())))
            .await;
        assert!(handled.is_none());
        assert_eq!(
            session.feedback().log().newest().unwrap().text,
            "❌ Не вдалося відкрити камеру"
        );
        assert_eq!(ledger.calls(), 0);
    }

    #[derive(Clone, Default)]
    struct HeardTones(Arc<std::sync::Mutex<Vec<Tone>>>);

    impl ToneSink for HeardTones {
        fn play(&self, tone: Tone) -> std::io::Result<()> {
            self.0.lock().unwrap().push(tone);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_error_tones_follow_error_class() {
        let ledger = Arc::new(RecordingLedger::default());
        let heard = HeardTones::default();
        let feedback = FeedbackChannel::new(100, Box::new(heard.clone()));
        let mut session = ScanSession::new(ledger.clone(), feedback);
        session.set_date("2024-01-01");

        // Validation: low tone
        assert!(session.scan_container("ABCD1234567").await.is_err());
        // Nothing to undo: low tone
        assert!(matches!(session.undo().await, Err(Error::NoOp)));
        // Server failure: log line only
        session.set_client("Acme").unwrap();
        ledger.fail_next("HTTP 502");
        assert!(session.scan_container("ABCD1234567").await.is_err());

        assert_eq!(*heard.0.lock().unwrap(), vec![Tone::Error, Tone::Error]);
        assert_eq!(session.feedback().log().len(), 3);
    }

    #[tokio::test]
    async fn test_unnegatable_quantity_never_reaches_ledger() {
        let ledger = Arc::new(RecordingLedger::default());
        let mut session = session(ledger.clone());
        session.set_quantity(i64::MIN);

        let err = session.scan_container("ABCD1234567").await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidQuantity(_))));
        assert_eq!(ledger.calls(), 0);
        assert!(matches!(session.undo().await, Err(Error::NoOp)));
    }
}
