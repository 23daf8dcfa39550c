//! In-memory ledger for unit tests

use super::{FinishResponse, LedgerApi, LedgerResult, ServerInfo};
use crate::error::{Error, Result};
use crate::scan_event::ScanContext;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Records every call and answers from a per-client capacity table
#[derive(Default)]
pub struct RecordingLedger {
    pub submitted: Mutex<Vec<ScanContext>>,
    pub finished: Mutex<Vec<String>>,
    /// Client -> capacity; clients absent here are open-ended
    pub capacity: HashMap<String, i64>,
    pub clients: Vec<String>,
    /// Queued failures, consumed one per submit
    pub failures: Mutex<VecDeque<String>>,
    received: Mutex<HashMap<(String, NaiveDate), i64>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, client: &str, total: i64) -> Self {
        self.capacity.insert(client.to_string(), total);
        self
    }

    pub fn with_clients(mut self, clients: &[&str]) -> Self {
        self.clients = clients.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn fail_next(&self, reason: &str) {
        self.failures.lock().unwrap().push_back(reason.to_string());
    }

    pub fn calls(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn last_submitted(&self) -> Option<ScanContext> {
        self.submitted.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LedgerApi for RecordingLedger {
    async fn submit(&self, ctx: &ScanContext) -> Result<LedgerResult> {
        self.submitted.lock().unwrap().push(ctx.clone());

        if let Some(reason) = self.failures.lock().unwrap().pop_front() {
            return Err(Error::Submission(reason));
        }

        let mut received = self.received.lock().unwrap();
        let count = received
            .entry((ctx.client.clone(), ctx.date))
            .or_insert(0);
        *count += ctx.quantity;

        let total = self.capacity.get(&ctx.client).copied();
        Ok(LedgerResult {
            message: "OK".to_string(),
            remaining: total.map(|t| t - *count),
            total,
        })
    }

    async fn orders(&self, _date: NaiveDate) -> Result<Vec<String>> {
        Ok(self.clients.clone())
    }

    async fn finish(&self, client: &str) -> Result<FinishResponse> {
        self.finished.lock().unwrap().push(client.to_string());
        Ok(FinishResponse {
            message: "done".to_string(),
        })
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        Ok(ServerInfo {
            ip: "10.0.0.5".to_string(),
            port: 3000,
        })
    }
}
