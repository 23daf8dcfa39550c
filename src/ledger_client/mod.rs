//! LedgerClient - Ledger Server Adapter
//!
//! ## Responsibilities
//!
//! - Submit signed quantity deltas (`POST /api/scan`)
//! - Load the client list for a date
//! - Mark a client's intake finished
//! - Resolve the pairing URL
//!
//! Stateless: running totals live on the server. There is no retry here; a
//! failed submission is reported and the operator scans again.

mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use types::{FinishRequest, FinishResponse, LedgerResult, ServerInfo, PAIRING_PATH};

use crate::error::{Error, Result};
use crate::scan_event::{ScanContext, DATE_FORMAT};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// The ledger server as seen by the terminal
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Apply one signed delta; negative quantities undo
    async fn submit(&self, ctx: &ScanContext) -> Result<LedgerResult>;

    /// Clients with orders on `date`
    async fn orders(&self, date: NaiveDate) -> Result<Vec<String>>;

    /// Close a client's intake
    async fn finish(&self, client: &str) -> Result<FinishResponse>;

    /// Server address for pairing
    async fn server_info(&self) -> Result<ServerInfo>;
}

/// reqwest-backed ledger client
#[derive(Debug, Clone)]
pub struct LedgerClient {
    client: reqwest::Client,
    base_url: String,
}

impl LedgerClient {
    /// Create new ledger client
    pub fn new(base_url: String) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    /// Create new ledger client with custom timeout
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "ledger server URL must start with http:// or https://: {:?}",
                base_url
            )));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read a JSON body, turning non-2xx into a submission error
    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response, what: &str) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Submission(format!(
                "{} failed: HTTP {} {}",
                what,
                status,
                body.trim()
            )));
        }

        let value = resp.json::<T>().await?;
        Ok(value)
    }
}

#[async_trait]
impl LedgerApi for LedgerClient {
    async fn submit(&self, ctx: &ScanContext) -> Result<LedgerResult> {
        let url = format!("{}/api/scan", self.base_url);

        tracing::debug!(
            url = %url,
            date = %ctx.date,
            client = %ctx.client,
            container = %ctx.container,
            qty = ctx.quantity,
            "Submitting ledger delta"
        );

        let resp = self.client.post(&url).json(ctx).send().await?;
        let result: LedgerResult = Self::read_json(resp, "scan").await?;

        tracing::info!(
            client = %ctx.client,
            container = %ctx.container,
            qty = ctx.quantity,
            remaining = ?result.remaining,
            total = ?result.total,
            "Ledger delta applied"
        );

        Ok(result)
    }

    async fn orders(&self, date: NaiveDate) -> Result<Vec<String>> {
        let url = format!("{}/api/orders/{}", self.base_url, date.format(DATE_FORMAT));
        let resp = self.client.get(&url).send().await?;
        let clients: Vec<String> = Self::read_json(resp, "orders").await?;

        tracing::debug!(date = %date, count = clients.len(), "Orders loaded");
        Ok(clients)
    }

    async fn finish(&self, client: &str) -> Result<FinishResponse> {
        let url = format!("{}/api/finish", self.base_url);
        let body = FinishRequest {
            client: client.to_string(),
        };

        let resp = self.client.post(&url).json(&body).send().await?;
        let result: FinishResponse = Self::read_json(resp, "finish").await?;

        tracing::info!(client = %client, message = %result.message, "Client intake finished");
        Ok(result)
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        let url = format!("{}/api/server-info", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Self::read_json(resp, "server-info").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = LedgerClient::new("http://localhost:3000/".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_rejects_non_http_url() {
        for url in ["", "localhost:3000", "ftp://ledger/"] {
            let err = LedgerClient::new(url.to_string()).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{}", url);
            assert!(!err.is_submission_failure());
        }
    }
}
