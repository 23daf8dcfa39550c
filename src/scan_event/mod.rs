//! ScanEventBuilder - Input Validation
//!
//! ## Responsibilities
//!
//! - Validate operator input (date, client, container, quantity)
//! - Build the ScanContext that the ledger client submits
//!
//! The container format is only enforced for camera input, upstream in
//! `recognition_source`. Manual entry accepts any non-empty text.

mod types;

pub use types::{
    is_container_id, ScanContext, ScanInput, CONTAINER_CHARSET, CONTAINER_PATTERN, DATE_FORMAT,
};

use crate::error::ValidationError;
use chrono::NaiveDate;

/// Parse a date field, rejecting blanks
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingDate);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Non-zero, and small enough that its negation (the undo delta) fits
fn check_quantity(qty: i64) -> Result<i64, ValidationError> {
    match qty {
        0 => Err(ValidationError::ZeroQuantity),
        i64::MIN => Err(ValidationError::InvalidQuantity(qty.to_string())),
        _ => Ok(qty),
    }
}

/// Parse a quantity field
pub fn parse_quantity(raw: &str) -> Result<i64, ValidationError> {
    let raw = raw.trim();
    let qty: i64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidQuantity(raw.to_string()))?;
    check_quantity(qty)
}

/// Builds ScanContexts from raw input
#[derive(Debug, Clone, Default)]
pub struct ScanEventBuilder;

impl ScanEventBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Validate and build
    ///
    /// Order: date, client, container, quantity. The first failure wins.
    pub fn build(&self, input: &ScanInput) -> Result<ScanContext, ValidationError> {
        let date = parse_date(&input.date)?;

        let client = input.client.trim();
        if client.is_empty() {
            return Err(ValidationError::MissingClient);
        }

        let container = input.container.trim();
        if container.is_empty() {
            return Err(ValidationError::MissingContainer);
        }

        let quantity = check_quantity(input.quantity)?;

        let ctx = ScanContext {
            date,
            client: client.to_string(),
            container: container.to_string(),
            quantity,
        };

        tracing::debug!(
            date = %ctx.date,
            client = %ctx.client,
            container = %ctx.container,
            qty = ctx.quantity,
            "Scan context built"
        );

        Ok(ctx)
    }
}
