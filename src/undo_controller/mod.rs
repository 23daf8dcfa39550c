//! UndoController - Single-Slot Undo
//!
//! Remembers the last successful forward scan. Undo re-submits it with the
//! quantity negated; there is no separate undo endpoint and no history stack.
//!
//! The slot is cleared as soon as an undo is attempted, whether or not the
//! compensating submission succeeds, so an undo can never be applied twice.

use crate::error::{Error, Result};
use crate::ledger_client::{LedgerApi, LedgerResult};
use crate::scan_event::ScanContext;

/// Result of a completed undo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoOutcome {
    /// The scan that was reverted (original, positive form)
    pub reverted: ScanContext,
    /// Server state after the compensating delta
    pub result: LedgerResult,
}

/// UndoController instance
#[derive(Debug, Default)]
pub struct UndoController {
    last_scan: Option<ScanContext>,
}

impl UndoController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a successful forward scan, replacing whatever was there
    pub fn record_success(&mut self, ctx: ScanContext) {
        tracing::debug!(
            client = %ctx.client,
            container = %ctx.container,
            qty = ctx.quantity,
            "Undo slot updated"
        );
        self.last_scan = Some(ctx);
    }

    /// The scan an undo would revert
    pub fn last_scan(&self) -> Option<&ScanContext> {
        self.last_scan.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.last_scan.is_none()
    }

    /// Revert the remembered scan
    ///
    /// Fails with `Error::NoOp` and makes no call when the slot is empty.
    pub async fn undo(&mut self, ledger: &dyn LedgerApi) -> Result<UndoOutcome> {
        let reverted = self.last_scan.take().ok_or(Error::NoOp)?;
        let compensating = reverted.negated();

        tracing::info!(
            client = %reverted.client,
            container = %reverted.container,
            qty = compensating.quantity,
            "Submitting undo"
        );

        match ledger.submit(&compensating).await {
            Ok(result) => Ok(UndoOutcome { reverted, result }),
            Err(e) => {
                tracing::warn!(
                    client = %reverted.client,
                    container = %reverted.container,
                    error = %e,
                    "Undo submission failed, slot already cleared"
                );
                Err(e)
            }
        }
    }
}
