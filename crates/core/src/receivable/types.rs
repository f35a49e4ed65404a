//! Receivable domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::journal::NewCashTransaction;

/// Receivable status.
///
/// The valid transitions are:
/// - Open → Received (receive, or a partial receipt that clears the balance)
/// - Received → Open (reverse)
/// - Open → Canceled (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReceivableStatus {
    /// Awaiting receipt.
    Open,
    /// Fully received.
    Received,
    /// Canceled; no further transitions.
    Canceled,
}

impl ReceivableStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Received => "RECEIVED",
            Self::Canceled => "CANCELED",
        }
    }

    /// Returns true if rows in this status count against a sales order total.
    #[must_use]
    pub const fn counts_against_order(self) -> bool {
        matches!(self, Self::Open | Self::Received)
    }
}

impl fmt::Display for ReceivableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a receivable used by the rules in `ReceivableService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivableSnapshot {
    /// Receivable ID.
    pub id: Uuid,
    /// Current status.
    pub status: ReceivableStatus,
    /// Outstanding amount.
    pub amount: Decimal,
    /// Face value at creation (or last edit).
    pub original_amount: Decimal,
    /// Description.
    pub description: String,
    /// Category, if any.
    pub category_id: Option<Uuid>,
}

/// Everything a receipt writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptPlan {
    /// Receipt timestamp.
    pub received_at: DateTime<Utc>,
    /// Payment method, if recorded.
    pub payment_method_id: Option<Uuid>,
    /// Status after the receipt.
    pub status: ReceivableStatus,
    /// Outstanding amount stored after the receipt.
    pub amount: Decimal,
    /// The incoming cash transaction.
    pub cash: NewCashTransaction,
}

/// Result of a reversal, reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversalPlan {
    /// Amount the receivable is restored to.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub restored_amount: Decimal,
    /// Number of journal rows removed.
    pub removed_transactions: usize,
    /// Sum of the removed journal rows.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub journaled_total: Decimal,
}
