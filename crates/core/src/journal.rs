//! Cash journal: append-only record of money movements.
//!
//! Entries are written by the payable and receivable lifecycles and are never
//! edited. A reversal removes every entry with the matching `(origin, origin_id)`
//! pair instead of posting a counter-entry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Direction of a money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CashDirection {
    /// Money coming in.
    In,
    /// Money going out.
    Out,
}

impl CashDirection {
    /// Returns the string representation of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }
}

impl fmt::Display for CashDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which record produced a cash transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CashOrigin {
    /// Payment of an accounts-payable row.
    Ap,
    /// Receipt of an accounts-receivable row.
    Ar,
    /// Manually entered movement.
    Manual,
}

impl CashOrigin {
    /// Returns the string representation of the origin.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ap => "AP",
            Self::Ar => "AR",
            Self::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for CashOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cash transaction ready to be appended to the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCashTransaction {
    /// IN or OUT.
    pub direction: CashDirection,
    /// Producing record type.
    pub origin: CashOrigin,
    /// Producing record ID.
    pub origin_id: Uuid,
    /// Movement date.
    pub date: DateTime<Utc>,
    /// Unsigned amount.
    pub amount: Decimal,
    /// Description copied from the producing record.
    pub description: String,
    /// Optional category.
    pub category_id: Option<Uuid>,
}

impl NewCashTransaction {
    /// Outgoing movement for the payment of a payable.
    #[must_use]
    pub fn payable_payment(
        payable_id: Uuid,
        amount: Decimal,
        paid_at: DateTime<Utc>,
        description: &str,
        category_id: Option<Uuid>,
    ) -> Self {
        Self {
            direction: CashDirection::Out,
            origin: CashOrigin::Ap,
            origin_id: payable_id,
            date: paid_at,
            amount,
            description: description.to_string(),
            category_id,
        }
    }

    /// Incoming movement for the receipt of a receivable.
    #[must_use]
    pub fn receivable_receipt(
        receivable_id: Uuid,
        amount: Decimal,
        received_at: DateTime<Utc>,
        description: &str,
        category_id: Option<Uuid>,
    ) -> Self {
        Self {
            direction: CashDirection::In,
            origin: CashOrigin::Ar,
            origin_id: receivable_id,
            date: received_at,
            amount,
            description: description.to_string(),
            category_id,
        }
    }
}

/// Totals over a set of journal entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CashSummary {
    /// Sum of IN amounts.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_in: Decimal,
    /// Sum of OUT amounts.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_out: Decimal,
    /// `total_in - total_out`.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub net: Decimal,
    /// Number of entries summarized.
    pub count: usize,
}

impl CashSummary {
    /// Summarizes `(direction, amount)` pairs.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (CashDirection, Decimal)>,
    {
        let mut summary = Self::default();
        for (direction, amount) in entries {
            match direction {
                CashDirection::In => summary.total_in += amount.abs(),
                CashDirection::Out => summary.total_out += amount.abs(),
            }
            summary.count += 1;
        }
        summary.net = summary.total_in - summary.total_out;
        summary
    }
}
