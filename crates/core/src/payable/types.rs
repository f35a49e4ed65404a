//! Payable domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::journal::NewCashTransaction;

/// Payable status.
///
/// The valid transitions are:
/// - Open → Paid (pay)
/// - Paid → Open (reverse)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PayableStatus {
    /// Awaiting payment.
    Open,
    /// Paid; a cash transaction exists for it.
    Paid,
}

impl PayableStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Paid => "PAID",
        }
    }
}

impl fmt::Display for PayableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One investor's share of a split payment, as requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSourceInput {
    /// Funding investor.
    pub investor_id: Uuid,
    /// Amount covered by this investor.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
}

/// How a payable is being paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentSpec {
    /// Paid in one go, optionally through a payment method.
    SingleMethod {
        /// Payment method used, if recorded.
        payment_method_id: Option<Uuid>,
    },
    /// Paid by several investors whose shares add up to the payable amount.
    SplitSources {
        /// Payment method used, if recorded.
        payment_method_id: Option<Uuid>,
        /// Investor shares (non-empty).
        sources: Vec<PaymentSourceInput>,
    },
}

impl PaymentSpec {
    /// Builds a spec from the optional request fields.
    ///
    /// An empty source list is the same as no source list.
    #[must_use]
    pub fn from_request(
        payment_method_id: Option<Uuid>,
        sources: Option<Vec<PaymentSourceInput>>,
    ) -> Self {
        match sources {
            Some(sources) if !sources.is_empty() => Self::SplitSources {
                payment_method_id,
                sources,
            },
            _ => Self::SingleMethod { payment_method_id },
        }
    }

    /// Returns the payment method, if any.
    #[must_use]
    pub const fn payment_method_id(&self) -> Option<Uuid> {
        match self {
            Self::SingleMethod { payment_method_id }
            | Self::SplitSources {
                payment_method_id, ..
            } => *payment_method_id,
        }
    }

    /// Returns the requested investor shares (empty for a single method).
    #[must_use]
    pub fn sources(&self) -> &[PaymentSourceInput] {
        match self {
            Self::SingleMethod { .. } => &[],
            Self::SplitSources { sources, .. } => sources,
        }
    }
}

/// Investor data needed to validate a split payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingInvestor {
    /// Investor ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Whether the investor is active.
    pub is_active: bool,
}

/// A validated investor share with the investor's name attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSource {
    /// Funding investor.
    pub investor_id: Uuid,
    /// Investor display name.
    pub investor_name: String,
    /// Amount covered.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
}

/// Everything a payment writes, validated as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPlan {
    /// Payment timestamp.
    pub paid_at: DateTime<Utc>,
    /// Payment method, if recorded.
    pub payment_method_id: Option<Uuid>,
    /// Investor shares to persist (empty for a single method).
    pub sources: Vec<PlannedSource>,
    /// The outgoing cash transaction.
    pub cash: NewCashTransaction,
}

/// Snapshot of a payable used by the rules in `PayableService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayableSnapshot {
    /// Payable ID.
    pub id: Uuid,
    /// Current status.
    pub status: PayableStatus,
    /// Amount owed.
    pub amount: Decimal,
    /// Description.
    pub description: String,
    /// Category, if any.
    pub category_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_sources_is_single_method() {
        let method = Some(Uuid::new_v4());
        let spec = PaymentSpec::from_request(method, Some(vec![]));
        assert_eq!(
            spec,
            PaymentSpec::SingleMethod {
                payment_method_id: method
            }
        );
        assert!(spec.sources().is_empty());
    }

    #[test]
    fn test_sources_make_split() {
        let source = PaymentSourceInput {
            investor_id: Uuid::new_v4(),
            amount: dec!(10),
        };
        let spec = PaymentSpec::from_request(None, Some(vec![source]));
        assert_eq!(spec.sources(), &[source]);
        assert_eq!(spec.payment_method_id(), None);
    }

    #[test]
    fn test_amounts_serialize_as_json_numbers() {
        let source = PlannedSource {
            investor_id: Uuid::nil(),
            investor_name: "Ana".to_string(),
            amount: dec!(100.50),
        };
        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains(r#""amount":100.50"#), "{json}");
    }

    #[test]
    fn test_amounts_keep_full_precision_through_json() {
        let source = PaymentSourceInput {
            investor_id: Uuid::nil(),
            amount: dec!(12345678901234567.8901),
        };
        let json = serde_json::to_string(&source).unwrap();
        assert!(json.contains(r#""amount":12345678901234567.8901"#), "{json}");
        let back: PaymentSourceInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, source);
    }

    #[test]
    fn test_amount_accepts_string_input() {
        let json = format!(r#"{{"investorId":"{}","amount":"40.25"}}"#, Uuid::nil());
        let source: PaymentSourceInput = serde_json::from_str(&json).unwrap();
        assert_eq!(source.amount, dec!(40.25));
    }
}
