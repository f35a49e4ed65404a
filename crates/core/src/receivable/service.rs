//! Receivable rules: receive, partial receipt, reverse, edit and cancel guards.

use chrono::{DateTime, Utc};
use ledgerly_shared::types::{Tolerance, headroom};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::ReceivableError;
use super::types::{ReceiptPlan, ReceivableSnapshot, ReceivableStatus, ReversalPlan};
use crate::journal::NewCashTransaction;

/// Stateless service for receivable lifecycle rules.
pub struct ReceivableService;

impl ReceivableService {
    /// Validate the fields of a new or edited receivable.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or the description is blank.
    pub fn validate_fields(amount: Decimal, description: &str) -> Result<(), ReceivableError> {
        if amount <= Decimal::ZERO {
            return Err(ReceivableError::InvalidAmount);
        }
        if description.trim().is_empty() {
            return Err(ReceivableError::DescriptionRequired);
        }
        Ok(())
    }

    /// Plan a full receipt of the outstanding amount.
    ///
    /// # Errors
    ///
    /// Returns `ReceivableError::NotOpen` unless the receivable is OPEN.
    pub fn plan_receive(
        receivable: &ReceivableSnapshot,
        received_at: Option<DateTime<Utc>>,
        payment_method_id: Option<Uuid>,
    ) -> Result<ReceiptPlan, ReceivableError> {
        Self::validate_can_receive(receivable)?;

        let received_at = received_at.unwrap_or_else(Utc::now);
        Ok(ReceiptPlan {
            received_at,
            payment_method_id,
            status: ReceivableStatus::Received,
            amount: receivable.amount,
            cash: Self::receipt_cash(receivable, receivable.amount, received_at),
        })
    }

    /// Plan a partial receipt.
    ///
    /// Journals only `amount` and lowers the outstanding balance by it. When
    /// what is left is zero within `tolerance`, the receivable becomes RECEIVED
    /// and keeps the last outstanding amount, as a full receipt would.
    ///
    /// # Errors
    ///
    /// Returns an error if the receivable is not OPEN, the amount is not
    /// positive, or it exceeds the outstanding amount.
    pub fn plan_partial_receipt(
        receivable: &ReceivableSnapshot,
        amount: Decimal,
        received_at: Option<DateTime<Utc>>,
        payment_method_id: Option<Uuid>,
        tolerance: Tolerance,
    ) -> Result<ReceiptPlan, ReceivableError> {
        Self::validate_can_receive(receivable)?;
        if amount <= Decimal::ZERO {
            return Err(ReceivableError::InvalidAmount);
        }
        if tolerance.exceeds(amount, receivable.amount) {
            return Err(ReceivableError::ExceedsOutstanding {
                amount,
                outstanding: receivable.amount,
            });
        }

        let received_at = received_at.unwrap_or_else(Utc::now);
        let remaining = receivable.amount - amount;
        let (status, stored, journaled) = if tolerance.is_zero(remaining) {
            (
                ReceivableStatus::Received,
                receivable.amount,
                receivable.amount,
            )
        } else {
            (ReceivableStatus::Open, remaining, amount)
        };

        Ok(ReceiptPlan {
            received_at,
            payment_method_id,
            status,
            amount: stored,
            cash: Self::receipt_cash(receivable, journaled, received_at),
        })
    }

    /// Plan a reversal given the amounts of the journal rows to be removed.
    ///
    /// The receivable is restored to its face value; the removed rows are
    /// reported so the caller can confirm what was undone.
    ///
    /// # Errors
    ///
    /// Returns `ReceivableError::NotReceived` unless the receivable is RECEIVED.
    pub fn plan_reverse(
        receivable: &ReceivableSnapshot,
        journaled: &[Decimal],
    ) -> Result<ReversalPlan, ReceivableError> {
        if receivable.status != ReceivableStatus::Received {
            return Err(ReceivableError::NotReceived {
                id: receivable.id,
                status: receivable.status,
            });
        }

        Ok(ReversalPlan {
            restored_amount: receivable.original_amount,
            removed_transactions: journaled.len(),
            journaled_total: journaled.iter().copied().sum(),
        })
    }

    /// Validate that a receivable can be edited or deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the receivable is RECEIVED or CANCELED.
    pub fn validate_can_modify(receivable: &ReceivableSnapshot) -> Result<(), ReceivableError> {
        match receivable.status {
            ReceivableStatus::Open => Ok(()),
            ReceivableStatus::Received => Err(ReceivableError::CannotModifyReceived(receivable.id)),
            ReceivableStatus::Canceled => Err(ReceivableError::CannotModifyCanceled(receivable.id)),
        }
    }

    /// Validate that a receivable can be canceled.
    ///
    /// # Errors
    ///
    /// Returns `ReceivableError::CannotCancel` unless the receivable is OPEN.
    pub fn validate_cancel(receivable: &ReceivableSnapshot) -> Result<(), ReceivableError> {
        match receivable.status {
            ReceivableStatus::Open => Ok(()),
            status => Err(ReceivableError::CannotCancel {
                id: receivable.id,
                status,
            }),
        }
    }

    /// Face value after editing the outstanding amount to `new_amount`.
    ///
    /// Whatever was already received through partial receipts stays received.
    #[must_use]
    pub fn edited_face_value(receivable: &ReceivableSnapshot, new_amount: Decimal) -> Decimal {
        new_amount + (receivable.original_amount - receivable.amount)
    }

    /// Check that receivables linked to a sales order stay within its total.
    ///
    /// `others_total` is the face value of every other OPEN or RECEIVED
    /// receivable of the order.
    ///
    /// # Errors
    ///
    /// Returns `ReceivableError::ExceedsOrderTotal` with the remaining headroom.
    pub fn check_order_headroom(
        order_total: Decimal,
        others_total: Decimal,
        new_amount: Decimal,
        tolerance: Tolerance,
    ) -> Result<(), ReceivableError> {
        let requested_total = others_total + new_amount;
        if tolerance.exceeds(requested_total, order_total) {
            return Err(ReceivableError::ExceedsOrderTotal {
                requested_total,
                order_total,
                available: headroom(order_total, others_total),
            });
        }
        Ok(())
    }

    /// Validate that a receivable can take a receipt.
    ///
    /// # Errors
    ///
    /// Returns `ReceivableError::NotOpen` unless the receivable is OPEN.
    pub fn validate_can_receive(receivable: &ReceivableSnapshot) -> Result<(), ReceivableError> {
        if receivable.status == ReceivableStatus::Open {
            Ok(())
        } else {
            Err(ReceivableError::NotOpen {
                id: receivable.id,
                status: receivable.status,
            })
        }
    }

    fn receipt_cash(
        receivable: &ReceivableSnapshot,
        amount: Decimal,
        received_at: DateTime<Utc>,
    ) -> NewCashTransaction {
        NewCashTransaction::receivable_receipt(
            receivable.id,
            amount,
            received_at,
            &receivable.description,
            receivable.category_id,
        )
    }
}
