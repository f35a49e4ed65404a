//! Payable rules: pay, reverse, edit guards and the delivery-cost flag.
//!
//! Every check runs before the database layer writes anything, so a rejected
//! request never leaves a partially paid payable behind.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use ledgerly_shared::types::Tolerance;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::PayableError;
use super::types::{
    FundingInvestor, PayableSnapshot, PayableStatus, PaymentPlan, PaymentSpec, PlannedSource,
};
use crate::journal::NewCashTransaction;

/// Stateless service for payable lifecycle rules.
pub struct PayableService;

impl PayableService {
    /// Validate the fields of a new or edited payable.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or the description is blank.
    pub fn validate_fields(amount: Decimal, description: &str) -> Result<(), PayableError> {
        if amount <= Decimal::ZERO {
            return Err(PayableError::InvalidAmount);
        }
        if description.trim().is_empty() {
            return Err(PayableError::DescriptionRequired);
        }
        Ok(())
    }

    /// Validate a payment and build everything it will write.
    ///
    /// Checks, in order:
    /// 1. The payable is OPEN
    /// 2. A single-method payment names its payment method
    /// 3. Every source amount is positive
    /// 4. Source amounts add up to the payable amount (within `tolerance`)
    /// 5. Every requested investor exists and is active
    ///
    /// `investors` holds whatever the caller found for the requested IDs;
    /// missing or inactive entries fail the set-equality check.
    ///
    /// # Errors
    ///
    /// Returns `PayableError` describing the first failed check.
    pub fn plan_payment(
        payable: &PayableSnapshot,
        spec: &PaymentSpec,
        paid_at: Option<DateTime<Utc>>,
        investors: &[FundingInvestor],
        tolerance: Tolerance,
    ) -> Result<PaymentPlan, PayableError> {
        Self::validate_can_pay(payable)?;

        let sources = match spec {
            PaymentSpec::SingleMethod {
                payment_method_id: None,
            } => return Err(PayableError::PaymentMethodRequired),
            PaymentSpec::SingleMethod { .. } => Vec::new(),
            PaymentSpec::SplitSources { sources, .. } => {
                if let Some(bad) = sources.iter().find(|s| s.amount <= Decimal::ZERO) {
                    return Err(PayableError::NonPositiveSourceAmount(bad.investor_id));
                }

                let sources_total: Decimal = sources.iter().map(|s| s.amount).sum();
                if !tolerance.matches(sources_total, payable.amount) {
                    return Err(PayableError::SourceSumMismatch {
                        sources_total,
                        account_amount: payable.amount,
                    });
                }

                let requested: HashSet<Uuid> = sources.iter().map(|s| s.investor_id).collect();
                let active: HashSet<Uuid> = investors
                    .iter()
                    .filter(|i| i.is_active && requested.contains(&i.id))
                    .map(|i| i.id)
                    .collect();
                if active.len() != requested.len() {
                    return Err(PayableError::InvalidInvestors {
                        requested: requested.len(),
                        active: active.len(),
                    });
                }

                sources
                    .iter()
                    .map(|s| PlannedSource {
                        investor_id: s.investor_id,
                        investor_name: investors
                            .iter()
                            .find(|i| i.id == s.investor_id)
                            .map(|i| i.name.clone())
                            .unwrap_or_default(),
                        amount: s.amount,
                    })
                    .collect()
            }
        };

        let paid_at = paid_at.unwrap_or_else(Utc::now);
        let cash = NewCashTransaction::payable_payment(
            payable.id,
            payable.amount,
            paid_at,
            &payable.description,
            payable.category_id,
        );

        Ok(PaymentPlan {
            paid_at,
            payment_method_id: spec.payment_method_id(),
            sources,
            cash,
        })
    }

    /// Validate that a payable can be paid.
    ///
    /// # Errors
    ///
    /// Returns `PayableError::AlreadyPaid` unless the payable is OPEN.
    pub fn validate_can_pay(payable: &PayableSnapshot) -> Result<(), PayableError> {
        match payable.status {
            PayableStatus::Open => Ok(()),
            PayableStatus::Paid => Err(PayableError::AlreadyPaid(payable.id)),
        }
    }

    /// Validate that a payable can be reversed.
    ///
    /// # Errors
    ///
    /// Returns `PayableError::NotPaid` unless the payable is PAID.
    pub fn validate_reverse(payable: &PayableSnapshot) -> Result<(), PayableError> {
        match payable.status {
            PayableStatus::Paid => Ok(()),
            PayableStatus::Open => Err(PayableError::NotPaid(payable.id)),
        }
    }

    /// Validate that a payable can be edited or deleted.
    ///
    /// # Errors
    ///
    /// Returns `PayableError::CannotModifyPaid` if the payable is PAID.
    pub fn validate_can_modify(payable: &PayableSnapshot) -> Result<(), PayableError> {
        match payable.status {
            PayableStatus::Open => Ok(()),
            PayableStatus::Paid => Err(PayableError::CannotModifyPaid(payable.id)),
        }
    }

    /// Validate a bulk delivery-cost flag change.
    ///
    /// `found` holds the `(id, status)` of every requested payable that exists.
    ///
    /// # Errors
    ///
    /// Returns `BulkNotFound` if any ID is missing, or `UnpaidDeliveryCost`
    /// listing the payables that are not PAID.
    pub fn validate_delivery_cost_flag(
        requested: &[Uuid],
        found: &[(Uuid, PayableStatus)],
    ) -> Result<(), PayableError> {
        let requested: HashSet<Uuid> = requested.iter().copied().collect();
        let found_ids: HashSet<Uuid> = found
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| requested.contains(id))
            .collect();
        if found_ids.len() != requested.len() {
            return Err(PayableError::BulkNotFound {
                requested: requested.len(),
                found: found_ids.len(),
            });
        }

        let mut unpaid: Vec<Uuid> = found
            .iter()
            .filter(|(_, status)| *status != PayableStatus::Paid)
            .map(|(id, _)| *id)
            .collect();
        if !unpaid.is_empty() {
            unpaid.sort_unstable();
            unpaid.dedup();
            return Err(PayableError::UnpaidDeliveryCost(unpaid));
        }

        Ok(())
    }
}
