//! Order-to-installment planning.
//!
//! Each installment of a purchase order becomes one OPEN payable, each
//! installment of a sales order one OPEN receivable. The whole batch is
//! validated before anything is written.

use chrono::NaiveDate;
use ledgerly_shared::types::{Tolerance, headroom};
use ledgerly_shared::{AppError, ErrorKind};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Which kind of order the installments belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    /// Installments become payables.
    Purchase,
    /// Installments become receivables.
    Sale,
}

/// One requested installment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentInput {
    /// Installment amount.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    /// Due date.
    pub due_date: NaiveDate,
    /// Description; defaulted from the order when absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Payment method, if known up front.
    #[serde(default)]
    pub payment_method_id: Option<Uuid>,
    /// Category.
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

/// The order an installment batch is planned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderContext {
    /// Order ID.
    pub order_id: Uuid,
    /// Purchase or sale.
    pub kind: OrderKind,
    /// Order date, used for `payment_days`.
    pub order_date: NaiveDate,
    /// Order total.
    pub total: Decimal,
    /// Face value of installments already linked to the order.
    pub existing_total: Decimal,
}

/// A validated installment ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedInstallment {
    /// Amount.
    pub amount: Decimal,
    /// Due date.
    pub due_date: NaiveDate,
    /// Final description.
    pub description: String,
    /// Payment method.
    pub payment_method_id: Option<Uuid>,
    /// Category.
    pub category_id: Option<Uuid>,
    /// Days between order date and due date, when positive.
    pub payment_days: Option<i32>,
}

/// Errors that can occur while planning installments.
#[derive(Debug, Error)]
pub enum InstallmentError {
    /// Installment amount must be positive.
    #[error("Installment {index} amount must be greater than zero")]
    InvalidAmount {
        /// 1-based position in the batch.
        index: usize,
    },

    /// Installments would exceed the order total.
    #[error(
        "Installments total {installments_total} exceeds order total {order_total} (available: {available})"
    )]
    ExceedsOrderTotal {
        /// Existing plus new installments.
        installments_total: Decimal,
        /// Order total.
        order_total: Decimal,
        /// Headroom left before this batch.
        available: Decimal,
    },

    /// Referenced payment method does not exist.
    #[error("Payment method {0} not found")]
    PaymentMethodNotFound(Uuid),

    /// Referenced category does not exist.
    #[error("Category {0} not found")]
    CategoryNotFound(Uuid),
}

impl InstallmentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::ExceedsOrderTotal { .. } => "EXCEEDS_ORDER_TOTAL",
            Self::PaymentMethodNotFound(_) => "PAYMENT_METHOD_NOT_FOUND",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount { .. } => ErrorKind::Validation,
            Self::PaymentMethodNotFound(_) | Self::CategoryNotFound(_) => ErrorKind::NotFound,
            Self::ExceedsOrderTotal { .. } => ErrorKind::BadRequest,
        }
    }
}

impl From<InstallmentError> for AppError {
    fn from(err: InstallmentError) -> Self {
        Self::new(err.kind(), err.error_code(), err.to_string())
    }
}

/// Stateless service for installment planning.
pub struct InstallmentService;

impl InstallmentService {
    /// Validate a batch of installments and resolve their final fields.
    ///
    /// `payment_method_exists` and `category_exists` are existence lookups;
    /// a single missing reference fails the whole batch.
    ///
    /// # Errors
    ///
    /// Returns `InstallmentError` for a non-positive amount, a missing
    /// reference, or a batch that pushes the order past its total.
    pub fn plan<P, C>(
        order: &OrderContext,
        inputs: &[InstallmentInput],
        tolerance: Tolerance,
        payment_method_exists: P,
        category_exists: C,
    ) -> Result<Vec<PlannedInstallment>, InstallmentError>
    where
        P: Fn(Uuid) -> bool,
        C: Fn(Uuid) -> bool,
    {
        for (i, input) in inputs.iter().enumerate() {
            if input.amount <= Decimal::ZERO {
                return Err(InstallmentError::InvalidAmount { index: i + 1 });
            }
            if let Some(id) = input.payment_method_id.filter(|id| !payment_method_exists(*id)) {
                return Err(InstallmentError::PaymentMethodNotFound(id));
            }
            if let Some(id) = input.category_id.filter(|id| !category_exists(*id)) {
                return Err(InstallmentError::CategoryNotFound(id));
            }
        }

        let new_total: Decimal = inputs.iter().map(|i| i.amount).sum();
        let installments_total = order.existing_total + new_total;
        if tolerance.exceeds(installments_total, order.total) {
            return Err(InstallmentError::ExceedsOrderTotal {
                installments_total,
                order_total: order.total,
                available: headroom(order.total, order.existing_total),
            });
        }

        let count = inputs.len();
        Ok(inputs
            .iter()
            .enumerate()
            .map(|(i, input)| PlannedInstallment {
                amount: input.amount,
                due_date: input.due_date,
                description: input
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map_or_else(
                        || Self::default_description(order.order_id, i + 1, count),
                        str::to_string,
                    ),
                payment_method_id: input.payment_method_id,
                category_id: input.category_id,
                payment_days: Self::payment_days(order, input.due_date),
            })
            .collect())
    }

    /// "Order #<short-id>" for a single installment, with "- Installment i/N" appended otherwise.
    #[must_use]
    pub fn default_description(order_id: Uuid, index: usize, count: usize) -> String {
        let id = order_id.simple().to_string();
        let short = &id[..8];
        if count > 1 {
            format!("Order #{short} - Installment {index}/{count}")
        } else {
            format!("Order #{short}")
        }
    }

    fn payment_days(order: &OrderContext, due_date: NaiveDate) -> Option<i32> {
        if order.kind != OrderKind::Sale {
            return None;
        }
        let days = (due_date - order.order_date).num_days();
        if days > 0 {
            i32::try_from(days).ok()
        } else {
            None
        }
    }
}
