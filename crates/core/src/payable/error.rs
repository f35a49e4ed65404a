//! Payable error types.

use ledgerly_shared::{AppError, ErrorKind};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::access::AccessError;

/// Errors that can occur during payable operations.
#[derive(Debug, Error)]
pub enum PayableError {
    /// Payable not found.
    #[error("Account payable {0} not found")]
    NotFound(Uuid),

    /// Pay was requested on a payable that is already paid.
    #[error("Account payable {0} is already paid")]
    AlreadyPaid(Uuid),

    /// Reverse was requested on a payable that is not paid.
    #[error("Only paid accounts can be reversed (account payable {0} is open)")]
    NotPaid(Uuid),

    /// Paid payables are frozen until reversed.
    #[error("Paid accounts cannot be modified (account payable {0})")]
    CannotModifyPaid(Uuid),

    /// Payment sources do not add up to the payable amount.
    #[error(
        "Payment sources total {sources_total} does not match account amount {account_amount}"
    )]
    SourceSumMismatch {
        /// Sum of the source amounts.
        sources_total: Decimal,
        /// The payable amount.
        account_amount: Decimal,
    },

    /// A payment source has a zero or negative amount.
    #[error("Payment source amount must be positive (investor {0})")]
    NonPositiveSourceAmount(Uuid),

    /// Some requested investors do not exist or are inactive.
    #[error("Invalid investors: {active} of {requested} requested investors exist and are active")]
    InvalidInvestors {
        /// Distinct investor IDs requested.
        requested: usize,
        /// Matched active investors.
        active: usize,
    },

    /// A payment without investor sources must name its payment method.
    #[error("Payment method is required when no payment sources are given")]
    PaymentMethodRequired,

    /// Amount must be positive.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// Description is required.
    #[error("Description is required")]
    DescriptionRequired,

    /// Some payables in a bulk flag request do not exist.
    #[error("Accounts payable not found: requested {requested}, found {found}")]
    BulkNotFound {
        /// IDs requested.
        requested: usize,
        /// IDs found.
        found: usize,
    },

    /// Delivery-cost flag requested for unpaid payables.
    #[error("Cannot flag unpaid expenses as delivery cost: {}", format_ids(.0))]
    UnpaidDeliveryCost(Vec<Uuid>),

    /// Referenced category does not exist.
    #[error("Category {0} not found")]
    CategoryNotFound(Uuid),

    /// Referenced payment method does not exist.
    #[error("Payment method {0} not found")]
    PaymentMethodNotFound(Uuid),

    /// Actor may not perform the operation.
    #[error(transparent)]
    Forbidden(#[from] AccessError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

fn format_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl PayableError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PAYABLE_NOT_FOUND",
            Self::AlreadyPaid(_) => "ALREADY_PAID",
            Self::NotPaid(_) => "NOT_PAID",
            Self::CannotModifyPaid(_) => "CANNOT_MODIFY_PAID",
            Self::SourceSumMismatch { .. } => "SOURCE_SUM_MISMATCH",
            Self::NonPositiveSourceAmount(_) => "NON_POSITIVE_SOURCE_AMOUNT",
            Self::InvalidInvestors { .. } => "INVALID_INVESTORS",
            Self::PaymentMethodRequired => "PAYMENT_METHOD_REQUIRED",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::DescriptionRequired => "DESCRIPTION_REQUIRED",
            Self::BulkNotFound { .. } => "PAYABLES_NOT_FOUND",
            Self::UnpaidDeliveryCost(_) => "UNPAID_DELIVERY_COST",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::PaymentMethodNotFound(_) => "PAYMENT_METHOD_NOT_FOUND",
            Self::Forbidden(_) => "ROLE_NOT_ALLOWED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount
            | Self::DescriptionRequired
            | Self::NonPositiveSourceAmount(_)
            | Self::PaymentMethodRequired => ErrorKind::Validation,

            Self::NotFound(_)
            | Self::BulkNotFound { .. }
            | Self::CategoryNotFound(_)
            | Self::PaymentMethodNotFound(_) => ErrorKind::NotFound,

            Self::AlreadyPaid(_)
            | Self::NotPaid(_)
            | Self::CannotModifyPaid(_)
            | Self::SourceSumMismatch { .. }
            | Self::InvalidInvestors { .. }
            | Self::UnpaidDeliveryCost(_) => ErrorKind::BadRequest,

            Self::Forbidden(_) => ErrorKind::Forbidden,

            Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl From<PayableError> for AppError {
    fn from(err: PayableError) -> Self {
        Self::new(err.kind(), err.error_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sum_mismatch_message_cites_both_values() {
        let err = PayableError::SourceSumMismatch {
            sources_total: dec!(149.00),
            account_amount: dec!(150.00),
        };
        assert_eq!(
            err.to_string(),
            "Payment sources total 149.00 does not match account amount 150.00"
        );
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(PayableError::NotFound(Uuid::nil()).kind(), ErrorKind::NotFound);
        assert_eq!(PayableError::AlreadyPaid(Uuid::nil()).kind(), ErrorKind::BadRequest);
        assert_eq!(PayableError::InvalidAmount.kind(), ErrorKind::Validation);
        assert_eq!(
            PayableError::Database("boom".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = PayableError::NotPaid(Uuid::nil()).into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.detail_code(), "NOT_PAID");
        assert!(app.message().starts_with("Only paid accounts can be reversed"));
    }
}
