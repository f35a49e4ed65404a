//! Receivable error types.

use ledgerly_shared::{AppError, ErrorKind};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::ReceivableStatus;
use crate::access::AccessError;

/// Errors that can occur during receivable operations.
#[derive(Debug, Error)]
pub enum ReceivableError {
    /// Receivable not found.
    #[error("Account receivable {0} not found")]
    NotFound(Uuid),

    /// Receipt requested on a receivable that is not open.
    #[error("Account receivable {id} cannot be received (status {status})")]
    NotOpen {
        /// Receivable ID.
        id: Uuid,
        /// Current status.
        status: ReceivableStatus,
    },

    /// Reverse requested on a receivable that is not received.
    #[error("Only received accounts can be reversed (account receivable {id} is {status})")]
    NotReceived {
        /// Receivable ID.
        id: Uuid,
        /// Current status.
        status: ReceivableStatus,
    },

    /// Received receivables are frozen until reversed.
    #[error("Received accounts cannot be modified (account receivable {0})")]
    CannotModifyReceived(Uuid),

    /// Only open receivables can be canceled.
    #[error("Only open accounts can be canceled (account receivable {id} is {status})")]
    CannotCancel {
        /// Receivable ID.
        id: Uuid,
        /// Current status.
        status: ReceivableStatus,
    },

    /// Canceled receivables cannot be edited.
    #[error("Canceled accounts cannot be modified (account receivable {0})")]
    CannotModifyCanceled(Uuid),

    /// Amount must be positive.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// Description is required.
    #[error("Description is required")]
    DescriptionRequired,

    /// Partial receipt larger than what is still outstanding.
    #[error("Received amount {amount} exceeds outstanding amount {outstanding}")]
    ExceedsOutstanding {
        /// Requested receipt.
        amount: Decimal,
        /// Outstanding amount.
        outstanding: Decimal,
    },

    /// Receivables linked to a sales order would exceed the order total.
    #[error(
        "Receivables total {requested_total} exceeds sales order total {order_total} (available: {available})"
    )]
    ExceedsOrderTotal {
        /// Other receivables plus the new amount.
        requested_total: Decimal,
        /// Sales order total.
        order_total: Decimal,
        /// Remaining headroom before the change.
        available: Decimal,
    },

    /// Linked sales order does not exist.
    #[error("Sales order {0} not found")]
    SalesOrderNotFound(Uuid),

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

impl ReceivableError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "RECEIVABLE_NOT_FOUND",
            Self::NotOpen { .. } => "NOT_OPEN",
            Self::NotReceived { .. } => "NOT_RECEIVED",
            Self::CannotModifyReceived(_) => "CANNOT_MODIFY_RECEIVED",
            Self::CannotCancel { .. } => "CANNOT_CANCEL",
            Self::CannotModifyCanceled(_) => "CANNOT_MODIFY_CANCELED",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::DescriptionRequired => "DESCRIPTION_REQUIRED",
            Self::ExceedsOutstanding { .. } => "EXCEEDS_OUTSTANDING",
            Self::ExceedsOrderTotal { .. } => "EXCEEDS_ORDER_TOTAL",
            Self::SalesOrderNotFound(_) => "SALES_ORDER_NOT_FOUND",
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
            Self::InvalidAmount | Self::DescriptionRequired => ErrorKind::Validation,

            Self::NotFound(_)
            | Self::SalesOrderNotFound(_)
            | Self::CategoryNotFound(_)
            | Self::PaymentMethodNotFound(_) => ErrorKind::NotFound,

            Self::NotOpen { .. }
            | Self::NotReceived { .. }
            | Self::CannotModifyReceived(_)
            | Self::CannotCancel { .. }
            | Self::CannotModifyCanceled(_)
            | Self::ExceedsOutstanding { .. }
            | Self::ExceedsOrderTotal { .. } => ErrorKind::BadRequest,

            Self::Forbidden(_) => ErrorKind::Forbidden,

            Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl From<ReceivableError> for AppError {
    fn from(err: ReceivableError) -> Self {
        Self::new(err.kind(), err.error_code(), err.to_string())
    }
}
