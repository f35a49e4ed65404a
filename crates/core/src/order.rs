//! Purchase and sales order rules.
//!
//! Orders own the creation of their installments and trigger the stock ledger
//! on receipt (purchase) or delivery (sale). Their payment lifecycle belongs to
//! the payable and receivable modules.

use std::fmt;

use ledgerly_shared::types::round_money;
use ledgerly_shared::{AppError, ErrorKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::access::AccessError;
use crate::installment::InstallmentError;
use crate::stock::StockError;

/// Purchase order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PurchaseOrderStatus {
    /// Placed, not yet received.
    Open,
    /// Goods received into stock.
    Received,
    /// Canceled.
    Canceled,
}

impl PurchaseOrderStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Received => "RECEIVED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sales order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SalesOrderStatus {
    /// Placed, not yet delivered.
    Open,
    /// Goods delivered out of stock.
    Delivered,
    /// Canceled.
    Canceled,
}

impl SalesOrderStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Delivered => "DELIVERED",
            Self::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for SalesOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Product ordered.
    pub product_id: Uuid,
    /// Quantity (may be fractional).
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub quantity: Decimal,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub unit_price: Decimal,
}

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order not found.
    #[error("Order {0} not found")]
    NotFound(Uuid),

    /// An order needs at least one line.
    #[error("Order must have at least one item")]
    NoItems,

    /// Line quantity must be positive.
    #[error("Quantity must be greater than zero (product {0})")]
    InvalidQuantity(Uuid),

    /// Unit price must not be negative.
    #[error("Unit price must not be negative (product {0})")]
    InvalidUnitPrice(Uuid),

    /// Product referenced by a line does not exist.
    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    /// Purchase order already received.
    #[error("Purchase order {0} has already been received")]
    AlreadyReceived(Uuid),

    /// Sales order already delivered.
    #[error("Sales order {0} has already been delivered")]
    AlreadyDelivered(Uuid),

    /// Order is canceled.
    #[error("Order {0} is canceled")]
    Canceled(Uuid),

    /// Only open orders can be canceled.
    #[error("Only open orders can be canceled (order {id} is {status})")]
    CannotCancel {
        /// Order ID.
        id: Uuid,
        /// Current status.
        status: String,
    },

    /// Installment planning failed.
    #[error(transparent)]
    Installment(#[from] InstallmentError),

    /// Stock check failed.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Actor may not perform the operation.
    #[error(transparent)]
    Forbidden(#[from] AccessError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl OrderError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ORDER_NOT_FOUND",
            Self::NoItems => "NO_ITEMS",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::InvalidUnitPrice(_) => "INVALID_UNIT_PRICE",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::AlreadyReceived(_) => "ALREADY_RECEIVED",
            Self::AlreadyDelivered(_) => "ALREADY_DELIVERED",
            Self::Canceled(_) => "ORDER_CANCELED",
            Self::CannotCancel { .. } => "CANNOT_CANCEL",
            Self::Installment(e) => e.error_code(),
            Self::Stock(e) => e.error_code(),
            Self::Forbidden(_) => "ROLE_NOT_ALLOWED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoItems | Self::InvalidQuantity(_) | Self::InvalidUnitPrice(_) => {
                ErrorKind::Validation
            }
            Self::NotFound(_) | Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyReceived(_)
            | Self::AlreadyDelivered(_)
            | Self::Canceled(_)
            | Self::CannotCancel { .. } => ErrorKind::BadRequest,
            Self::Installment(e) => e.kind(),
            Self::Stock(e) => e.kind(),
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        Self::new(err.kind(), err.error_code(), err.to_string())
    }
}

/// Stateless service for order rules.
pub struct OrderService;

impl OrderService {
    /// Validate order lines.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty order, a non-positive quantity
    /// or a negative unit price.
    pub fn validate_lines(lines: &[OrderLine]) -> Result<(), OrderError> {
        if lines.is_empty() {
            return Err(OrderError::NoItems);
        }
        for line in lines {
            if line.quantity <= Decimal::ZERO {
                return Err(OrderError::InvalidQuantity(line.product_id));
            }
            if line.unit_price < Decimal::ZERO {
                return Err(OrderError::InvalidUnitPrice(line.product_id));
            }
        }
        Ok(())
    }

    /// Order total: sum of quantity × unit price, rounded to cents.
    #[must_use]
    pub fn total(lines: &[OrderLine]) -> Decimal {
        round_money(lines.iter().map(|l| l.quantity * l.unit_price).sum())
    }

    /// Validate that a purchase order can be received.
    ///
    /// # Errors
    ///
    /// Returns an error if the order was already received or is canceled.
    pub fn validate_receive(id: Uuid, status: PurchaseOrderStatus) -> Result<(), OrderError> {
        match status {
            PurchaseOrderStatus::Open => Ok(()),
            PurchaseOrderStatus::Received => Err(OrderError::AlreadyReceived(id)),
            PurchaseOrderStatus::Canceled => Err(OrderError::Canceled(id)),
        }
    }

    /// Validate that a sales order can be delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the order was already delivered or is canceled.
    pub fn validate_deliver(id: Uuid, status: SalesOrderStatus) -> Result<(), OrderError> {
        match status {
            SalesOrderStatus::Open => Ok(()),
            SalesOrderStatus::Delivered => Err(OrderError::AlreadyDelivered(id)),
            SalesOrderStatus::Canceled => Err(OrderError::Canceled(id)),
        }
    }

    /// Validate that a purchase order can be canceled.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::CannotCancel` unless the order is OPEN.
    pub fn validate_cancel_purchase(
        id: Uuid,
        status: PurchaseOrderStatus,
    ) -> Result<(), OrderError> {
        match status {
            PurchaseOrderStatus::Open => Ok(()),
            other => Err(OrderError::CannotCancel {
                id,
                status: other.to_string(),
            }),
        }
    }

    /// Validate that a sales order can be canceled.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::CannotCancel` unless the order is OPEN.
    pub fn validate_cancel_sale(id: Uuid, status: SalesOrderStatus) -> Result<(), OrderError> {
        match status {
            SalesOrderStatus::Open => Ok(()),
            other => Err(OrderError::CannotCancel {
                id,
                status: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_price: Decimal) -> OrderLine {
        OrderLine {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_total_rounds_to_cents() {
        let lines = [line(dec!(3), dec!(33.333)), line(dec!(0.5), dec!(10.01))];
        // 99.999 + 5.005 = 105.004
        assert_eq!(OrderService::total(&lines), dec!(105.00));
    }

    #[rstest]
    #[case(vec![], Some("NO_ITEMS"))]
    #[case(vec![line(dec!(0), dec!(1))], Some("INVALID_QUANTITY"))]
    #[case(vec![line(dec!(1), dec!(-1))], Some("INVALID_UNIT_PRICE"))]
    #[case(vec![line(dec!(1), dec!(0))], None)]
    fn test_validate_lines(#[case] lines: Vec<OrderLine>, #[case] expected: Option<&str>) {
        let result = OrderService::validate_lines(&lines);
        assert_eq!(result.err().map(|e| e.error_code()), expected);
    }

    #[rstest]
    #[case(PurchaseOrderStatus::Open, None)]
    #[case(PurchaseOrderStatus::Received, Some("ALREADY_RECEIVED"))]
    #[case(PurchaseOrderStatus::Canceled, Some("ORDER_CANCELED"))]
    fn test_receive_preconditions(
        #[case] status: PurchaseOrderStatus,
        #[case] expected: Option<&str>,
    ) {
        let result = OrderService::validate_receive(Uuid::new_v4(), status);
        assert_eq!(result.err().map(|e| e.error_code()), expected);
    }

    #[rstest]
    #[case(SalesOrderStatus::Open, None)]
    #[case(SalesOrderStatus::Delivered, Some("ALREADY_DELIVERED"))]
    #[case(SalesOrderStatus::Canceled, Some("ORDER_CANCELED"))]
    fn test_deliver_preconditions(#[case] status: SalesOrderStatus, #[case] expected: Option<&str>) {
        let result = OrderService::validate_deliver(Uuid::new_v4(), status);
        assert_eq!(result.err().map(|e| e.error_code()), expected);
    }

    #[test]
    fn test_cancel_only_open() {
        let id = Uuid::new_v4();
        assert!(OrderService::validate_cancel_purchase(id, PurchaseOrderStatus::Open).is_ok());
        assert!(OrderService::validate_cancel_sale(id, SalesOrderStatus::Open).is_ok());
        let err = OrderService::validate_cancel_sale(id, SalesOrderStatus::Delivered).unwrap_err();
        assert!(err.to_string().ends_with("is DELIVERED)"));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_wrapped_errors_keep_their_kind() {
        let err: OrderError = StockError::ProductNotFound(Uuid::nil()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.error_code(), "PRODUCT_NOT_FOUND");
    }
}
