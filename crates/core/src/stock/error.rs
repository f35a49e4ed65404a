//! Stock ledger error types.

use ledgerly_shared::{AppError, ErrorKind};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::access::AccessError;

/// Errors that can occur during stock operations.
#[derive(Debug, Error)]
pub enum StockError {
    /// Not enough stock for a delivery.
    #[error("Insufficient stock for product {product_name}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Product ID.
        product_id: Uuid,
        /// Product name.
        product_name: String,
        /// Current balance.
        available: Decimal,
        /// Total requested by the order.
        requested: Decimal,
    },

    /// Adjustment quantity must not be zero.
    #[error("Adjustment quantity must not be zero")]
    ZeroQuantity,

    /// Adjustment reason is required.
    #[error("reason is required")]
    ReasonRequired,

    /// Damage adjustments need a photo.
    #[error("photo is required for AVARIA adjustments")]
    PhotoRequired,

    /// Product not found.
    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    /// Services do not have stock.
    #[error("Product {0} is a service and has no stock")]
    ServiceProduct(Uuid),

    /// Actor may not perform the operation.
    #[error(transparent)]
    Forbidden(#[from] AccessError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl StockError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::ZeroQuantity => "ZERO_QUANTITY",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::PhotoRequired => "PHOTO_REQUIRED",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::ServiceProduct(_) => "SERVICE_PRODUCT",
            Self::Forbidden(_) => "ROLE_NOT_ALLOWED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroQuantity | Self::ReasonRequired | Self::PhotoRequired => {
                ErrorKind::Validation
            }
            Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientStock { .. } | Self::ServiceProduct(_) => ErrorKind::BadRequest,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        Self::new(err.kind(), err.error_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_stock_names_product_and_available() {
        let err = StockError::InsufficientStock {
            product_id: Uuid::nil(),
            product_name: "Flour 25kg".to_string(),
            available: dec!(4),
            requested: dec!(5),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product Flour 25kg: available 4, requested 5"
        );
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_photo_required_is_validation() {
        let app: AppError = StockError::PhotoRequired.into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.error_code(), "VALIDATION");
        assert!(app.message().contains("photo"));
    }
}
