//! Stock ledger.
//!
//! Movements are append-only; the per-product balance is a cache over them.
//! Purchase receipts, sale deliveries and manual adjustments update the cache
//! incrementally, and reconciliation recomputes it from the movement log.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::StockError;
pub use service::StockService;
pub use types::{
    AdjustmentInput, AdjustmentType, DeliveryLine, MovementType, NewStockMovement, ProductType,
    ReceiptLine, ReferenceType,
};
