//! Accounts-receivable lifecycle.
//!
//! State machine: OPEN → RECEIVED → OPEN (via reversal), and OPEN → CANCELED
//! (terminal). A receipt journals one incoming cash transaction; a partial
//! receipt journals only the received part and lowers the outstanding amount.
//! Every row keeps its face value in `original_amount`, which is what a
//! reversal restores.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::ReceivableError;
pub use service::ReceivableService;
pub use types::{ReceiptPlan, ReceivableSnapshot, ReceivableStatus, ReversalPlan};
