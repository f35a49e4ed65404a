//! Accounts-payable lifecycle.
//!
//! State machine: OPEN → PAID → OPEN (via reversal). Paying writes exactly one
//! outgoing cash transaction and, when the payment is split across investors,
//! one payment source per investor. Reversing removes both.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PayableError;
pub use service::PayableService;
pub use types::{
    FundingInvestor, PayableSnapshot, PayableStatus, PaymentPlan, PaymentSourceInput, PaymentSpec,
    PlannedSource,
};
