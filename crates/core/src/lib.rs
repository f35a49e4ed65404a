//! Core ledger-consistency rules for Ledgerly.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Every rule that keeps cash movements, payable/receivable statuses and stock
//! balances mutually consistent lives here; the database layer only loads the
//! rows these functions need and persists the plans they return.
//!
//! # Modules
//!
//! - `access` - Role checks per operation
//! - `journal` - Cash transaction drafts and summaries
//! - `payable` - Accounts-payable lifecycle (pay, reverse, delivery-cost flag)
//! - `receivable` - Accounts-receivable lifecycle (receive, reverse, cancel)
//! - `installment` - Order-to-installment planning
//! - `order` - Purchase and sales order rules
//! - `stock` - Stock ledger movements, adjustments and reconciliation
//! - `investor` - Investor soft-delete capability

pub mod access;
pub mod installment;
pub mod investor;
pub mod journal;
pub mod order;
pub mod payable;
pub mod receivable;
pub mod stock;

pub use access::{AccessError, Operation, authorize};
