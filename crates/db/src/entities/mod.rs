//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts_payable;
pub mod accounts_receivable;
pub mod cash_transactions;
pub mod categories;
pub mod investors;
pub mod payment_methods;
pub mod payment_sources;
pub mod products;
pub mod purchase_order_items;
pub mod purchase_orders;
pub mod sales_order_items;
pub mod sales_orders;
pub mod sea_orm_active_enums;
pub mod stock_adjustments;
pub mod stock_balances;
pub mod stock_movements;
