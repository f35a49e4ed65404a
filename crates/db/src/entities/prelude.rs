//! Entity re-exports.

pub use super::accounts_payable::Entity as AccountsPayable;
pub use super::accounts_receivable::Entity as AccountsReceivable;
pub use super::cash_transactions::Entity as CashTransactions;
pub use super::categories::Entity as Categories;
pub use super::investors::Entity as Investors;
pub use super::payment_methods::Entity as PaymentMethods;
pub use super::payment_sources::Entity as PaymentSources;
pub use super::products::Entity as Products;
pub use super::purchase_order_items::Entity as PurchaseOrderItems;
pub use super::purchase_orders::Entity as PurchaseOrders;
pub use super::sales_order_items::Entity as SalesOrderItems;
pub use super::sales_orders::Entity as SalesOrders;
pub use super::stock_adjustments::Entity as StockAdjustments;
pub use super::stock_balances::Entity as StockBalances;
pub use super::stock_movements::Entity as StockMovements;
