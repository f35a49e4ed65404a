//! Repository abstractions for data access.
//!
//! Repositories run the `ledgerly-core` rules inside database transactions,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod cash_journal;
pub mod investor;
pub mod order;
pub mod payable;
pub mod receivable;
pub mod stock;

pub use cash_journal::CashJournalRepository;
pub use investor::{CreateInvestor, InvestorRepository};
pub use order::{
    CreateOrder, CreatedInstallments, OrderRepository, PurchaseOrderDetail, SalesOrderDetail,
};
pub use payable::{
    CreatePayable, PayPayable, PayableRepository, PayableReversal, PayableWithSources,
    UpdatePayable,
};
pub use receivable::{
    CreateReceivable, ReceivableRepository, ReceiveReceivable, UpdateReceivable,
};
pub use stock::{AdjustmentResult, StockRepository};

use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use uuid::Uuid;

use crate::entities::{categories, payment_methods};

pub(crate) async fn category_exists<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<bool, DbErr> {
    Ok(categories::Entity::find_by_id(id).one(conn).await?.is_some())
}

pub(crate) async fn payment_method_exists<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<bool, DbErr> {
    Ok(payment_methods::Entity::find_by_id(id)
        .one(conn)
        .await?
        .is_some())
}
