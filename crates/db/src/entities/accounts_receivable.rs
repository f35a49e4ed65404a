//! `SeaORM` Entity for accounts_receivable table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ReceivableStatusDb;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts_receivable")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub sales_order_id: Option<Uuid>,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub due_date: Date,
    /// Outstanding amount; lowered by partial receipts.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    /// Face value; restored on reversal.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub original_amount: Decimal,
    pub status: ReceivableStatusDb,
    pub received_at: Option<DateTimeWithTimeZone>,
    pub payment_method_id: Option<Uuid>,
    pub payment_days: Option<i32>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_orders::Entity",
        from = "Column::SalesOrderId",
        to = "super::sales_orders::Column::Id"
    )]
    SalesOrders,
}

impl Related<super::sales_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
