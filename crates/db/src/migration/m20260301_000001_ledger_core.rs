//! Ledger core schema.
//!
//! Tables are generated from the entities so the same migration runs on
//! PostgreSQL and on SQLite (used by the integration tests).

use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entities::{
    accounts_payable, accounts_receivable, cash_transactions, categories, investors,
    payment_methods, payment_sources, products, purchase_order_items, purchase_orders,
    sales_order_items, sales_orders, stock_adjustments, stock_balances, stock_movements,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create_table<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity))
        .await
}

async fn drop_table<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Referenced tables first.
        create_table(manager, &schema, investors::Entity).await?;
        create_table(manager, &schema, categories::Entity).await?;
        create_table(manager, &schema, payment_methods::Entity).await?;
        create_table(manager, &schema, products::Entity).await?;
        create_table(manager, &schema, purchase_orders::Entity).await?;
        create_table(manager, &schema, purchase_order_items::Entity).await?;
        create_table(manager, &schema, sales_orders::Entity).await?;
        create_table(manager, &schema, sales_order_items::Entity).await?;
        create_table(manager, &schema, accounts_payable::Entity).await?;
        create_table(manager, &schema, payment_sources::Entity).await?;
        create_table(manager, &schema, accounts_receivable::Entity).await?;
        create_table(manager, &schema, cash_transactions::Entity).await?;
        create_table(manager, &schema, stock_balances::Entity).await?;
        create_table(manager, &schema, stock_movements::Entity).await?;
        create_table(manager, &schema, stock_adjustments::Entity).await?;

        // Upsert key for the balance cache
        manager
            .create_index(
                Index::create()
                    .name("idx_stock_balances_product")
                    .table(stock_balances::Entity)
                    .col(stock_balances::Column::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Reversal lookups by (origin, origin_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_cash_transactions_origin")
                    .table(cash_transactions::Entity)
                    .col(cash_transactions::Column::Origin)
                    .col(cash_transactions::Column::OriginId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_movements_product")
                    .table(stock_movements::Entity)
                    .col(stock_movements::Column::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_sources_investor")
                    .table(payment_sources::Entity)
                    .col(payment_sources::Column::InvestorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, stock_adjustments::Entity).await?;
        drop_table(manager, stock_movements::Entity).await?;
        drop_table(manager, stock_balances::Entity).await?;
        drop_table(manager, cash_transactions::Entity).await?;
        drop_table(manager, accounts_receivable::Entity).await?;
        drop_table(manager, payment_sources::Entity).await?;
        drop_table(manager, accounts_payable::Entity).await?;
        drop_table(manager, sales_order_items::Entity).await?;
        drop_table(manager, sales_orders::Entity).await?;
        drop_table(manager, purchase_order_items::Entity).await?;
        drop_table(manager, purchase_orders::Entity).await?;
        drop_table(manager, products::Entity).await?;
        drop_table(manager, payment_methods::Entity).await?;
        drop_table(manager, categories::Entity).await?;
        drop_table(manager, investors::Entity).await?;
        Ok(())
    }
}
