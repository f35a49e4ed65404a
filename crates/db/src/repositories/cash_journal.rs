//! Cash journal repository.
//!
//! The journal is append-only from the ledger's point of view: payable and
//! receivable operations append entries through [`append`] and reversals
//! remove every entry of an origin through [`remove_for_origin`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use ledgerly_core::journal::{CashDirection, CashOrigin, CashSummary, NewCashTransaction};

use crate::entities::cash_transactions;
use crate::entities::sea_orm_active_enums::CashOriginDb;

/// Appends one entry to the journal.
pub(crate) async fn append<C: ConnectionTrait>(
    conn: &C,
    entry: &NewCashTransaction,
    created_by: Uuid,
) -> Result<cash_transactions::Model, DbErr> {
    let now = Utc::now();
    cash_transactions::ActiveModel {
        id: Set(Uuid::now_v7()),
        direction: Set(entry.direction.into()),
        origin: Set(entry.origin.into()),
        origin_id: Set(entry.origin_id),
        date: Set(entry.date.into()),
        amount: Set(entry.amount),
        description: Set(entry.description.clone()),
        category_id: Set(entry.category_id),
        created_by: Set(created_by),
        created_at: Set(now.into()),
    }
    .insert(conn)
    .await
}

/// Loads every entry produced by one record.
pub(crate) async fn entries_for_origin<C: ConnectionTrait>(
    conn: &C,
    origin: CashOrigin,
    origin_id: Uuid,
) -> Result<Vec<cash_transactions::Model>, DbErr> {
    cash_transactions::Entity::find()
        .filter(cash_transactions::Column::Origin.eq(CashOriginDb::from(origin)))
        .filter(cash_transactions::Column::OriginId.eq(origin_id))
        .order_by_asc(cash_transactions::Column::Date)
        .all(conn)
        .await
}

/// Removes every entry produced by one record. Returns the number removed.
pub(crate) async fn remove_for_origin<C: ConnectionTrait>(
    conn: &C,
    origin: CashOrigin,
    origin_id: Uuid,
) -> Result<u64, DbErr> {
    let result = cash_transactions::Entity::delete_many()
        .filter(cash_transactions::Column::Origin.eq(CashOriginDb::from(origin)))
        .filter(cash_transactions::Column::OriginId.eq(origin_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Read access to the cash journal.
#[derive(Debug, Clone)]
pub struct CashJournalRepository {
    db: DatabaseConnection,
}

impl CashJournalRepository {
    /// Creates a new cash journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the entries produced by a payable or receivable.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_origin(
        &self,
        origin: CashOrigin,
        origin_id: Uuid,
    ) -> Result<Vec<cash_transactions::Model>, DbErr> {
        entries_for_origin(&self.db, origin, origin_id).await
    }

    /// Lists the entries dated within `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<cash_transactions::Model>, DbErr> {
        cash_transactions::Entity::find()
            .filter(cash_transactions::Column::Date.gte(from.fixed_offset()))
            .filter(cash_transactions::Column::Date.lte(to.fixed_offset()))
            .order_by_asc(cash_transactions::Column::Date)
            .all(&self.db)
            .await
    }

    /// Totals IN, OUT and net for the entries dated within `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<CashSummary, DbErr> {
        let entries = self.list_between(from, to).await?;
        Ok(CashSummary::from_entries(
            entries
                .into_iter()
                .map(|e| (CashDirection::from(e.direction), e.amount)),
        ))
    }

    /// Sum of the entries produced by one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn total_for_origin(
        &self,
        origin: CashOrigin,
        origin_id: Uuid,
    ) -> Result<Decimal, DbErr> {
        let entries = entries_for_origin(&self.db, origin, origin_id).await?;
        Ok(entries.iter().map(|e| e.amount).sum())
    }
}
