//! Stock ledger repository.
//!
//! `stock_balances` is written only through this module. Incremental updates
//! go through [`apply_delta`]; [`StockRepository::reconcile`] overwrites the
//! cached balance from the movement log. Every writer locks the balance row
//! first, so concurrent writers to one product run one after another.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use ledgerly_core::access::{Operation, authorize};
use ledgerly_core::stock::{
    AdjustmentInput, MovementType, NewStockMovement, ProductType, StockError, StockService,
};
use ledgerly_shared::Actor;

use crate::entities::{products, stock_adjustments, stock_balances, stock_movements};

/// Reads the cached balance of a product, if a row exists.
pub(crate) async fn current_balance<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<Option<Decimal>, DbErr> {
    Ok(stock_balances::Entity::find()
        .filter(stock_balances::Column::ProductId.eq(product_id))
        .one(conn)
        .await?
        .map(|b| b.quantity))
}

/// Overwrites the cached balance of a product, creating the row if absent.
pub(crate) async fn write_balance<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    quantity: Decimal,
) -> Result<(), DbErr> {
    let row = stock_balances::ActiveModel {
        id: Set(Uuid::now_v7()),
        product_id: Set(product_id),
        quantity: Set(quantity),
        updated_at: Set(Utc::now().into()),
    };
    stock_balances::Entity::insert(row)
        .on_conflict(
            OnConflict::column(stock_balances::Column::ProductId)
                .update_columns([
                    stock_balances::Column::Quantity,
                    stock_balances::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Locks the balance rows of `product_ids` until the transaction ends and
/// returns their quantities.
///
/// Products that never moved get a zero row first so there is always a row
/// to lock. Rows are locked in product order.
pub(crate) async fn lock_balances<C: ConnectionTrait>(
    conn: &C,
    product_ids: &BTreeSet<Uuid>,
) -> Result<HashMap<Uuid, Decimal>, DbErr> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let now = Utc::now();
    stock_balances::Entity::insert_many(product_ids.iter().map(|&product_id| {
        stock_balances::ActiveModel {
            id: Set(Uuid::now_v7()),
            product_id: Set(product_id),
            quantity: Set(Decimal::ZERO),
            updated_at: Set(now.into()),
        }
    }))
    .on_conflict(
        OnConflict::column(stock_balances::Column::ProductId)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    Ok(stock_balances::Entity::find()
        .filter(stock_balances::Column::ProductId.is_in(product_ids.iter().copied()))
        .order_by_asc(stock_balances::Column::ProductId)
        .lock_exclusive()
        .all(conn)
        .await?
        .into_iter()
        .map(|b| (b.product_id, b.quantity))
        .collect())
}

/// Adds `delta` to the cached balance under a row lock. Returns the new balance.
pub(crate) async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    delta: Decimal,
) -> Result<Decimal, DbErr> {
    let locked = lock_balances(conn, &BTreeSet::from([product_id])).await?;
    let next = StockService::apply(locked.get(&product_id).copied(), delta);
    write_balance(conn, product_id, next).await?;
    Ok(next)
}

/// Appends a movement to the ledger.
pub(crate) async fn append_movement<C: ConnectionTrait>(
    conn: &C,
    movement: &NewStockMovement,
    created_by: Uuid,
) -> Result<stock_movements::Model, DbErr> {
    stock_movements::ActiveModel {
        id: Set(Uuid::now_v7()),
        product_id: Set(movement.product_id),
        movement_type: Set(movement.movement_type.into()),
        quantity: Set(movement.quantity),
        reference_type: Set(movement.reference_type.into()),
        reference_id: Set(movement.reference_id),
        unit_cost: Set(movement.unit_cost),
        note: Set(movement.note.clone()),
        created_by: Set(created_by),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}

/// Result of a manual adjustment.
#[derive(Debug, Clone)]
pub struct AdjustmentResult {
    /// The adjustment row.
    pub adjustment: stock_adjustments::Model,
    /// The paired ADJUST movement.
    pub movement: stock_movements::Model,
    /// Balance after the adjustment.
    pub balance: Decimal,
}

/// Stock ledger repository.
#[derive(Debug, Clone)]
pub struct StockRepository {
    db: DatabaseConnection,
}

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a manual adjustment with its paired movement and balance update.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor may not adjust stock
    /// - The adjustment is invalid (zero quantity, no reason, damage without photo)
    /// - The product does not exist or is a service
    /// - Database operation fails
    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn adjust(
        &self,
        actor: &Actor,
        input: AdjustmentInput,
    ) -> Result<AdjustmentResult, StockError> {
        authorize(actor, Operation::AdjustStock)?;
        let movement = StockService::plan_adjustment(&input).inspect_err(|e| {
            warn!(error = %e, "Stock adjustment rejected");
        })?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        Self::ensure_stocked_product(&txn, input.product_id).await?;

        let movement = append_movement(&txn, &movement, actor.user_id.into_inner())
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        let adjustment = stock_adjustments::ActiveModel {
            id: Set(Uuid::now_v7()),
            product_id: Set(input.product_id),
            adjustment_type: Set(input.adjustment_type.into()),
            quantity: Set(input.quantity),
            reason: Set(input.reason.trim().to_string()),
            photo: Set(input.photo.clone()),
            movement_id: Set(movement.id),
            created_by: Set(actor.user_id.into_inner()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| StockError::Database(e.to_string()))?;

        let balance = apply_delta(&txn, input.product_id, input.quantity)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        info!(
            adjustment_id = %adjustment.id,
            adjustment_type = input.adjustment_type.as_str(),
            quantity = %input.quantity,
            balance = %balance,
            "Stock adjusted"
        );

        Ok(AdjustmentResult {
            adjustment,
            movement,
            balance,
        })
    }

    /// Recomputes a product's balance from its movement log and overwrites the cache.
    ///
    /// Idempotent: running it twice yields the same balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not reconcile, the product does not
    /// exist or is a service, or the database operation fails.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, actor: &Actor, product_id: Uuid) -> Result<Decimal, StockError> {
        authorize(actor, Operation::ReconcileStock)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        Self::ensure_stocked_product(&txn, product_id).await?;

        // Hold the balance row while the movement log is summed.
        let previous = lock_balances(&txn, &BTreeSet::from([product_id]))
            .await
            .map_err(|e| StockError::Database(e.to_string()))?
            .get(&product_id)
            .copied();

        let movements = stock_movements::Entity::find()
            .filter(stock_movements::Column::ProductId.eq(product_id))
            .all(&txn)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        let balance = StockService::reconcile(
            movements
                .iter()
                .map(|m| (MovementType::from(m.movement_type), m.quantity)),
        );

        write_balance(&txn, product_id, balance)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| StockError::Database(e.to_string()))?;

        if previous != Some(balance) {
            info!(
                previous = ?previous,
                balance = %balance,
                movements = movements.len(),
                "Stock balance drift corrected"
            );
        } else {
            info!(balance = %balance, "Stock balance reconciled");
        }

        Ok(balance)
    }

    /// Current cached balance (zero when the product never moved).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn balance(&self, product_id: Uuid) -> Result<Decimal, DbErr> {
        Ok(current_balance(&self.db, product_id)
            .await?
            .unwrap_or(Decimal::ZERO))
    }

    /// Movement history of a product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn movements(&self, product_id: Uuid) -> Result<Vec<stock_movements::Model>, DbErr> {
        stock_movements::Entity::find()
            .filter(stock_movements::Column::ProductId.eq(product_id))
            .order_by_asc(stock_movements::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Adjustments recorded for a product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn adjustments(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<stock_adjustments::Model>, DbErr> {
        stock_adjustments::Entity::find()
            .filter(stock_adjustments::Column::ProductId.eq(product_id))
            .order_by_asc(stock_adjustments::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    async fn ensure_stocked_product<C: ConnectionTrait>(
        conn: &C,
        product_id: Uuid,
    ) -> Result<products::Model, StockError> {
        let product = products::Entity::find_by_id(product_id)
            .one(conn)
            .await
            .map_err(|e| StockError::Database(e.to_string()))?
            .ok_or(StockError::ProductNotFound(product_id))?;

        if ProductType::from(product.product_type).moves_stock() {
            Ok(product)
        } else {
            Err(StockError::ServiceProduct(product_id))
        }
    }
}
