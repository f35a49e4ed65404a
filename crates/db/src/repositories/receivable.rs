//! Accounts-receivable repository.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use ledgerly_core::access::{Operation, authorize};
use ledgerly_core::journal::CashOrigin;
use ledgerly_core::receivable::{
    ReceiptPlan, ReceivableError, ReceivableService, ReceivableSnapshot, ReceivableStatus,
    ReversalPlan,
};
use ledgerly_shared::Actor;
use ledgerly_shared::types::Tolerance;

use super::{cash_journal, category_exists, payment_method_exists};
use crate::entities::sea_orm_active_enums::ReceivableStatusDb;
use crate::entities::{accounts_receivable, sales_orders};

/// Input for creating a receivable by hand.
#[derive(Debug, Clone)]
pub struct CreateReceivable {
    /// Customer, if any.
    pub customer_id: Option<Uuid>,
    /// Sales order the receivable belongs to, if any.
    pub sales_order_id: Option<Uuid>,
    /// Description.
    pub description: String,
    /// Category, if any.
    pub category_id: Option<Uuid>,
    /// Due date.
    pub due_date: NaiveDate,
    /// Amount due.
    pub amount: Decimal,
}

/// Input for editing an open receivable. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateReceivable {
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// New outstanding amount.
    pub amount: Option<Decimal>,
}

/// Input for a full or partial receipt.
#[derive(Debug, Clone, Default)]
pub struct ReceiveReceivable {
    /// Receipt timestamp; now when absent.
    pub received_at: Option<DateTime<Utc>>,
    /// Payment method, if recorded.
    pub payment_method_id: Option<Uuid>,
}

/// Accounts-receivable repository.
#[derive(Debug, Clone)]
pub struct ReceivableRepository {
    db: DatabaseConnection,
    tolerance: Tolerance,
}

impl ReceivableRepository {
    /// Creates a new receivable repository with the default one-cent tolerance.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            tolerance: Tolerance::CENT,
        }
    }

    /// Overrides the tolerance used for partial receipts and order headroom.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Creates an OPEN receivable, optionally linked to a sales order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor may not manage receivables
    /// - A field is invalid or the category does not exist
    /// - The linked sales order does not exist, or the receivables linked to
    ///   it would exceed its total
    /// - Database operation fails
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateReceivable,
    ) -> Result<accounts_receivable::Model, ReceivableError> {
        authorize(actor, Operation::ManageReceivable)?;
        ReceivableService::validate_fields(input.amount, &input.description)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        if let Some(category_id) = input.category_id {
            Self::ensure_category(&txn, category_id).await?;
        }
        if let Some(order_id) = input.sales_order_id {
            self.ensure_headroom(&txn, order_id, None, input.amount)
                .await?;
        }

        let now = Utc::now().into();
        let receivable = accounts_receivable::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_id: Set(input.customer_id),
            sales_order_id: Set(input.sales_order_id),
            description: Set(input.description.trim().to_string()),
            category_id: Set(input.category_id),
            due_date: Set(input.due_date),
            amount: Set(input.amount),
            original_amount: Set(input.amount),
            status: Set(ReceivableStatusDb::Open),
            received_at: Set(None),
            payment_method_id: Set(None),
            payment_days: Set(None),
            created_by: Set(Some(actor.user_id.into_inner())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| ReceivableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        info!(
            receivable_id = %receivable.id,
            amount = %receivable.amount,
            "Account receivable created"
        );
        Ok(receivable)
    }

    /// Edits an OPEN receivable.
    ///
    /// Changing the amount moves the face value by the same difference, so
    /// whatever was already received through partial receipts stays counted.
    ///
    /// # Errors
    ///
    /// Returns an error if the receivable is missing or not OPEN, a field is
    /// invalid, the order headroom would be exceeded, or the database
    /// operation fails.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateReceivable,
    ) -> Result<accounts_receivable::Model, ReceivableError> {
        authorize(actor, Operation::ManageReceivable)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        let receivable = Self::load_for_update(&txn, id).await?;
        let snap = snapshot(&receivable);
        ReceivableService::validate_can_modify(&snap)?;

        let description = input
            .description
            .as_deref()
            .map_or(receivable.description.as_str(), str::trim)
            .to_string();
        let amount = input.amount.unwrap_or(receivable.amount);
        ReceivableService::validate_fields(amount, &description)?;
        if let Some(category_id) = input.category_id {
            Self::ensure_category(&txn, category_id).await?;
        }

        let face_value = ReceivableService::edited_face_value(&snap, amount);
        if let Some(order_id) = receivable.sales_order_id {
            self.ensure_headroom(&txn, order_id, Some(id), face_value)
                .await?;
        }

        let mut active: accounts_receivable::ActiveModel = receivable.into();
        active.description = Set(description);
        active.amount = Set(amount);
        active.original_amount = Set(face_value);
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date);
        }
        if input.category_id.is_some() {
            active.category_id = Set(input.category_id);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        info!(receivable_id = %id, "Account receivable updated");
        Ok(updated)
    }

    /// Deletes an OPEN receivable.
    ///
    /// # Errors
    ///
    /// Returns an error if the receivable is missing or not OPEN, or the
    /// database operation fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ReceivableError> {
        authorize(actor, Operation::ManageReceivable)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        let receivable = Self::load_for_update(&txn, id).await?;
        ReceivableService::validate_can_modify(&snapshot(&receivable))?;

        receivable
            .delete(&txn)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        info!(receivable_id = %id, "Account receivable deleted");
        Ok(())
    }

    /// Cancels an OPEN receivable. CANCELED is terminal.
    ///
    /// # Errors
    ///
    /// Returns `CannotCancel` unless the receivable is OPEN.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<accounts_receivable::Model, ReceivableError> {
        authorize(actor, Operation::ManageReceivable)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        let receivable = Self::load_for_update(&txn, id).await?;
        ReceivableService::validate_cancel(&snapshot(&receivable))
            .inspect_err(|e| warn!(receivable_id = %id, error = %e, "Cancel rejected"))?;

        let mut active: accounts_receivable::ActiveModel = receivable.into();
        active.status = Set(ReceivableStatusDb::Canceled);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        info!(receivable_id = %id, "Account receivable canceled");
        Ok(updated)
    }

    /// Finds a receivable by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the receivable does not exist.
    pub async fn find(&self, id: Uuid) -> Result<accounts_receivable::Model, ReceivableError> {
        Self::load(&self.db, id).await
    }

    /// Lists the receivables of a sales order, oldest due date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_sales_order(
        &self,
        sales_order_id: Uuid,
    ) -> Result<Vec<accounts_receivable::Model>, ReceivableError> {
        accounts_receivable::Entity::find()
            .filter(accounts_receivable::Column::SalesOrderId.eq(sales_order_id))
            .order_by_asc(accounts_receivable::Column::DueDate)
            .all(&self.db)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))
    }

    /// Receives the full outstanding amount of an OPEN receivable.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not receive, the receivable is
    /// missing or not OPEN, the payment method does not exist, or the
    /// database operation fails.
    #[instrument(skip(self, input))]
    pub async fn receive(
        &self,
        actor: &Actor,
        id: Uuid,
        input: ReceiveReceivable,
    ) -> Result<accounts_receivable::Model, ReceivableError> {
        authorize(actor, Operation::ReceiveReceivable)?;
        self.apply_receipt(actor, id, input, |snap, input| {
            ReceivableService::plan_receive(snap, input.received_at, input.payment_method_id)
        })
        .await
    }

    /// Receives part of an OPEN receivable.
    ///
    /// Journals `amount` and lowers the outstanding balance. When nothing is
    /// left (within tolerance) the receivable becomes RECEIVED.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or exceeds the
    /// outstanding balance, plus the same errors as [`Self::receive`].
    #[instrument(skip(self, input))]
    pub async fn receive_partial(
        &self,
        actor: &Actor,
        id: Uuid,
        amount: Decimal,
        input: ReceiveReceivable,
    ) -> Result<accounts_receivable::Model, ReceivableError> {
        authorize(actor, Operation::ReceiveReceivable)?;
        let tolerance = self.tolerance;
        self.apply_receipt(actor, id, input, |snap, input| {
            ReceivableService::plan_partial_receipt(
                snap,
                amount,
                input.received_at,
                input.payment_method_id,
                tolerance,
            )
        })
        .await
    }

    /// Reverses a RECEIVED receivable back to OPEN at its face value.
    ///
    /// Every AR journal entry of the receivable is removed, including the
    /// entries of earlier partial receipts.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not reverse, the receivable is
    /// missing or not RECEIVED, or the database operation fails.
    #[instrument(skip(self))]
    pub async fn reverse(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<(accounts_receivable::Model, ReversalPlan), ReceivableError> {
        authorize(actor, Operation::ReverseReceivable)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        let receivable = Self::load_for_update(&txn, id).await?;
        let journaled: Vec<Decimal> = cash_journal::entries_for_origin(&txn, CashOrigin::Ar, id)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?
            .into_iter()
            .map(|e| e.amount)
            .collect();

        let plan = ReceivableService::plan_reverse(&snapshot(&receivable), &journaled)
            .inspect_err(|e| warn!(receivable_id = %id, error = %e, "Reversal rejected"))?;

        cash_journal::remove_for_origin(&txn, CashOrigin::Ar, id)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        let mut active: accounts_receivable::ActiveModel = receivable.into();
        active.status = Set(ReceivableStatusDb::Open);
        active.amount = Set(plan.restored_amount);
        active.received_at = Set(None);
        active.payment_method_id = Set(None);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        info!(
            receivable_id = %id,
            restored_amount = %plan.restored_amount,
            removed_transactions = plan.removed_transactions,
            "Account receivable reversed"
        );

        Ok((updated, plan))
    }

    async fn apply_receipt<F>(
        &self,
        actor: &Actor,
        id: Uuid,
        input: ReceiveReceivable,
        plan: F,
    ) -> Result<accounts_receivable::Model, ReceivableError>
    where
        F: FnOnce(&ReceivableSnapshot, &ReceiveReceivable) -> Result<ReceiptPlan, ReceivableError>,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        let receivable = Self::load_for_update(&txn, id).await?;
        let snap = snapshot(&receivable);
        ReceivableService::validate_can_receive(&snap)
            .inspect_err(|e| warn!(receivable_id = %id, error = %e, "Receipt rejected"))?;

        if let Some(method_id) = input.payment_method_id {
            let exists = payment_method_exists(&txn, method_id)
                .await
                .map_err(|e| ReceivableError::Database(e.to_string()))?;
            if !exists {
                return Err(ReceivableError::PaymentMethodNotFound(method_id));
            }
        }

        let plan = plan(&snap, &input)
            .inspect_err(|e| warn!(receivable_id = %id, error = %e, "Receipt rejected"))?;

        let mut active: accounts_receivable::ActiveModel = receivable.into();
        active.status = Set(plan.status.into());
        active.amount = Set(plan.amount);
        if plan.status == ReceivableStatus::Received {
            active.received_at = Set(Some(plan.received_at.into()));
            active.payment_method_id = Set(plan.payment_method_id);
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        cash_journal::append(&txn, &plan.cash, actor.user_id.into_inner())
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        info!(
            receivable_id = %id,
            received = %plan.cash.amount,
            status = plan.status.as_str(),
            "Account receivable receipt recorded"
        );
        Ok(updated)
    }

    /// Checks that `face_value` fits under the sales order total, counting
    /// every other OPEN or RECEIVED receivable of the order.
    async fn ensure_headroom<C: ConnectionTrait>(
        &self,
        conn: &C,
        sales_order_id: Uuid,
        exclude: Option<Uuid>,
        face_value: Decimal,
    ) -> Result<(), ReceivableError> {
        // Locking the order serializes concurrent edits of its receivables.
        let order = sales_orders::Entity::find_by_id(sales_order_id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?
            .ok_or(ReceivableError::SalesOrderNotFound(sales_order_id))?;

        let others_total = linked_face_total(conn, sales_order_id, exclude)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;

        ReceivableService::check_order_headroom(
            order.total,
            others_total,
            face_value,
            self.tolerance,
        )
        .inspect_err(|e| warn!(sales_order_id = %sales_order_id, error = %e, "Headroom exceeded"))
    }

    async fn load<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<accounts_receivable::Model, ReceivableError> {
        accounts_receivable::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?
            .ok_or(ReceivableError::NotFound(id))
    }

    /// Loads the row with `SELECT ... FOR UPDATE` so concurrent writers
    /// queue behind this transaction and re-check the committed status.
    async fn load_for_update<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<accounts_receivable::Model, ReceivableError> {
        accounts_receivable::Entity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?
            .ok_or(ReceivableError::NotFound(id))
    }

    async fn ensure_category<C: ConnectionTrait>(
        conn: &C,
        category_id: Uuid,
    ) -> Result<(), ReceivableError> {
        let exists = category_exists(conn, category_id)
            .await
            .map_err(|e| ReceivableError::Database(e.to_string()))?;
        if exists {
            Ok(())
        } else {
            Err(ReceivableError::CategoryNotFound(category_id))
        }
    }
}

/// Face value of the OPEN and RECEIVED receivables of a sales order.
pub(crate) async fn linked_face_total<C: ConnectionTrait>(
    conn: &C,
    sales_order_id: Uuid,
    exclude: Option<Uuid>,
) -> Result<Decimal, sea_orm::DbErr> {
    let mut query = accounts_receivable::Entity::find()
        .filter(accounts_receivable::Column::SalesOrderId.eq(sales_order_id));
    if let Some(id) = exclude {
        query = query.filter(accounts_receivable::Column::Id.ne(id));
    }

    Ok(query
        .all(conn)
        .await?
        .into_iter()
        .filter(|r| ReceivableStatus::from(r.status).counts_against_order())
        .map(|r| r.original_amount)
        .sum())
}

fn snapshot(model: &accounts_receivable::Model) -> ReceivableSnapshot {
    ReceivableSnapshot {
        id: model.id,
        status: model.status.into(),
        amount: model.amount,
        original_amount: model.original_amount,
        description: model.description.clone(),
        category_id: model.category_id,
    }
}
