//! Accounts-payable repository.
//!
//! Pay and reverse run as single database transactions: the status change,
//! payment sources and cash journal entry are written together or not at all.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use ledgerly_core::access::{Operation, authorize};
use ledgerly_core::journal::CashOrigin;
use ledgerly_core::payable::{
    FundingInvestor, PayableError, PayableService, PayableSnapshot, PayableStatus,
    PaymentSourceInput, PaymentSpec, PlannedSource,
};
use ledgerly_shared::Actor;
use ledgerly_shared::types::Tolerance;

use super::{cash_journal, category_exists, payment_method_exists};
use crate::entities::sea_orm_active_enums::PayableStatusDb;
use crate::entities::{accounts_payable, investors, payment_sources};

/// Input for creating a payable by hand.
#[derive(Debug, Clone)]
pub struct CreatePayable {
    /// Supplier, if any.
    pub supplier_id: Option<Uuid>,
    /// Description.
    pub description: String,
    /// Category, if any.
    pub category_id: Option<Uuid>,
    /// Due date.
    pub due_date: NaiveDate,
    /// Amount owed.
    pub amount: Decimal,
}

/// Input for editing an open payable. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdatePayable {
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// New amount.
    pub amount: Option<Decimal>,
}

/// Input for paying a payable.
#[derive(Debug, Clone, Default)]
pub struct PayPayable {
    /// Payment timestamp; now when absent.
    pub paid_at: Option<DateTime<Utc>>,
    /// Payment method.
    pub payment_method_id: Option<Uuid>,
    /// Investor shares; an empty list is the same as none.
    pub sources: Option<Vec<PaymentSourceInput>>,
}

/// A payable with its payment sources and their investor names.
#[derive(Debug, Clone)]
pub struct PayableWithSources {
    /// The payable.
    pub payable: accounts_payable::Model,
    /// Payment sources (empty unless paid with investor shares).
    pub sources: Vec<PlannedSource>,
}

/// Result of a reversal.
#[derive(Debug, Clone)]
pub struct PayableReversal {
    /// The payable, back to OPEN.
    pub payable: accounts_payable::Model,
    /// Payment sources removed.
    pub removed_sources: u64,
    /// Journal entries removed.
    pub removed_transactions: u64,
}

/// Accounts-payable repository.
#[derive(Debug, Clone)]
pub struct PayableRepository {
    db: DatabaseConnection,
    tolerance: Tolerance,
}

impl PayableRepository {
    /// Creates a new payable repository with the default one-cent tolerance.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            tolerance: Tolerance::CENT,
        }
    }

    /// Overrides the tolerance used to compare payment-source totals.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Creates an OPEN payable not linked to any order.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not manage payables, a field is
    /// invalid, the category does not exist, or the database operation fails.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreatePayable,
    ) -> Result<accounts_payable::Model, PayableError> {
        authorize(actor, Operation::ManagePayable)?;
        PayableService::validate_fields(input.amount, &input.description)?;
        self.ensure_category(input.category_id).await?;

        let now = Utc::now().into();
        let payable = accounts_payable::ActiveModel {
            id: Set(Uuid::now_v7()),
            supplier_id: Set(input.supplier_id),
            purchase_order_id: Set(None),
            description: Set(input.description.trim().to_string()),
            category_id: Set(input.category_id),
            due_date: Set(input.due_date),
            amount: Set(input.amount),
            status: Set(PayableStatusDb::Open),
            paid_at: Set(None),
            payment_method_id: Set(None),
            is_delivery_cost: Set(false),
            created_by: Set(Some(actor.user_id.into_inner())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| PayableError::Database(e.to_string()))?;

        info!(payable_id = %payable.id, amount = %payable.amount, "Account payable created");
        Ok(payable)
    }

    /// Edits an OPEN payable.
    ///
    /// # Errors
    ///
    /// Returns an error if the payable is missing or PAID, a field is invalid,
    /// or the database operation fails.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdatePayable,
    ) -> Result<accounts_payable::Model, PayableError> {
        authorize(actor, Operation::ManagePayable)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        let payable = Self::load_for_update(&txn, id).await?;
        PayableService::validate_can_modify(&snapshot(&payable))?;

        let description = input
            .description
            .as_deref()
            .map_or(payable.description.as_str(), str::trim)
            .to_string();
        let amount = input.amount.unwrap_or(payable.amount);
        PayableService::validate_fields(amount, &description)?;
        if let Some(category_id) = input.category_id {
            Self::ensure_category_in(&txn, category_id).await?;
        }

        let mut active: accounts_payable::ActiveModel = payable.into();
        active.description = Set(description);
        active.amount = Set(amount);
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
            .map_err(|e| PayableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        info!(payable_id = %id, "Account payable updated");
        Ok(updated)
    }

    /// Deletes an OPEN payable.
    ///
    /// # Errors
    ///
    /// Returns an error if the payable is missing or PAID, or the database
    /// operation fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), PayableError> {
        authorize(actor, Operation::ManagePayable)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        let payable = Self::load_for_update(&txn, id).await?;
        PayableService::validate_can_modify(&snapshot(&payable))?;

        payable
            .delete(&txn)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        info!(payable_id = %id, "Account payable deleted");
        Ok(())
    }

    /// Finds a payable with its payment sources.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the payable does not exist.
    pub async fn find(&self, id: Uuid) -> Result<PayableWithSources, PayableError> {
        let payable = Self::load(&self.db, id).await?;
        let sources = Self::sources_of(&self.db, id).await?;
        Ok(PayableWithSources { payable, sources })
    }

    /// Pays an OPEN payable.
    ///
    /// Writes, as one unit: status PAID with timestamp and method, one payment
    /// source per investor share, and one OUT journal entry for the full amount.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor may not pay payables
    /// - The payable does not exist or is already paid
    /// - Source amounts do not add up to the payable amount
    /// - An investor does not exist or is inactive
    /// - The payment method does not exist
    /// - Database operation fails
    #[instrument(skip(self, input))]
    pub async fn pay(
        &self,
        actor: &Actor,
        id: Uuid,
        input: PayPayable,
    ) -> Result<PayableWithSources, PayableError> {
        authorize(actor, Operation::PayPayable)?;
        let spec = PaymentSpec::from_request(input.payment_method_id, input.sources);

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        // Re-read under a row lock; a concurrent pay waits here and then
        // sees PAID.
        let payable = Self::load_for_update(&txn, id).await?;
        let snap = snapshot(&payable);
        PayableService::validate_can_pay(&snap)
            .inspect_err(|e| warn!(payable_id = %id, error = %e, "Payment rejected"))?;

        if let Some(method_id) = spec.payment_method_id() {
            let exists = payment_method_exists(&txn, method_id)
                .await
                .map_err(|e| PayableError::Database(e.to_string()))?;
            if !exists {
                return Err(PayableError::PaymentMethodNotFound(method_id));
            }
        }

        let requested: HashSet<Uuid> = spec.sources().iter().map(|s| s.investor_id).collect();
        let funding: Vec<FundingInvestor> = if requested.is_empty() {
            Vec::new()
        } else {
            investors::Entity::find()
                .filter(investors::Column::Id.is_in(requested))
                .lock_shared()
                .all(&txn)
                .await
                .map_err(|e| PayableError::Database(e.to_string()))?
                .into_iter()
                .map(|i| FundingInvestor {
                    id: i.id,
                    name: i.name,
                    is_active: i.is_active,
                })
                .collect()
        };

        let plan = PayableService::plan_payment(
            &snap,
            &spec,
            input.paid_at,
            &funding,
            self.tolerance,
        )
        .inspect_err(|e| warn!(payable_id = %id, error = %e, "Payment rejected"))?;

        let created_by = actor.user_id.into_inner();
        let mut active: accounts_payable::ActiveModel = payable.into();
        active.status = Set(PayableStatusDb::Paid);
        active.paid_at = Set(Some(plan.paid_at.into()));
        active.payment_method_id = Set(plan.payment_method_id);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        for source in &plan.sources {
            payment_sources::ActiveModel {
                id: Set(Uuid::now_v7()),
                account_payable_id: Set(id),
                investor_id: Set(source.investor_id),
                amount: Set(source.amount),
                created_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;
        }

        cash_journal::append(&txn, &plan.cash, created_by)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        info!(
            payable_id = %id,
            amount = %updated.amount,
            sources = plan.sources.len(),
            "Account payable paid"
        );

        Ok(PayableWithSources {
            payable: updated,
            sources: plan.sources,
        })
    }

    /// Reverses a PAID payable back to OPEN.
    ///
    /// Removes its payment sources and AP journal entries, clears the payment
    /// fields and the delivery-cost flag, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not reverse payables, the payable does
    /// not exist or is not paid, or the database operation fails.
    #[instrument(skip(self))]
    pub async fn reverse(&self, actor: &Actor, id: Uuid) -> Result<PayableReversal, PayableError> {
        authorize(actor, Operation::ReversePayable)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        let payable = Self::load_for_update(&txn, id).await?;
        PayableService::validate_reverse(&snapshot(&payable))
            .inspect_err(|e| warn!(payable_id = %id, error = %e, "Reversal rejected"))?;

        let removed_sources = payment_sources::Entity::delete_many()
            .filter(payment_sources::Column::AccountPayableId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?
            .rows_affected;

        let removed_transactions = cash_journal::remove_for_origin(&txn, CashOrigin::Ap, id)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        let mut active: accounts_payable::ActiveModel = payable.into();
        active.status = Set(PayableStatusDb::Open);
        active.paid_at = Set(None);
        active.payment_method_id = Set(None);
        active.is_delivery_cost = Set(false);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        info!(
            payable_id = %id,
            removed_sources,
            removed_transactions,
            "Account payable reversed"
        );

        Ok(PayableReversal {
            payable: updated,
            removed_sources,
            removed_transactions,
        })
    }

    /// Sets or clears the delivery-cost flag on a set of PAID payables.
    ///
    /// Returns the number of rows updated.
    ///
    /// # Errors
    ///
    /// Returns `BulkNotFound` if any ID is missing, `UnpaidDeliveryCost` if
    /// any payable is not PAID, or a database error.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn set_delivery_cost(
        &self,
        actor: &Actor,
        ids: &[Uuid],
        is_delivery_cost: bool,
    ) -> Result<u64, PayableError> {
        authorize(actor, Operation::FlagDeliveryCost)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        let found: Vec<(Uuid, PayableStatus)> = accounts_payable::Entity::find()
            .filter(accounts_payable::Column::Id.is_in(ids.iter().copied()))
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?
            .into_iter()
            .map(|p| (p.id, p.status.into()))
            .collect();

        PayableService::validate_delivery_cost_flag(ids, &found)
            .inspect_err(|e| warn!(error = %e, "Delivery-cost flag rejected"))?;

        let result = accounts_payable::Entity::update_many()
            .col_expr(
                accounts_payable::Column::IsDeliveryCost,
                Expr::value(is_delivery_cost),
            )
            .col_expr(
                accounts_payable::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(accounts_payable::Column::Id.is_in(ids.iter().copied()))
            .exec(&txn)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        info!(
            updated = result.rows_affected,
            is_delivery_cost, "Delivery-cost flag updated"
        );
        Ok(result.rows_affected)
    }

    async fn load<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<accounts_payable::Model, PayableError> {
        accounts_payable::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?
            .ok_or(PayableError::NotFound(id))
    }

    /// Loads the row with `SELECT ... FOR UPDATE` so concurrent writers
    /// queue behind this transaction and re-check the committed status.
    async fn load_for_update<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<accounts_payable::Model, PayableError> {
        accounts_payable::Entity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?
            .ok_or(PayableError::NotFound(id))
    }

    async fn sources_of<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Vec<PlannedSource>, PayableError> {
        let rows = payment_sources::Entity::find()
            .filter(payment_sources::Column::AccountPayableId.eq(id))
            .order_by_asc(payment_sources::Column::CreatedAt)
            .find_also_related(investors::Entity)
            .all(conn)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(source, investor)| PlannedSource {
                investor_id: source.investor_id,
                investor_name: investor.map(|i| i.name).unwrap_or_default(),
                amount: source.amount,
            })
            .collect())
    }

    async fn ensure_category(&self, category_id: Option<Uuid>) -> Result<(), PayableError> {
        match category_id {
            Some(id) => Self::ensure_category_in(&self.db, id).await,
            None => Ok(()),
        }
    }

    async fn ensure_category_in<C: ConnectionTrait>(
        conn: &C,
        category_id: Uuid,
    ) -> Result<(), PayableError> {
        let exists = category_exists(conn, category_id)
            .await
            .map_err(|e| PayableError::Database(e.to_string()))?;
        if exists {
            Ok(())
        } else {
            Err(PayableError::CategoryNotFound(category_id))
        }
    }
}

fn snapshot(model: &accounts_payable::Model) -> PayableSnapshot {
    PayableSnapshot {
        id: model.id,
        status: model.status.into(),
        amount: model.amount,
        description: model.description.clone(),
        category_id: model.category_id,
    }
}
