//! Investor repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use ledgerly_core::access::{Operation, authorize};
use ledgerly_core::investor::{InvestorError, InvestorService, RemovalOutcome};
use ledgerly_shared::Actor;

use crate::entities::{investors, payment_sources};

/// Input for creating an investor.
#[derive(Debug, Clone)]
pub struct CreateInvestor {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

/// Investor repository.
#[derive(Debug, Clone)]
pub struct InvestorRepository {
    db: DatabaseConnection,
}

impl InvestorRepository {
    /// Creates a new investor repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an active investor.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not manage investors, the name is
    /// blank, or the database operation fails.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateInvestor,
    ) -> Result<investors::Model, InvestorError> {
        authorize(actor, Operation::ManageInvestor)?;
        InvestorService::validate_name(&input.name)?;

        let now = Utc::now().into();
        let investor = investors::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name.trim().to_string()),
            email: Set(input.email),
            phone: Set(input.phone),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| InvestorError::Database(e.to_string()))?;

        info!(investor_id = %investor.id, "Investor created");
        Ok(investor)
    }

    /// Marks an investor inactive. Inactive investors cannot fund payments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the investor does not exist.
    #[instrument(skip(self))]
    pub async fn deactivate(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<investors::Model, InvestorError> {
        authorize(actor, Operation::ManageInvestor)?;
        let investor = Self::load(&self.db, id).await?;
        let updated = Self::set_inactive(&self.db, investor).await?;
        info!(investor_id = %id, "Investor deactivated");
        Ok(updated)
    }

    /// Removes an investor: hard-deletes it when no payment source references
    /// it, deactivates it otherwise.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the investor does not exist.
    #[instrument(skip(self))]
    pub async fn remove(&self, actor: &Actor, id: Uuid) -> Result<RemovalOutcome, InvestorError> {
        authorize(actor, Operation::ManageInvestor)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| InvestorError::Database(e.to_string()))?;

        // A payment funding this investor holds a shared lock on the row, so
        // the reference count below cannot change until we commit.
        let investor = investors::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| InvestorError::Database(e.to_string()))?
            .ok_or(InvestorError::NotFound(id))?;
        let references = payment_sources::Entity::find()
            .filter(payment_sources::Column::InvestorId.eq(id))
            .count(&txn)
            .await
            .map_err(|e| InvestorError::Database(e.to_string()))?;

        let outcome = InvestorService::removal_outcome(references);
        match outcome {
            RemovalOutcome::Deleted => {
                investor
                    .delete(&txn)
                    .await
                    .map_err(|e| InvestorError::Database(e.to_string()))?;
            }
            RemovalOutcome::Deactivated => {
                Self::set_inactive(&txn, investor).await?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| InvestorError::Database(e.to_string()))?;

        info!(investor_id = %id, references, outcome = ?outcome, "Investor removed");
        Ok(outcome)
    }

    /// Finds an investor by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the investor does not exist.
    pub async fn find(&self, id: Uuid) -> Result<investors::Model, InvestorError> {
        Self::load(&self.db, id).await
    }

    /// Lists active investors by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self) -> Result<Vec<investors::Model>, InvestorError> {
        investors::Entity::find()
            .filter(investors::Column::IsActive.eq(true))
            .order_by_asc(investors::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| InvestorError::Database(e.to_string()))
    }

    async fn load<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<investors::Model, InvestorError> {
        investors::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| InvestorError::Database(e.to_string()))?
            .ok_or(InvestorError::NotFound(id))
    }

    async fn set_inactive<C: ConnectionTrait>(
        conn: &C,
        investor: investors::Model,
    ) -> Result<investors::Model, InvestorError> {
        let mut active: investors::ActiveModel = investor.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active
            .update(conn)
            .await
            .map_err(|e| InvestorError::Database(e.to_string()))
    }
}
