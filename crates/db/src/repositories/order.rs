//! Purchase and sales order repository.
//!
//! Orders tie the ledgers together: creating an order writes its AP or AR
//! installments, receiving a purchase order moves stock in, delivering a
//! sales order moves stock out. Each operation is one database transaction.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use ledgerly_core::access::{Operation, authorize};
use ledgerly_core::installment::{
    InstallmentInput, InstallmentService, OrderContext, OrderKind, PlannedInstallment,
};
use ledgerly_core::order::{
    OrderError, OrderLine, OrderService, PurchaseOrderStatus, SalesOrderStatus,
};
use ledgerly_core::payable::PayableStatus;
use ledgerly_core::stock::{DeliveryLine, ProductType, ReceiptLine, StockService};
use ledgerly_shared::Actor;
use ledgerly_shared::types::Tolerance;

use super::receivable::linked_face_total;
use super::stock::{append_movement, apply_delta, lock_balances};
use crate::entities::sea_orm_active_enums::{
    PayableStatusDb, PurchaseOrderStatusDb, ReceivableStatusDb, SalesOrderStatusDb,
};
use crate::entities::{
    accounts_payable, accounts_receivable, categories, payment_methods, products,
    purchase_order_items, purchase_orders, sales_order_items, sales_orders, stock_balances,
};

/// Input for creating a purchase or sales order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// Supplier (purchase) or customer (sale), if any.
    pub counterparty_id: Option<Uuid>,
    /// Order date.
    pub order_date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Line items; at least one.
    pub lines: Vec<OrderLine>,
    /// Installments to create with the order; may be empty.
    pub installments: Vec<InstallmentInput>,
}

/// A purchase order with its items and payables.
#[derive(Debug, Clone)]
pub struct PurchaseOrderDetail {
    /// The order.
    pub order: purchase_orders::Model,
    /// Line items.
    pub items: Vec<purchase_order_items::Model>,
    /// Payables created for the order.
    pub payables: Vec<accounts_payable::Model>,
}

/// A sales order with its items and receivables.
#[derive(Debug, Clone)]
pub struct SalesOrderDetail {
    /// The order.
    pub order: sales_orders::Model,
    /// Line items.
    pub items: Vec<sales_order_items::Model>,
    /// Receivables created for the order.
    pub receivables: Vec<accounts_receivable::Model>,
}

/// Installments written for an order.
#[derive(Debug, Clone)]
pub enum CreatedInstallments {
    /// Payables of a purchase order.
    Payables(Vec<accounts_payable::Model>),
    /// Receivables of a sales order.
    Receivables(Vec<accounts_receivable::Model>),
}

impl CreatedInstallments {
    /// Number of rows written.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Payables(rows) => rows.len(),
            Self::Receivables(rows) => rows.len(),
        }
    }

    /// Returns true if no rows were written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Order repository.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
    tolerance: Tolerance,
}

impl OrderRepository {
    /// Creates a new order repository with the default one-cent tolerance.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            tolerance: Tolerance::CENT,
        }
    }

    /// Overrides the tolerance used for the installment total check.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Creates an OPEN purchase order with its items and payable installments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor may not manage purchase orders
    /// - A line is invalid or a product does not exist
    /// - An installment is invalid, references a missing payment method or
    ///   category, or the installments exceed the order total
    /// - Database operation fails
    #[instrument(skip(self, input), fields(lines = input.lines.len(), installments = input.installments.len()))]
    pub async fn create_purchase_order(
        &self,
        actor: &Actor,
        input: CreateOrder,
    ) -> Result<PurchaseOrderDetail, OrderError> {
        authorize(actor, Operation::ManagePurchaseOrder)?;
        OrderService::validate_lines(&input.lines)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        load_products(&txn, &input.lines).await?;

        let order_id = Uuid::now_v7();
        let total = OrderService::total(&input.lines);
        let context = OrderContext {
            order_id,
            kind: OrderKind::Purchase,
            order_date: input.order_date,
            total,
            existing_total: Decimal::ZERO,
        };
        let planned = self
            .plan_installments(&txn, &context, &input.installments)
            .await?;

        let now = Utc::now().into();
        let order = purchase_orders::ActiveModel {
            id: Set(order_id),
            supplier_id: Set(input.counterparty_id),
            order_date: Set(input.order_date),
            status: Set(PurchaseOrderStatusDb::Open),
            total: Set(total),
            notes: Set(input.notes),
            created_by: Set(actor.user_id.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?;

        let mut items = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let item = purchase_order_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                purchase_order_id: Set(order_id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                total: Set(line.quantity * line.unit_price),
            }
            .insert(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
            items.push(item);
        }

        let payables =
            insert_payables(&txn, order_id, input.counterparty_id, &planned, actor).await?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(
            order_id = %order_id,
            total = %total,
            installments = payables.len(),
            "Purchase order created"
        );

        Ok(PurchaseOrderDetail {
            order,
            items,
            payables,
        })
    }

    /// Creates an OPEN sales order with its items and receivable installments.
    ///
    /// Stock availability is checked here as well as on delivery; the
    /// delivery check is the one that guards the balance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor may not manage sales orders
    /// - A line is invalid or a product does not exist
    /// - A physical product does not have enough stock
    /// - An installment is invalid, references a missing payment method or
    ///   category, or the installments exceed the order total
    /// - Database operation fails
    #[instrument(skip(self, input), fields(lines = input.lines.len(), installments = input.installments.len()))]
    pub async fn create_sales_order(
        &self,
        actor: &Actor,
        input: CreateOrder,
    ) -> Result<SalesOrderDetail, OrderError> {
        authorize(actor, Operation::ManageSalesOrder)?;
        OrderService::validate_lines(&input.lines)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let products = load_products(&txn, &input.lines).await?;
        let delivery = delivery_lines(
            input.lines.iter().map(|l| (l.product_id, l.quantity)),
            &products,
        )?;
        let balances = load_balances(&txn, &delivery).await?;
        StockService::check_availability(&delivery, &balances)
            .inspect_err(|e| warn!(error = %e, "Sales order rejected"))?;

        let order_id = Uuid::now_v7();
        let total = OrderService::total(&input.lines);
        let context = OrderContext {
            order_id,
            kind: OrderKind::Sale,
            order_date: input.order_date,
            total,
            existing_total: Decimal::ZERO,
        };
        let planned = self
            .plan_installments(&txn, &context, &input.installments)
            .await?;

        let now = Utc::now().into();
        let order = sales_orders::ActiveModel {
            id: Set(order_id),
            customer_id: Set(input.counterparty_id),
            order_date: Set(input.order_date),
            status: Set(SalesOrderStatusDb::Open),
            total: Set(total),
            notes: Set(input.notes),
            created_by: Set(actor.user_id.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?;

        let mut items = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let item = sales_order_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                sales_order_id: Set(order_id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                total: Set(line.quantity * line.unit_price),
            }
            .insert(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
            items.push(item);
        }

        let receivables =
            insert_receivables(&txn, order_id, input.counterparty_id, &planned, actor).await?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(
            order_id = %order_id,
            total = %total,
            installments = receivables.len(),
            "Sales order created"
        );

        Ok(SalesOrderDetail {
            order,
            items,
            receivables,
        })
    }

    /// Adds installments to an existing order.
    ///
    /// Purchase installments are checked against the OPEN payables already
    /// linked to the order; sale installments against the face value of the
    /// OPEN and RECEIVED receivables.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or is canceled, or the
    /// batch fails installment validation.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub async fn create_installments(
        &self,
        actor: &Actor,
        kind: OrderKind,
        order_id: Uuid,
        inputs: &[InstallmentInput],
    ) -> Result<CreatedInstallments, OrderError> {
        let operation = match kind {
            OrderKind::Purchase => Operation::ManagePurchaseOrder,
            OrderKind::Sale => Operation::ManageSalesOrder,
        };
        authorize(actor, operation)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let created = match kind {
            OrderKind::Purchase => {
                let order = lock_purchase_order(&txn, order_id).await?;
                if PurchaseOrderStatus::from(order.status) == PurchaseOrderStatus::Canceled {
                    return Err(OrderError::Canceled(order_id));
                }
                let existing_total = open_payables_total(&txn, order_id).await?;
                let context = OrderContext {
                    order_id,
                    kind,
                    order_date: order.order_date,
                    total: order.total,
                    existing_total,
                };
                let planned = self.plan_installments(&txn, &context, inputs).await?;
                CreatedInstallments::Payables(
                    insert_payables(&txn, order_id, order.supplier_id, &planned, actor).await?,
                )
            }
            OrderKind::Sale => {
                let order = lock_sales_order(&txn, order_id).await?;
                if SalesOrderStatus::from(order.status) == SalesOrderStatus::Canceled {
                    return Err(OrderError::Canceled(order_id));
                }
                let existing_total = linked_face_total(&txn, order_id, None)
                    .await
                    .map_err(|e| OrderError::Database(e.to_string()))?;
                let context = OrderContext {
                    order_id,
                    kind,
                    order_date: order.order_date,
                    total: order.total,
                    existing_total,
                };
                let planned = self.plan_installments(&txn, &context, inputs).await?;
                CreatedInstallments::Receivables(
                    insert_receivables(&txn, order_id, order.customer_id, &planned, actor).await?,
                )
            }
        };

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(order_id = %order_id, created = created.len(), "Installments created");
        Ok(created)
    }

    /// Receives a purchase order into stock.
    ///
    /// Appends one IN movement per physical line, adds it to the product's
    /// balance, records the line's unit price as the product cost, and marks
    /// the order RECEIVED.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist, was already received or
    /// is canceled, or the database operation fails.
    #[instrument(skip(self))]
    pub async fn receive_purchase_order(
        &self,
        actor: &Actor,
        order_id: Uuid,
    ) -> Result<purchase_orders::Model, OrderError> {
        authorize(actor, Operation::ReceivePurchaseOrder)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock_purchase_order(&txn, order_id).await?;
        OrderService::validate_receive(order_id, order.status.into())
            .inspect_err(|e| warn!(error = %e, "Purchase receipt rejected"))?;

        let items = purchase_order_items::Entity::find()
            .filter(purchase_order_items::Column::PurchaseOrderId.eq(order_id))
            .all(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        let lines: Vec<OrderLine> = items
            .iter()
            .map(|i| OrderLine {
                product_id: i.product_id,
                quantity: i.quantity,
                unit_price: i.unit_price,
            })
            .collect();
        let products = load_products(&txn, &lines).await?;

        let receipt: Vec<ReceiptLine> = lines
            .iter()
            .map(|l| ReceiptLine {
                product_id: l.product_id,
                product_type: product_type(&products, l.product_id),
                quantity: l.quantity,
                unit_cost: l.unit_price,
            })
            .collect();

        let created_by = actor.user_id.into_inner();
        let movements = StockService::plan_purchase_receipt(order_id, &receipt);
        for movement in &movements {
            append_movement(&txn, movement, created_by)
                .await
                .map_err(|e| OrderError::Database(e.to_string()))?;
            apply_delta(&txn, movement.product_id, movement.signed_quantity())
                .await
                .map_err(|e| OrderError::Database(e.to_string()))?;
        }

        for line in &lines {
            products::Entity::update_many()
                .col_expr(products::Column::CostPrice, Expr::value(line.unit_price))
                .col_expr(
                    products::Column::UpdatedAt,
                    Expr::value(Utc::now().fixed_offset()),
                )
                .filter(products::Column::Id.eq(line.product_id))
                .exec(&txn)
                .await
                .map_err(|e| OrderError::Database(e.to_string()))?;
        }

        let mut active: purchase_orders::ActiveModel = order.into();
        active.status = Set(PurchaseOrderStatusDb::Received);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(
            order_id = %order_id,
            movements = movements.len(),
            "Purchase order received"
        );
        Ok(updated)
    }

    /// Delivers a sales order out of stock.
    ///
    /// Balances are re-read inside the transaction; if any physical line is
    /// short the whole delivery is rejected and no movement is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist, was already delivered or
    /// is canceled, stock is insufficient, or the database operation fails.
    #[instrument(skip(self))]
    pub async fn deliver_sales_order(
        &self,
        actor: &Actor,
        order_id: Uuid,
    ) -> Result<sales_orders::Model, OrderError> {
        authorize(actor, Operation::DeliverSalesOrder)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock_sales_order(&txn, order_id).await?;
        OrderService::validate_deliver(order_id, order.status.into())
            .inspect_err(|e| warn!(error = %e, "Delivery rejected"))?;

        let items = sales_order_items::Entity::find()
            .filter(sales_order_items::Column::SalesOrderId.eq(order_id))
            .all(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        let lines: Vec<OrderLine> = items
            .iter()
            .map(|i| OrderLine {
                product_id: i.product_id,
                quantity: i.quantity,
                unit_price: i.unit_price,
            })
            .collect();
        let products = load_products(&txn, &lines).await?;
        let delivery = delivery_lines(items.iter().map(|i| (i.product_id, i.quantity)), &products)?;
        // Locked until commit: a concurrent delivery of the same products
        // waits here and then checks against the decremented balances.
        let balances = lock_balances(&txn, &physical_products(&delivery))
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let movements = StockService::plan_delivery(order_id, &delivery, &balances)
            .inspect_err(|e| warn!(error = %e, "Delivery rejected"))?;

        let created_by = actor.user_id.into_inner();
        for movement in &movements {
            append_movement(&txn, movement, created_by)
                .await
                .map_err(|e| OrderError::Database(e.to_string()))?;
            apply_delta(&txn, movement.product_id, movement.signed_quantity())
                .await
                .map_err(|e| OrderError::Database(e.to_string()))?;
        }

        let mut active: sales_orders::ActiveModel = order.into();
        active.status = Set(SalesOrderStatusDb::Delivered);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(
            order_id = %order_id,
            movements = movements.len(),
            "Sales order delivered"
        );
        Ok(updated)
    }

    /// Cancels an OPEN purchase order. Its payables are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `CannotCancel` unless the order is OPEN.
    #[instrument(skip(self))]
    pub async fn cancel_purchase_order(
        &self,
        actor: &Actor,
        order_id: Uuid,
    ) -> Result<purchase_orders::Model, OrderError> {
        authorize(actor, Operation::ManagePurchaseOrder)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock_purchase_order(&txn, order_id).await?;
        OrderService::validate_cancel_purchase(order_id, order.status.into())
            .inspect_err(|e| warn!(error = %e, "Cancel rejected"))?;

        let mut active: purchase_orders::ActiveModel = order.into();
        active.status = Set(PurchaseOrderStatusDb::Canceled);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(order_id = %order_id, "Purchase order canceled");
        Ok(updated)
    }

    /// Cancels an OPEN sales order and its OPEN receivables.
    ///
    /// # Errors
    ///
    /// Returns `CannotCancel` unless the order is OPEN.
    #[instrument(skip(self))]
    pub async fn cancel_sales_order(
        &self,
        actor: &Actor,
        order_id: Uuid,
    ) -> Result<sales_orders::Model, OrderError> {
        authorize(actor, Operation::ManageSalesOrder)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        let order = lock_sales_order(&txn, order_id).await?;
        OrderService::validate_cancel_sale(order_id, order.status.into())
            .inspect_err(|e| warn!(error = %e, "Cancel rejected"))?;

        let canceled = accounts_receivable::Entity::update_many()
            .col_expr(
                accounts_receivable::Column::Status,
                Expr::value(ReceivableStatusDb::Canceled),
            )
            .col_expr(
                accounts_receivable::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(accounts_receivable::Column::SalesOrderId.eq(order_id))
            .filter(accounts_receivable::Column::Status.eq(ReceivableStatusDb::Open))
            .exec(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?
            .rows_affected;

        let mut active: sales_orders::ActiveModel = order.into();
        active.status = Set(SalesOrderStatusDb::Canceled);
        active.updated_at = Set(Utc::now().into());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;

        info!(
            order_id = %order_id,
            canceled_receivables = canceled,
            "Sales order canceled"
        );
        Ok(updated)
    }

    /// Finds a purchase order with its items and payables.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub async fn find_purchase_order(&self, id: Uuid) -> Result<PurchaseOrderDetail, OrderError> {
        let order = load_purchase_order(&self.db, id).await?;
        let items = purchase_order_items::Entity::find()
            .filter(purchase_order_items::Column::PurchaseOrderId.eq(id))
            .all(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        let payables = accounts_payable::Entity::find()
            .filter(accounts_payable::Column::PurchaseOrderId.eq(id))
            .all(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        Ok(PurchaseOrderDetail {
            order,
            items,
            payables,
        })
    }

    /// Finds a sales order with its items and receivables.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub async fn find_sales_order(&self, id: Uuid) -> Result<SalesOrderDetail, OrderError> {
        let order = load_sales_order(&self.db, id).await?;
        let items = sales_order_items::Entity::find()
            .filter(sales_order_items::Column::SalesOrderId.eq(id))
            .all(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        let receivables = accounts_receivable::Entity::find()
            .filter(accounts_receivable::Column::SalesOrderId.eq(id))
            .all(&self.db)
            .await
            .map_err(|e| OrderError::Database(e.to_string()))?;
        Ok(SalesOrderDetail {
            order,
            items,
            receivables,
        })
    }

    /// Validates a batch of installments against the order, resolving every
    /// referenced payment method and category up front.
    async fn plan_installments(
        &self,
        txn: &DatabaseTransaction,
        context: &OrderContext,
        inputs: &[InstallmentInput],
    ) -> Result<Vec<PlannedInstallment>, OrderError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let method_ids: HashSet<Uuid> = inputs.iter().filter_map(|i| i.payment_method_id).collect();
        let category_ids: HashSet<Uuid> = inputs.iter().filter_map(|i| i.category_id).collect();

        let known_methods: HashSet<Uuid> = if method_ids.is_empty() {
            HashSet::new()
        } else {
            payment_methods::Entity::find()
                .filter(payment_methods::Column::Id.is_in(method_ids))
                .all(txn)
                .await
                .map_err(|e| OrderError::Database(e.to_string()))?
                .into_iter()
                .map(|m| m.id)
                .collect()
        };
        let known_categories: HashSet<Uuid> = if category_ids.is_empty() {
            HashSet::new()
        } else {
            categories::Entity::find()
                .filter(categories::Column::Id.is_in(category_ids))
                .all(txn)
                .await
                .map_err(|e| OrderError::Database(e.to_string()))?
                .into_iter()
                .map(|c| c.id)
                .collect()
        };

        InstallmentService::plan(
            context,
            inputs,
            self.tolerance,
            |id| known_methods.contains(&id),
            |id| known_categories.contains(&id),
        )
        .inspect_err(|e| warn!(order_id = %context.order_id, error = %e, "Installments rejected"))
        .map_err(OrderError::from)
    }
}

async fn load_purchase_order<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<purchase_orders::Model, OrderError> {
    purchase_orders::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?
        .ok_or(OrderError::NotFound(id))
}

/// Loads the order with `SELECT ... FOR UPDATE`; concurrent status changes
/// queue behind the current transaction.
async fn lock_purchase_order<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<purchase_orders::Model, OrderError> {
    purchase_orders::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?
        .ok_or(OrderError::NotFound(id))
}

async fn load_sales_order<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<sales_orders::Model, OrderError> {
    sales_orders::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?
        .ok_or(OrderError::NotFound(id))
}

/// Loads the order with `SELECT ... FOR UPDATE`; concurrent status changes
/// queue behind the current transaction.
async fn lock_sales_order<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<sales_orders::Model, OrderError> {
    sales_orders::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?
        .ok_or(OrderError::NotFound(id))
}

/// Loads the products referenced by `lines`, failing on the first missing one.
async fn load_products<C: ConnectionTrait>(
    conn: &C,
    lines: &[OrderLine],
) -> Result<HashMap<Uuid, products::Model>, OrderError> {
    let ids: HashSet<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let found: HashMap<Uuid, products::Model> = products::Entity::find()
        .filter(products::Column::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    match lines.iter().find(|l| !found.contains_key(&l.product_id)) {
        Some(missing) => Err(OrderError::ProductNotFound(missing.product_id)),
        None => Ok(found),
    }
}

fn product_type(products: &HashMap<Uuid, products::Model>, id: Uuid) -> ProductType {
    products
        .get(&id)
        .map_or(ProductType::Servico, |p| p.product_type.into())
}

fn delivery_lines(
    lines: impl Iterator<Item = (Uuid, Decimal)>,
    products: &HashMap<Uuid, products::Model>,
) -> Result<Vec<DeliveryLine>, OrderError> {
    lines
        .map(|(product_id, quantity)| {
            let product = products
                .get(&product_id)
                .ok_or(OrderError::ProductNotFound(product_id))?;
            Ok(DeliveryLine {
                product_id,
                product_name: product.name.clone(),
                product_type: product.product_type.into(),
                quantity,
            })
        })
        .collect()
}

fn physical_products(lines: &[DeliveryLine]) -> BTreeSet<Uuid> {
    lines
        .iter()
        .filter(|l| l.product_type.moves_stock())
        .map(|l| l.product_id)
        .collect()
}

/// Current balances of the physical products being sold, without locking.
async fn load_balances<C: ConnectionTrait>(
    conn: &C,
    lines: &[DeliveryLine],
) -> Result<HashMap<Uuid, Decimal>, OrderError> {
    let ids = physical_products(lines);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(stock_balances::Entity::find()
        .filter(stock_balances::Column::ProductId.is_in(ids))
        .all(conn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?
        .into_iter()
        .map(|b| (b.product_id, b.quantity))
        .collect())
}

async fn open_payables_total<C: ConnectionTrait>(
    conn: &C,
    purchase_order_id: Uuid,
) -> Result<Decimal, OrderError> {
    Ok(accounts_payable::Entity::find()
        .filter(accounts_payable::Column::PurchaseOrderId.eq(purchase_order_id))
        .filter(accounts_payable::Column::Status.eq(PayableStatusDb::from(PayableStatus::Open)))
        .all(conn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?
        .into_iter()
        .map(|p| p.amount)
        .sum())
}

/// Writes planned installments as OPEN payables. The payment method of an
/// installment is validated but only recorded once the payable is paid.
async fn insert_payables(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    supplier_id: Option<Uuid>,
    planned: &[PlannedInstallment],
    actor: &Actor,
) -> Result<Vec<accounts_payable::Model>, OrderError> {
    let mut rows = Vec::with_capacity(planned.len());
    for installment in planned {
        let now = Utc::now().into();
        let row = accounts_payable::ActiveModel {
            id: Set(Uuid::now_v7()),
            supplier_id: Set(supplier_id),
            purchase_order_id: Set(Some(order_id)),
            description: Set(installment.description.clone()),
            category_id: Set(installment.category_id),
            due_date: Set(installment.due_date),
            amount: Set(installment.amount),
            status: Set(PayableStatusDb::Open),
            paid_at: Set(None),
            payment_method_id: Set(None),
            is_delivery_cost: Set(false),
            created_by: Set(Some(actor.user_id.into_inner())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?;
        rows.push(row);
    }
    Ok(rows)
}

async fn insert_receivables(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    customer_id: Option<Uuid>,
    planned: &[PlannedInstallment],
    actor: &Actor,
) -> Result<Vec<accounts_receivable::Model>, OrderError> {
    let mut rows = Vec::with_capacity(planned.len());
    for installment in planned {
        let now = Utc::now().into();
        let row = accounts_receivable::ActiveModel {
            id: Set(Uuid::now_v7()),
            customer_id: Set(customer_id),
            sales_order_id: Set(Some(order_id)),
            description: Set(installment.description.clone()),
            category_id: Set(installment.category_id),
            due_date: Set(installment.due_date),
            amount: Set(installment.amount),
            original_amount: Set(installment.amount),
            status: Set(ReceivableStatusDb::Open),
            received_at: Set(None),
            payment_method_id: Set(None),
            payment_days: Set(installment.payment_days),
            created_by: Set(Some(actor.user_id.into_inner())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(|e| OrderError::Database(e.to_string()))?;
        rows.push(row);
    }
    Ok(rows)
}
