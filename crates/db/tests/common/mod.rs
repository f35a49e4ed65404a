//! Shared setup for the repository integration tests.
//!
//! Every test gets its own in-memory SQLite database migrated with the same
//! `Migrator` used in production.

#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use ledgerly_db::entities::sea_orm_active_enums::ProductTypeDb;
use ledgerly_db::entities::{categories, payment_methods, products};
use ledgerly_db::migration::Migrator;
use ledgerly_db::repositories::{CreateInvestor, CreatePayable, InvestorRepository, PayableRepository};
use ledgerly_db::connect;
use ledgerly_shared::config::DatabaseConfig;
use ledgerly_shared::types::UserId;
use ledgerly_shared::{Actor, Role};

pub async fn setup() -> DatabaseConnection {
    let db = connect(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub fn actor(role: Role) -> Actor {
    Actor::new(UserId::new(), role)
}

pub fn admin() -> Actor {
    actor(Role::Admin)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn seed_product(db: &DatabaseConnection, name: &str, product_type: ProductTypeDb) -> Uuid {
    let now = Utc::now().into();
    products::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set(name.to_string()),
        sku: Set(None),
        product_type: Set(product_type),
        cost_price: Set(None),
        sale_price: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed product")
    .id
}

pub async fn seed_payment_method(db: &DatabaseConnection) -> Uuid {
    payment_methods::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set("PIX".to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed payment method")
    .id
}

pub async fn seed_category(db: &DatabaseConnection) -> Uuid {
    categories::ActiveModel {
        id: Set(Uuid::now_v7()),
        name: Set("Supplies".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed category")
    .id
}

pub async fn seed_investor(db: &DatabaseConnection, name: &str) -> Uuid {
    InvestorRepository::new(db.clone())
        .create(
            &admin(),
            CreateInvestor {
                name: name.to_string(),
                email: None,
                phone: None,
            },
        )
        .await
        .expect("Failed to seed investor")
        .id
}

pub async fn seed_payable(db: &DatabaseConnection, amount: Decimal) -> Uuid {
    PayableRepository::new(db.clone())
        .create(
            &admin(),
            CreatePayable {
                supplier_id: None,
                description: "Flour delivery".to_string(),
                category_id: None,
                due_date: date(2026, 3, 10),
                amount,
            },
        )
        .await
        .expect("Failed to seed payable")
        .id
}
