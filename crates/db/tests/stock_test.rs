//! Integration tests for manual stock adjustments and reconciliation.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{actor, admin, seed_product, setup};
use ledgerly_core::stock::{AdjustmentInput, AdjustmentType, StockError};
use ledgerly_db::entities::sea_orm_active_enums::{MovementTypeDb, ProductTypeDb, ReferenceTypeDb};
use ledgerly_db::repositories::StockRepository;
use ledgerly_shared::Role;

fn adjustment(product_id: Uuid, quantity: Decimal) -> AdjustmentInput {
    AdjustmentInput {
        product_id,
        adjustment_type: AdjustmentType::Inventario,
        quantity,
        reason: "Monthly count".to_string(),
        photo: None,
    }
}

#[tokio::test]
async fn test_adjustment_updates_balance_with_paired_movement() {
    let db = setup().await;
    let repo = StockRepository::new(db.clone());
    let flour = seed_product(&db, "Flour", ProductTypeDb::Mp).await;

    repo.adjust(&actor(Role::Estoque), adjustment(flour, dec!(10)))
        .await
        .unwrap();
    let result = repo
        .adjust(&actor(Role::Estoque), adjustment(flour, dec!(-3)))
        .await
        .unwrap();

    assert_eq!(result.balance, dec!(7));
    assert_eq!(result.adjustment.movement_id, result.movement.id);
    assert_eq!(result.movement.movement_type, MovementTypeDb::Adjust);
    assert_eq!(result.movement.reference_type, ReferenceTypeDb::Manual);
    assert_eq!(repo.balance(flour).await.unwrap(), dec!(7));
    assert_eq!(repo.adjustments(flour).await.unwrap().len(), 2);
    assert_eq!(repo.movements(flour).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_damage_requires_photo() {
    let db = setup().await;
    let repo = StockRepository::new(db.clone());
    let flour = seed_product(&db, "Flour", ProductTypeDb::Mp).await;

    let mut input = adjustment(flour, dec!(-1));
    input.adjustment_type = AdjustmentType::Avaria;
    let err = repo.adjust(&admin(), input.clone()).await.unwrap_err();
    assert!(matches!(err, StockError::PhotoRequired));
    assert!(repo.movements(flour).await.unwrap().is_empty());

    input.photo = Some("uploads/broken-bag.jpg".to_string());
    let result = repo.adjust(&admin(), input).await.unwrap();
    assert_eq!(result.adjustment.photo.as_deref(), Some("uploads/broken-bag.jpg"));
}

#[tokio::test]
async fn test_adjustment_on_service_or_missing_product() {
    let db = setup().await;
    let repo = StockRepository::new(db.clone());
    let catering = seed_product(&db, "Catering", ProductTypeDb::Servico).await;
    let missing = Uuid::new_v4();

    let err = repo
        .adjust(&admin(), adjustment(catering, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::ServiceProduct(_)));

    let err = repo
        .adjust(&admin(), adjustment(missing, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::ProductNotFound(got) if got == missing));
}

#[tokio::test]
async fn test_reconcile_clamps_at_zero_and_is_idempotent() {
    let db = setup().await;
    let repo = StockRepository::new(db.clone());
    let flour = seed_product(&db, "Flour", ProductTypeDb::Mp).await;

    repo.adjust(&admin(), adjustment(flour, dec!(2)))
        .await
        .unwrap();
    // The incremental balance may go negative; reconcile clamps it.
    repo.adjust(&admin(), adjustment(flour, dec!(-5)))
        .await
        .unwrap();
    assert_eq!(repo.balance(flour).await.unwrap(), dec!(-3));

    let first = repo.reconcile(&admin(), flour).await.unwrap();
    let second = repo.reconcile(&admin(), flour).await.unwrap();
    assert_eq!(first, Decimal::ZERO);
    assert_eq!(second, Decimal::ZERO);
    assert_eq!(repo.balance(flour).await.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn test_reconcile_without_movements_creates_zero_balance() {
    let db = setup().await;
    let repo = StockRepository::new(db.clone());
    let flour = seed_product(&db, "Flour", ProductTypeDb::Mp).await;

    assert_eq!(repo.reconcile(&admin(), flour).await.unwrap(), Decimal::ZERO);
    assert_eq!(repo.balance(flour).await.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn test_stock_roles() {
    let db = setup().await;
    let repo = StockRepository::new(db.clone());
    let flour = seed_product(&db, "Flour", ProductTypeDb::Mp).await;

    let err = repo
        .adjust(&actor(Role::Financeiro), adjustment(flour, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::Forbidden(_)));

    let err = repo
        .reconcile(&actor(Role::Vendas), flour)
        .await
        .unwrap_err();
    assert!(matches!(err, StockError::Forbidden(_)));
}
