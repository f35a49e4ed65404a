//! Integration tests for the accounts-receivable repository.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use common::{actor, admin, date, seed_payment_method, seed_product, setup};
use ledgerly_core::journal::CashOrigin;
use ledgerly_core::order::OrderLine;
use ledgerly_core::receivable::{ReceivableError, ReceivableStatus};
use ledgerly_db::entities::sea_orm_active_enums::{ProductTypeDb, ReceivableStatusDb};
use ledgerly_db::repositories::{
    CashJournalRepository, CreateOrder, CreateReceivable, OrderRepository, ReceivableRepository,
    ReceiveReceivable, UpdateReceivable,
};
use ledgerly_shared::Role;

fn receivable(amount: Decimal, sales_order_id: Option<Uuid>) -> CreateReceivable {
    CreateReceivable {
        customer_id: None,
        sales_order_id,
        description: "Bread order".to_string(),
        category_id: None,
        due_date: date(2026, 4, 1),
        amount,
    }
}

/// Creates a sales order of a single service line, so no stock is needed.
async fn seed_sales_order(db: &DatabaseConnection, total: Decimal) -> Uuid {
    let service = seed_product(db, "Catering", ProductTypeDb::Servico).await;
    OrderRepository::new(db.clone())
        .create_sales_order(
            &admin(),
            CreateOrder {
                counterparty_id: None,
                order_date: date(2026, 3, 1),
                notes: None,
                lines: vec![OrderLine {
                    product_id: service,
                    quantity: dec!(1),
                    unit_price: total,
                }],
                installments: Vec::new(),
            },
        )
        .await
        .unwrap()
        .order
        .id
}

#[tokio::test]
async fn test_receive_then_reverse_round_trip() {
    let db = setup().await;
    let repo = ReceivableRepository::new(db.clone());
    let journal = CashJournalRepository::new(db.clone());
    let method = seed_payment_method(&db).await;
    let created = repo
        .create(&actor(Role::Financeiro), receivable(dec!(120), None))
        .await
        .unwrap();

    let received = repo
        .receive(
            &actor(Role::Financeiro),
            created.id,
            ReceiveReceivable {
                payment_method_id: Some(method),
                ..ReceiveReceivable::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(received.status, ReceivableStatusDb::Received);
    assert!(received.received_at.is_some());
    assert_eq!(
        journal.total_for_origin(CashOrigin::Ar, created.id).await.unwrap(),
        dec!(120)
    );

    let (reversed, plan) = repo.reverse(&admin(), created.id).await.unwrap();
    assert_eq!(reversed.status, ReceivableStatusDb::Open);
    assert!(reversed.received_at.is_none());
    assert!(reversed.payment_method_id.is_none());
    assert_eq!(reversed.amount, dec!(120));
    assert_eq!(plan.removed_transactions, 1);
    assert_eq!(plan.journaled_total, dec!(120));
    assert!(journal
        .list_by_origin(CashOrigin::Ar, created.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_partial_receipts_then_reverse_restores_face_value() {
    let db = setup().await;
    let repo = ReceivableRepository::new(db.clone());
    let journal = CashJournalRepository::new(db.clone());
    let id = repo
        .create(&admin(), receivable(dec!(100), None))
        .await
        .unwrap()
        .id;

    let first = repo
        .receive_partial(&admin(), id, dec!(40), ReceiveReceivable::default())
        .await
        .unwrap();
    assert_eq!(first.status, ReceivableStatusDb::Open);
    assert_eq!(first.amount, dec!(60));
    assert_eq!(first.original_amount, dec!(100));
    assert!(first.received_at.is_none());

    let second = repo
        .receive_partial(&admin(), id, dec!(60), ReceiveReceivable::default())
        .await
        .unwrap();
    assert_eq!(second.status, ReceivableStatusDb::Received);
    assert!(second.received_at.is_some());
    assert_eq!(
        journal.total_for_origin(CashOrigin::Ar, id).await.unwrap(),
        dec!(100)
    );

    let (reversed, plan) = repo.reverse(&admin(), id).await.unwrap();
    assert_eq!(reversed.amount, dec!(100));
    assert_eq!(plan.restored_amount, dec!(100));
    assert_eq!(plan.removed_transactions, 2);
    assert_eq!(plan.journaled_total, dec!(100));
}

#[tokio::test]
async fn test_partial_receipt_larger_than_outstanding() {
    let db = setup().await;
    let repo = ReceivableRepository::new(db.clone());
    let id = repo
        .create(&admin(), receivable(dec!(50), None))
        .await
        .unwrap()
        .id;

    let err = repo
        .receive_partial(&admin(), id, dec!(70), ReceiveReceivable::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::ExceedsOutstanding { .. }));
    assert_eq!(repo.find(id).await.unwrap().amount, dec!(50));
}

#[tokio::test]
async fn test_received_receivable_is_frozen() {
    let db = setup().await;
    let repo = ReceivableRepository::new(db.clone());
    let id = repo
        .create(&admin(), receivable(dec!(50), None))
        .await
        .unwrap()
        .id;
    repo.receive(&admin(), id, ReceiveReceivable::default())
        .await
        .unwrap();

    let err = repo
        .update(
            &admin(),
            id,
            UpdateReceivable {
                amount: Some(dec!(10)),
                ..UpdateReceivable::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::CannotModifyReceived(_)));

    let err = repo.delete(&admin(), id).await.unwrap_err();
    assert!(matches!(err, ReceivableError::CannotModifyReceived(_)));

    let err = repo.cancel(&admin(), id).await.unwrap_err();
    assert!(matches!(
        err,
        ReceivableError::CannotCancel {
            status: ReceivableStatus::Received,
            ..
        }
    ));

    let err = repo
        .receive(&admin(), id, ReceiveReceivable::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::NotOpen { .. }));
}

#[tokio::test]
async fn test_cancel_is_terminal() {
    let db = setup().await;
    let repo = ReceivableRepository::new(db.clone());
    let id = repo
        .create(&admin(), receivable(dec!(50), None))
        .await
        .unwrap()
        .id;

    let canceled = repo.cancel(&admin(), id).await.unwrap();
    assert_eq!(canceled.status, ReceivableStatusDb::Canceled);

    let err = repo
        .receive(&admin(), id, ReceiveReceivable::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::NotOpen { .. }));

    let err = repo
        .update(
            &admin(),
            id,
            UpdateReceivable {
                description: Some("Renamed".to_string()),
                ..UpdateReceivable::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::CannotModifyCanceled(_)));
}

#[tokio::test]
async fn test_order_headroom_on_create_and_update() {
    let db = setup().await;
    let repo = ReceivableRepository::new(db.clone());
    let order = seed_sales_order(&db, dec!(300)).await;

    let first = repo
        .create(&admin(), receivable(dec!(200), Some(order)))
        .await
        .unwrap();

    let err = repo
        .create(&admin(), receivable(dec!(150), Some(order)))
        .await
        .unwrap_err();
    match err {
        ReceivableError::ExceedsOrderTotal {
            requested_total,
            order_total,
            available,
        } => {
            assert_eq!(requested_total, dec!(350));
            assert_eq!(order_total, dec!(300));
            assert_eq!(available, dec!(100));
        }
        other => panic!("expected ExceedsOrderTotal, got {other:?}"),
    }

    repo.create(&admin(), receivable(dec!(100), Some(order)))
        .await
        .unwrap();

    let err = repo
        .update(
            &admin(),
            first.id,
            UpdateReceivable {
                amount: Some(dec!(250)),
                ..UpdateReceivable::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::ExceedsOrderTotal { .. }));

    let lowered = repo
        .update(
            &admin(),
            first.id,
            UpdateReceivable {
                amount: Some(dec!(150)),
                ..UpdateReceivable::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(lowered.amount, dec!(150));
    assert_eq!(lowered.original_amount, dec!(150));
}

#[tokio::test]
async fn test_canceled_receivable_frees_order_headroom() {
    let db = setup().await;
    let repo = ReceivableRepository::new(db.clone());
    let order = seed_sales_order(&db, dec!(100)).await;

    let first = repo
        .create(&admin(), receivable(dec!(100), Some(order)))
        .await
        .unwrap();
    repo.cancel(&admin(), first.id).await.unwrap();

    let replacement = repo
        .create(&admin(), receivable(dec!(100), Some(order)))
        .await
        .unwrap();
    assert_eq!(replacement.status, ReceivableStatusDb::Open);
    assert_eq!(repo.list_by_sales_order(order).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_sales_order_is_rejected() {
    let db = setup().await;
    let repo = ReceivableRepository::new(db.clone());
    let missing = Uuid::new_v4();

    let err = repo
        .create(&admin(), receivable(dec!(10), Some(missing)))
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::SalesOrderNotFound(got) if got == missing));
}

#[tokio::test]
async fn test_receive_forbidden_for_stock_role() {
    let db = setup().await;
    let repo = ReceivableRepository::new(db.clone());
    let id = repo
        .create(&admin(), receivable(dec!(10), None))
        .await
        .unwrap()
        .id;

    let err = repo
        .receive(&actor(Role::Estoque), id, ReceiveReceivable::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ReceivableError::Forbidden(_)));
}

#[tokio::test]
async fn test_second_receipt_reports_status_before_method_lookup() {
    let db = setup().await;
    let repo = ReceivableRepository::new(db.clone());
    let journal = CashJournalRepository::new(db.clone());
    let id = repo
        .create(&admin(), receivable(dec!(30), None))
        .await
        .unwrap()
        .id;
    repo.receive(&admin(), id, ReceiveReceivable::default())
        .await
        .unwrap();

    let err = repo
        .receive(
            &admin(),
            id,
            ReceiveReceivable {
                payment_method_id: Some(Uuid::new_v4()),
                ..ReceiveReceivable::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReceivableError::NotOpen {
            status: ReceivableStatus::Received,
            ..
        }
    ));
    assert_eq!(journal.list_by_origin(CashOrigin::Ar, id).await.unwrap().len(), 1);
}
