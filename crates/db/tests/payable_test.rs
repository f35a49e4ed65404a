//! Integration tests for the accounts-payable repository.

mod common;

use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{actor, admin, seed_investor, seed_payable, seed_payment_method, setup};
use ledgerly_core::journal::CashOrigin;
use ledgerly_core::payable::{PayableError, PaymentSourceInput};
use ledgerly_db::entities::sea_orm_active_enums::{CashDirectionDb, PayableStatusDb};
use ledgerly_db::repositories::{
    CashJournalRepository, InvestorRepository, PayPayable, PayableRepository, UpdatePayable,
};
use ledgerly_shared::Role;
use ledgerly_shared::config::LedgerConfig;

#[tokio::test]
async fn test_pay_single_method_journals_one_out_entry() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let journal = CashJournalRepository::new(db.clone());
    let method = seed_payment_method(&db).await;
    let id = seed_payable(&db, dec!(150)).await;

    let paid = repo
        .pay(
            &actor(Role::Financeiro),
            id,
            PayPayable {
                payment_method_id: Some(method),
                ..PayPayable::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(paid.payable.status, PayableStatusDb::Paid);
    assert!(paid.payable.paid_at.is_some());
    assert_eq!(paid.payable.payment_method_id, Some(method));
    assert!(paid.sources.is_empty());

    let entries = journal.list_by_origin(CashOrigin::Ap, id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].direction, CashDirectionDb::Out);
    assert_eq!(entries[0].amount, dec!(150));
}

#[tokio::test]
async fn test_pay_split_sources_then_reverse() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let journal = CashJournalRepository::new(db.clone());
    let ana = seed_investor(&db, "Ana").await;
    let bruno = seed_investor(&db, "Bruno").await;
    let id = seed_payable(&db, dec!(150)).await;

    let paid = repo
        .pay(
            &admin(),
            id,
            PayPayable {
                sources: Some(vec![
                    PaymentSourceInput {
                        investor_id: ana,
                        amount: dec!(100),
                    },
                    PaymentSourceInput {
                        investor_id: bruno,
                        amount: dec!(50),
                    },
                ]),
                ..PayPayable::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(paid.sources.len(), 2);
    assert_eq!(paid.payable.status, PayableStatusDb::Paid);
    let found = repo.find(id).await.unwrap();
    assert_eq!(found.sources.len(), 2);
    assert!(found.sources.iter().any(|s| s.investor_name == "Ana"));
    assert_eq!(journal.total_for_origin(CashOrigin::Ap, id).await.unwrap(), dec!(150));

    let reversal = repo.reverse(&admin(), id).await.unwrap();
    assert_eq!(reversal.payable.status, PayableStatusDb::Open);
    assert!(reversal.payable.paid_at.is_none());
    assert!(reversal.payable.payment_method_id.is_none());
    assert_eq!(reversal.removed_sources, 2);
    assert_eq!(reversal.removed_transactions, 1);

    assert!(repo.find(id).await.unwrap().sources.is_empty());
    assert!(journal.list_by_origin(CashOrigin::Ap, id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pay_rejects_source_mismatch_without_writing() {
    let db = setup().await;
    let repo =
        PayableRepository::new(db.clone()).with_tolerance(LedgerConfig::default().tolerance());
    let journal = CashJournalRepository::new(db.clone());
    let ana = seed_investor(&db, "Ana").await;
    let bruno = seed_investor(&db, "Bruno").await;
    let id = seed_payable(&db, dec!(150)).await;

    for second in [dec!(49), dec!(51)] {
        let err = repo
            .pay(
                &admin(),
                id,
                PayPayable {
                    sources: Some(vec![
                        PaymentSourceInput {
                            investor_id: ana,
                            amount: dec!(100),
                        },
                        PaymentSourceInput {
                            investor_id: bruno,
                            amount: second,
                        },
                    ]),
                    ..PayPayable::default()
                },
            )
            .await
            .unwrap_err();

        match err {
            PayableError::SourceSumMismatch {
                sources_total,
                account_amount,
            } => {
                assert_eq!(sources_total, dec!(100) + second);
                assert_eq!(account_amount, dec!(150));
            }
            other => panic!("expected SourceSumMismatch, got {other:?}"),
        }
    }

    let found = repo.find(id).await.unwrap();
    assert_eq!(found.payable.status, PayableStatusDb::Open);
    assert!(found.sources.is_empty());
    assert!(journal.list_by_origin(CashOrigin::Ap, id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pay_rejects_inactive_investor() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let ana = seed_investor(&db, "Ana").await;
    InvestorRepository::new(db.clone())
        .deactivate(&admin(), ana)
        .await
        .unwrap();
    let id = seed_payable(&db, dec!(80)).await;

    let err = repo
        .pay(
            &admin(),
            id,
            PayPayable {
                sources: Some(vec![PaymentSourceInput {
                    investor_id: ana,
                    amount: dec!(80),
                }]),
                ..PayPayable::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PayableError::InvalidInvestors {
            requested: 1,
            active: 0
        }
    ));
}

#[tokio::test]
async fn test_pay_twice_fails_and_keeps_single_entry() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let journal = CashJournalRepository::new(db.clone());
    let method = seed_payment_method(&db).await;
    let id = seed_payable(&db, dec!(20)).await;
    let input = PayPayable {
        payment_method_id: Some(method),
        ..PayPayable::default()
    };

    repo.pay(&admin(), id, input.clone()).await.unwrap();
    let err = repo.pay(&admin(), id, input).await.unwrap_err();

    assert!(matches!(err, PayableError::AlreadyPaid(got) if got == id));
    assert_eq!(journal.list_by_origin(CashOrigin::Ap, id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_pay_unknown_payment_method() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let id = seed_payable(&db, dec!(20)).await;
    let missing = Uuid::new_v4();

    let err = repo
        .pay(
            &admin(),
            id,
            PayPayable {
                payment_method_id: Some(missing),
                ..PayPayable::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PayableError::PaymentMethodNotFound(got) if got == missing));
}

#[tokio::test]
async fn test_reverse_open_payable_is_rejected() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let id = seed_payable(&db, dec!(20)).await;

    let err = repo.reverse(&admin(), id).await.unwrap_err();
    assert!(matches!(err, PayableError::NotPaid(_)));
}

#[tokio::test]
async fn test_paid_payable_cannot_be_modified() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let method = seed_payment_method(&db).await;
    let id = seed_payable(&db, dec!(20)).await;
    repo.pay(
        &admin(),
        id,
        PayPayable {
            payment_method_id: Some(method),
            ..PayPayable::default()
        },
    )
    .await
    .unwrap();

    let err = repo
        .update(
            &admin(),
            id,
            UpdatePayable {
                amount: Some(dec!(25)),
                ..UpdatePayable::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PayableError::CannotModifyPaid(_)));

    let err = repo.delete(&admin(), id).await.unwrap_err();
    assert!(matches!(err, PayableError::CannotModifyPaid(_)));
}

#[tokio::test]
async fn test_delivery_cost_flag_requires_paid() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let method = seed_payment_method(&db).await;
    let paid = seed_payable(&db, dec!(30)).await;
    let open = seed_payable(&db, dec!(40)).await;
    repo.pay(
        &admin(),
        paid,
        PayPayable {
            payment_method_id: Some(method),
            ..PayPayable::default()
        },
    )
    .await
    .unwrap();

    let err = repo
        .set_delivery_cost(&admin(), &[paid, open], true)
        .await
        .unwrap_err();
    assert!(matches!(err, PayableError::UnpaidDeliveryCost(ref ids) if ids == &vec![open]));
    assert!(!repo.find(paid).await.unwrap().payable.is_delivery_cost);

    let err = repo
        .set_delivery_cost(&admin(), &[paid, Uuid::new_v4()], true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PayableError::BulkNotFound {
            requested: 2,
            found: 1
        }
    ));

    let updated = repo.set_delivery_cost(&admin(), &[paid], true).await.unwrap();
    assert_eq!(updated, 1);
    assert!(repo.find(paid).await.unwrap().payable.is_delivery_cost);

    // Reversal clears the flag.
    let reversal = repo.reverse(&admin(), paid).await.unwrap();
    assert!(!reversal.payable.is_delivery_cost);
}

#[tokio::test]
async fn test_pay_forbidden_for_sales_role() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let method = seed_payment_method(&db).await;
    let id = seed_payable(&db, dec!(20)).await;

    let err = repo
        .pay(
            &actor(Role::Vendas),
            id,
            PayPayable {
                payment_method_id: Some(method),
                ..PayPayable::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PayableError::Forbidden(_)));
    assert_eq!(
        repo.find(id).await.unwrap().payable.status,
        PayableStatusDb::Open
    );
}

#[tokio::test]
async fn test_concurrent_pays_journal_once() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let journal = CashJournalRepository::new(db.clone());
    let ana = seed_investor(&db, "Ana").await;
    let id = seed_payable(&db, dec!(90)).await;
    let input = PayPayable {
        sources: Some(vec![PaymentSourceInput {
            investor_id: ana,
            amount: dec!(90),
        }]),
        ..PayPayable::default()
    };

    let actor = admin();
    let (first, second) = tokio::join!(
        repo.pay(&actor, id, input.clone()),
        repo.pay(&actor, id, input)
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(PayableError::AlreadyPaid(got)) if *got == id))
    );
    assert_eq!(journal.list_by_origin(CashOrigin::Ap, id).await.unwrap().len(), 1);
    assert_eq!(repo.find(id).await.unwrap().sources.len(), 1);
}

#[tokio::test]
async fn test_pay_paid_payable_reports_already_paid_before_method_lookup() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let method = seed_payment_method(&db).await;
    let id = seed_payable(&db, dec!(20)).await;
    repo.pay(
        &admin(),
        id,
        PayPayable {
            payment_method_id: Some(method),
            ..PayPayable::default()
        },
    )
    .await
    .unwrap();

    let err = repo
        .pay(
            &admin(),
            id,
            PayPayable {
                payment_method_id: Some(Uuid::new_v4()),
                ..PayPayable::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PayableError::AlreadyPaid(got) if got == id));
    assert_eq!(err.error_code(), "ALREADY_PAID");
}

#[tokio::test]
async fn test_paid_payable_json_carries_numeric_amounts() {
    let db = setup().await;
    let repo = PayableRepository::new(db.clone());
    let journal = CashJournalRepository::new(db.clone());
    let method = seed_payment_method(&db).await;
    let id = seed_payable(&db, dec!(75.30)).await;
    let paid = repo
        .pay(
            &admin(),
            id,
            PayPayable {
                payment_method_id: Some(method),
                ..PayPayable::default()
            },
        )
        .await
        .unwrap();

    let payable = serde_json::to_value(&paid.payable).unwrap();
    assert!(payable["amount"].is_number());
    let amount: rust_decimal::Decimal = payable["amount"].to_string().parse().unwrap();
    assert_eq!(amount, dec!(75.30));

    let entries = journal.list_by_origin(CashOrigin::Ap, id).await.unwrap();
    let entry = serde_json::to_value(&entries[0]).unwrap();
    assert!(entry["amount"].is_number());
}
