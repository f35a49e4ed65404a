//! Property-based tests for StockService.
//!
//! - Reconciliation is non-negative and idempotent
//! - Incremental updates agree with reconciliation while the balance stays non-negative
//! - A planned delivery never drives a balance below zero

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::StockError;
use super::service::StockService;
use super::types::{DeliveryLine, MovementType, ProductType};

/// Strategy to generate quantities (0.001 to 1,000.000).
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|v| Decimal::new(v, 3))
}

fn movement_type() -> impl Strategy<Value = MovementType> {
    prop_oneof![
        Just(MovementType::In),
        Just(MovementType::Out),
        Just(MovementType::Adjust),
    ]
}

/// Strategy to generate a movement log; ADJUST quantities get a random sign.
fn movements() -> impl Strategy<Value = Vec<(MovementType, Decimal)>> {
    prop::collection::vec((movement_type(), quantity(), any::<bool>()), 0..30).prop_map(|raw| {
        raw.into_iter()
            .map(|(t, q, negative)| match t {
                MovementType::Adjust if negative => (t, -q),
                _ => (t, q),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_reconcile_non_negative_and_idempotent(log in movements()) {
        let first = StockService::reconcile(log.clone());
        let second = StockService::reconcile(log);
        prop_assert!(first >= Decimal::ZERO);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_incremental_matches_reconcile(log in movements()) {
        let mut balance: Option<Decimal> = None;
        let mut went_negative = false;
        for (t, q) in &log {
            let next = StockService::apply(balance, StockService::signed_effect(*t, *q));
            went_negative |= next < Decimal::ZERO;
            balance = Some(next);
        }
        prop_assume!(!went_negative);

        let incremental = balance.unwrap_or(Decimal::ZERO);
        prop_assert_eq!(StockService::reconcile(log), incremental);
    }

    #[test]
    fn prop_delivery_never_negative(
        available in quantity(),
        requests in prop::collection::vec(quantity(), 1..5),
    ) {
        let product_id = Uuid::new_v4();
        let lines: Vec<DeliveryLine> = requests
            .iter()
            .map(|q| DeliveryLine {
                product_id,
                product_name: "Generated".to_string(),
                product_type: ProductType::Pa,
                quantity: *q,
            })
            .collect();
        let balances = HashMap::from([(product_id, available)]);
        let total: Decimal = requests.iter().copied().sum();

        match StockService::plan_delivery(Uuid::new_v4(), &lines, &balances) {
            Ok(movements) => {
                prop_assert!(total <= available);
                let after = movements
                    .iter()
                    .fold(available, |acc, m| StockService::apply(Some(acc), m.signed_quantity()));
                prop_assert!(after >= Decimal::ZERO);
            }
            Err(StockError::InsufficientStock { requested, .. }) => {
                prop_assert!(total > available);
                prop_assert_eq!(requested, total);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
