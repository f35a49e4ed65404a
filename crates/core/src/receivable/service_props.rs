//! Property-based tests for ReceivableService.
//!
//! - Any sequence of partial receipts followed by a reversal restores the face value
//! - Journaled receipts never exceed the face value

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::ReceivableService;
use super::types::{ReceivableSnapshot, ReceivableStatus};
use ledgerly_shared::types::Tolerance;

/// Strategy to generate positive amounts (1.00 to 10,000.00).
fn face_value() -> impl Strategy<Value = Decimal> {
    (100i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate receipt fractions in percent.
fn fractions() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..=100u32, 1..=6)
}

fn make_receivable(amount: Decimal) -> ReceivableSnapshot {
    ReceivableSnapshot {
        id: Uuid::new_v4(),
        status: ReceivableStatus::Open,
        amount,
        original_amount: amount,
        description: "Generated".to_string(),
        category_id: None,
    }
}

/// Applies partial receipts of `pct`% of what is outstanding, then receives
/// the rest if still open. Returns the final snapshot and journaled amounts.
fn receive_in_parts(face: Decimal, pcts: &[u32]) -> (ReceivableSnapshot, Vec<Decimal>) {
    let mut ar = make_receivable(face);
    let mut journaled = Vec::new();

    for pct in pcts {
        if ar.status != ReceivableStatus::Open {
            break;
        }
        let part = (ar.amount * Decimal::from(*pct) / Decimal::from(100)).round_dp(2);
        if part <= Decimal::ZERO {
            continue;
        }
        let plan =
            ReceivableService::plan_partial_receipt(&ar, part, None, None, Tolerance::CENT)
                .unwrap();
        journaled.push(plan.cash.amount);
        ar.amount = plan.amount;
        ar.status = plan.status;
    }

    if ar.status == ReceivableStatus::Open {
        let plan = ReceivableService::plan_receive(&ar, None, None).unwrap();
        journaled.push(plan.cash.amount);
        ar.amount = plan.amount;
        ar.status = plan.status;
    }

    (ar, journaled)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_reverse_restores_face_value(face in face_value(), pcts in fractions()) {
        let (ar, journaled) = receive_in_parts(face, &pcts);
        prop_assert_eq!(ar.status, ReceivableStatus::Received);

        let reversal = ReceivableService::plan_reverse(&ar, &journaled).unwrap();
        prop_assert_eq!(reversal.restored_amount, face);
        prop_assert_eq!(reversal.removed_transactions, journaled.len());
    }

    #[test]
    fn prop_journaled_total_matches_face_value(face in face_value(), pcts in fractions()) {
        let (_, journaled) = receive_in_parts(face, &pcts);
        let total: Decimal = journaled.iter().copied().sum();
        prop_assert!(Tolerance::CENT.matches(total, face));
    }
}
