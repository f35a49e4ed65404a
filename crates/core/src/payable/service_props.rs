//! Property-based tests for PayableService.
//!
//! - Split sources are accepted exactly when their sum is within a cent
//! - A planned payment always journals one OUT entry for the full amount

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::PayableError;
use super::service::PayableService;
use super::types::{
    FundingInvestor, PayableSnapshot, PayableStatus, PaymentSourceInput, PaymentSpec,
};
use crate::journal::{CashDirection, CashOrigin};
use ledgerly_shared::types::Tolerance;

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a list of source amounts (1 to 5 entries).
fn source_amounts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(positive_amount(), 1..=5)
}

fn make_payable(amount: Decimal) -> PayableSnapshot {
    PayableSnapshot {
        id: Uuid::new_v4(),
        status: PayableStatus::Open,
        amount,
        description: "Generated".to_string(),
        category_id: None,
    }
}

fn make_split(amounts: &[Decimal]) -> (PaymentSpec, Vec<FundingInvestor>) {
    let investors: Vec<FundingInvestor> = amounts
        .iter()
        .enumerate()
        .map(|(i, _)| FundingInvestor {
            id: Uuid::new_v4(),
            name: format!("Investor {i}"),
            is_active: true,
        })
        .collect();
    let sources = investors
        .iter()
        .zip(amounts)
        .map(|(inv, amount)| PaymentSourceInput {
            investor_id: inv.id,
            amount: *amount,
        })
        .collect();
    (
        PaymentSpec::SplitSources {
            payment_method_id: None,
            sources,
        },
        investors,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_split_accepted_iff_within_tolerance(
        amounts in source_amounts(),
        drift_cents in -300i64..300i64,
    ) {
        let total: Decimal = amounts.iter().copied().sum();
        let account_amount = total + Decimal::new(drift_cents, 2);
        prop_assume!(account_amount > Decimal::ZERO);

        let payable = make_payable(account_amount);
        let (spec, investors) = make_split(&amounts);
        let result = PayableService::plan_payment(
            &payable,
            &spec,
            None,
            &investors,
            Tolerance::CENT,
        );

        if drift_cents.abs() <= 1 {
            prop_assert!(result.is_ok());
        } else {
            match result {
                Err(PayableError::SourceSumMismatch { sources_total, account_amount: cited }) => {
                    prop_assert_eq!(sources_total, total);
                    prop_assert_eq!(cited, account_amount);
                }
                other => prop_assert!(false, "Expected SourceSumMismatch, got {:?}", other),
            }
        }
    }

    #[test]
    fn prop_plan_journals_full_amount(amounts in source_amounts()) {
        let total: Decimal = amounts.iter().copied().sum();
        let payable = make_payable(total);
        let (spec, investors) = make_split(&amounts);

        let plan = PayableService::plan_payment(
            &payable,
            &spec,
            None,
            &investors,
            Tolerance::CENT,
        ).unwrap();

        prop_assert_eq!(plan.cash.direction, CashDirection::Out);
        prop_assert_eq!(plan.cash.origin, CashOrigin::Ap);
        prop_assert_eq!(plan.cash.amount, total);
        prop_assert_eq!(plan.sources.len(), amounts.len());
        let planned: Decimal = plan.sources.iter().map(|s| s.amount).sum();
        prop_assert_eq!(planned, total);
    }

    #[test]
    fn prop_paid_payable_never_plans(amount in positive_amount()) {
        let mut payable = make_payable(amount);
        payable.status = PayableStatus::Paid;
        let spec = PaymentSpec::SingleMethod { payment_method_id: None };

        let result = PayableService::plan_payment(&payable, &spec, None, &[], Tolerance::CENT);
        prop_assert!(matches!(result, Err(PayableError::AlreadyPaid(_))));
    }
}
