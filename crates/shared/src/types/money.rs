//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` everywhere; totals are compared with a
//! small tolerance so cent-level rounding in split amounts does not reject
//! otherwise valid input.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Tolerance applied when comparing two monetary totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tolerance(Decimal);

impl Tolerance {
    /// One cent, the default tolerance.
    pub const CENT: Self = Self(Decimal::from_parts(1, 0, 0, false, 2));

    /// Creates a tolerance; negative values are treated as their magnitude.
    #[must_use]
    pub fn new(epsilon: Decimal) -> Self {
        Self(epsilon.abs())
    }

    /// Returns the tolerance as a decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns true if `a` and `b` differ by no more than the tolerance.
    #[must_use]
    pub fn matches(self, a: Decimal, b: Decimal) -> bool {
        (a - b).abs() <= self.0
    }

    /// Returns true if `total` is above `limit` by more than the tolerance.
    #[must_use]
    pub fn exceeds(self, total: Decimal, limit: Decimal) -> bool {
        total - limit > self.0
    }

    /// Returns true if `amount` is zero within the tolerance.
    #[must_use]
    pub fn is_zero(self, amount: Decimal) -> bool {
        amount.abs() <= self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::CENT
    }
}

/// Rounds an amount to 2 decimal places, midpoint away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Remaining room under `limit` after `used`, never negative.
#[must_use]
pub fn headroom(limit: Decimal, used: Decimal) -> Decimal {
    (limit - used).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cent_constant() {
        assert_eq!(Tolerance::CENT.value(), dec!(0.01));
        assert_eq!(Tolerance::default(), Tolerance::CENT);
    }

    #[rstest]
    #[case(dec!(150.00), dec!(150.00), true)]
    #[case(dec!(150.00), dec!(150.01), true)]
    #[case(dec!(150.00), dec!(149.99), true)]
    #[case(dec!(150.00), dec!(151.00), false)]
    #[case(dec!(150.00), dec!(149.00), false)]
    fn test_matches(#[case] a: Decimal, #[case] b: Decimal, #[case] expected: bool) {
        assert_eq!(Tolerance::CENT.matches(a, b), expected);
    }

    #[rstest]
    #[case(dec!(300.00), dec!(300.00), false)]
    #[case(dec!(300.01), dec!(300.00), false)]
    #[case(dec!(300.02), dec!(300.00), true)]
    #[case(dec!(350.00), dec!(300.00), true)]
    fn test_exceeds(#[case] total: Decimal, #[case] limit: Decimal, #[case] expected: bool) {
        assert_eq!(Tolerance::CENT.exceeds(total, limit), expected);
    }

    #[test]
    fn test_negative_tolerance_is_normalized() {
        assert_eq!(Tolerance::new(dec!(-0.05)).value(), dec!(0.05));
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec!(33.335)), dec!(33.34));
        assert_eq!(round_money(dec!(-33.335)), dec!(-33.34));
        assert_eq!(round_money(dec!(10)), dec!(10));
    }

    #[test]
    fn test_headroom_never_negative() {
        assert_eq!(headroom(dec!(300), dec!(100)), dec!(200));
        assert_eq!(headroom(dec!(300), dec!(350)), Decimal::ZERO);
    }
}
