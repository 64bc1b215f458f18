//! Basis-point tolerance checks and the three-way median.
//!
//! Deviation is measured relative to a baseline price:
//!
//! ```text
//! deviation_bps = |value - baseline| * 10_000 / baseline
//! ```
//!
//! Tolerance checks compare cross-multiplied integers instead, so no
//! precision is lost to truncating division.

use triad_types::{Price, BPS_DENOMINATOR};

/// Whether `value` lies within `tolerance_bps` of `baseline`.
///
/// Equivalent to `|value - baseline| * 10_000 <= tolerance_bps * baseline`.
/// A zero baseline only tolerates an exactly equal value. Overflow on the
/// left side counts as out of tolerance; overflow on the right side means
/// the tolerance is large enough to admit anything representable.
pub fn within_tolerance(value: Price, baseline: Price, tolerance_bps: u64) -> bool {
    let diff = value.abs_diff(baseline);
    let Some(lhs) = diff.checked_mul(u128::from(BPS_DENOMINATOR)) else {
        return false;
    };
    match baseline.raw().checked_mul(u128::from(tolerance_bps)) {
        Some(rhs) => lhs <= rhs,
        None => true,
    }
}

/// Deviation of `value` from `baseline` in whole basis points (truncated).
///
/// Returns `None` for a zero baseline or on overflow. Used for logging only;
/// decisions go through [`within_tolerance`].
pub fn deviation_bps(value: Price, baseline: Price) -> Option<u128> {
    if baseline.is_zero() {
        return None;
    }
    value
        .abs_diff(baseline)
        .checked_mul(u128::from(BPS_DENOMINATOR))
        .map(|scaled| scaled / baseline.raw())
}

/// Numeric median of exactly three prices.
pub fn median_of_three(a: Price, b: Price, c: Price) -> Price {
    a.min(b).max(a.max(b).min(c))
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn units(n: u64) -> Price {
        Price::from_units(n)
    }

    #[test]
    fn test_within_tolerance_boundary_is_inclusive() {
        // 5% of 100 is exactly 5
        assert!(within_tolerance(units(105), units(100), 500));
        assert!(within_tolerance(units(95), units(100), 500));
        assert!(!within_tolerance(units(106), units(100), 500));
    }

    #[test]
    fn test_within_tolerance_uses_baseline_not_value() {
        // 580 vs baseline 582: 2/582 = ~34 bps
        assert!(within_tolerance(units(580), units(582), 35));
        assert!(!within_tolerance(units(580), units(582), 34));
    }

    #[test]
    fn test_zero_tolerance_requires_equality() {
        assert!(within_tolerance(units(7), units(7), 0));
        assert!(!within_tolerance(Price::from_raw(7 * 10u128.pow(18) + 1), units(7), 0));
    }

    #[test]
    fn test_zero_baseline() {
        assert!(within_tolerance(Price::ZERO, Price::ZERO, 0));
        assert!(!within_tolerance(units(1), Price::ZERO, u64::MAX));
        assert_eq!(deviation_bps(units(1), Price::ZERO), None);
    }

    #[test]
    fn test_overflow_handling() {
        let huge = Price::from_raw(u128::MAX);
        // diff * 10_000 overflows: out of tolerance
        assert!(!within_tolerance(huge, Price::from_raw(1), 500));
        // baseline * tolerance overflows while the difference is small
        assert!(within_tolerance(Price::from_raw(u128::MAX - 5), huge, 500));
    }

    #[test]
    fn test_deviation_bps() {
        assert_eq!(deviation_bps(units(700), units(500)), Some(4_000));
        assert_eq!(deviation_bps(units(500), units(580)), Some(1_379));
        assert_eq!(deviation_bps(units(580), units(580)), Some(0));
    }

    #[test]
    fn test_median_all_orders() {
        let (lo, mid, hi) = (units(400), units(540), units(700));
        let orders = [
            (lo, mid, hi),
            (lo, hi, mid),
            (mid, lo, hi),
            (mid, hi, lo),
            (hi, lo, mid),
            (hi, mid, lo),
        ];
        for (a, b, c) in orders {
            assert_eq!(median_of_three(a, b, c), mid);
        }
    }

    #[test]
    fn test_median_with_duplicates() {
        assert_eq!(median_of_three(units(5), units(5), units(9)), units(5));
        assert_eq!(median_of_three(units(9), units(5), units(9)), units(9));
    }

    #[test]
    fn test_median_matches_sorting() {
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let mut values = [
                Price::from_raw(rng.gen_range(0..1_000_000)),
                Price::from_raw(rng.gen_range(0..1_000_000)),
                Price::from_raw(rng.gen_range(0..1_000_000)),
            ];
            let median = median_of_three(values[0], values[1], values[2]);
            values.sort();
            assert_eq!(median, values[1]);
        }
    }
}
