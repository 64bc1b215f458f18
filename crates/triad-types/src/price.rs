//! Fixed-point prices and timestamped price observations.
//!
//! Prices carry [`PRICE_DECIMALS`] decimal places in a `u128`. No floating
//! point is involved anywhere: literals such as `"582.25"` are parsed
//! digit by digit and rendered back the same way. On the wire a price is
//! always a decimal string, since JSON numbers cannot carry a full `u128`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{ReporterId, TypesError, PRICE_DECIMALS, PRICE_SCALE};

/// A non-negative fixed-point price scaled by [`PRICE_SCALE`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Price(u128);

impl Price {
    /// The zero price.
    pub const ZERO: Price = Price(0);

    /// Wrap an already-scaled raw value.
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Build a price from a whole number of units.
    pub const fn from_units(units: u64) -> Self {
        Self(units as u128 * PRICE_SCALE)
    }

    /// The raw scaled value.
    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Absolute difference between two prices, in raw units.
    pub fn abs_diff(&self, other: Price) -> u128 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / PRICE_SCALE;
        let frac = self.0 % PRICE_SCALE;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:0width$}", width = PRICE_DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Price {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidPrice(s.to_string());

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > PRICE_DECIMALS as usize || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: u128 = whole.parse().map_err(|_| invalid())?;
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            let padding = PRICE_DECIMALS - frac.len() as u32;
            frac.parse::<u128>().map_err(|_| invalid())? * 10u128.pow(padding)
        };

        whole
            .checked_mul(PRICE_SCALE)
            .and_then(|v| v.checked_add(frac_raw))
            .map(Price)
            .ok_or_else(invalid)
    }
}

/// One price observation attributed to a reporter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observed price.
    pub value: Price,
    /// Unix second at which the reporter observed the price.
    pub observed_at: u64,
    /// Reporter the observation is attributed to.
    pub reporter: ReporterId,
}

impl PricePoint {
    pub fn new(value: Price, observed_at: u64, reporter: ReporterId) -> Self {
        Self {
            value,
            observed_at,
            reporter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fraction() {
        let p: Price = "582.25".parse().expect("parse");
        assert_eq!(p.raw(), 582 * PRICE_SCALE + PRICE_SCALE / 4);
        assert_eq!("582".parse::<Price>().expect("parse"), Price::from_units(582));
        assert_eq!("582.00".parse::<Price>().expect("parse"), Price::from_units(582));
    }

    #[test]
    fn test_parse_smallest_unit() {
        let p: Price = "0.000000000000000001".parse().expect("parse");
        assert_eq!(p.raw(), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", ".5", "-1", "1.2.3", "abc", "1e5", "1.0000000000000000001"] {
            assert!(bad.parse::<Price>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let huge = format!("{}", u128::MAX);
        assert!(huge.parse::<Price>().is_err());
    }

    #[test]
    fn test_display_trims_trailing_zeros() {
        assert_eq!(Price::from_units(540).to_string(), "540");
        assert_eq!("224.520".parse::<Price>().expect("parse").to_string(), "224.52");
        assert_eq!(Price::from_raw(1).to_string(), "0.000000000000000001");
    }

    #[test]
    fn test_price_serializes_as_string() {
        let point = PricePoint::new(
            "580.5".parse().expect("parse"),
            1_000,
            ReporterId::new([1; 20]),
        );
        let json = serde_json::to_value(point).expect("serialize");
        assert_eq!(json["value"], "580.5");
        assert_eq!(json["observed_at"], 1_000);
        let back: PricePoint = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, point);
    }

    #[test]
    fn test_abs_diff_is_symmetric() {
        let a = Price::from_units(500);
        let b = Price::from_units(580);
        assert_eq!(a.abs_diff(b), b.abs_diff(a));
        assert_eq!(a.abs_diff(b), 80 * PRICE_SCALE);
    }
}
