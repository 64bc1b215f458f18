//! # triad-types
//!
//! Shared domain types used across the Triad workspace: reporter identities,
//! fixed-point prices, governance parameters and the events the consensus
//! engine emits.

pub mod events;
pub mod governance;
pub mod identity;
pub mod price;

pub use events::OracleEvent;
pub use governance::{OracleParameters, ParamId};
pub use identity::{Capability, ReporterId, ReporterStatus};
pub use price::{Price, PricePoint};

/// Number of reporters in the price-feed committee.
pub const COMMITTEE_SIZE: usize = 3;

/// Decimal places carried by every [`Price`].
pub const PRICE_DECIMALS: u32 = 18;

/// Fixed-point scale (`10^PRICE_DECIMALS`).
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Basis points in one whole (100%).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Errors raised while parsing or converting shared types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// The string is not a valid non-negative decimal price.
    #[error("invalid price literal: {0}")]
    InvalidPrice(String),

    /// The string is not a 20-byte hex reporter identity.
    #[error("invalid reporter id: {0}")]
    InvalidReporterId(String),

    /// No governance tunable has this index.
    #[error("unknown parameter index: {0}")]
    UnknownParameter(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_scale_matches_decimals() {
        assert_eq!(PRICE_SCALE, 10u128.pow(PRICE_DECIMALS));
    }
}
