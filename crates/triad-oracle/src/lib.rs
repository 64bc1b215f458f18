//! # triad-oracle
//!
//! Price-oracle consensus engine for a three-reporter committee.
//!
//! Reporters submit fixed-point price observations. The engine either accepts
//! an observation immediately, parks it in one of two pending slots, or
//! resolves the pending round: by corroboration, by a three-way median, or by
//! finalizing a stale observation. Governance retunes tolerances through a
//! cooldown-gated parameter store and rotates committee slots through an
//! external registry.
//!
//! ## Modules
//!
//! - [`engine`]: the state machine and its public operations
//! - [`resolver`]: pure resolution of one incoming observation
//! - [`pending`]: the two pending-observation slots
//! - [`committee`]: committee slots with their cooldown timestamps
//! - [`params`]: cooldown-gated parameter store
//! - [`cooldown`]: shared cooldown arithmetic
//! - [`math`]: basis-point tolerance and median helpers
//! - [`registry`]: role/eligibility registry seam and an in-memory registry

pub mod committee;
pub mod cooldown;
pub mod engine;
pub mod math;
pub mod params;
pub mod pending;
pub mod registry;
pub mod resolver;

pub use engine::{CommitReceipt, OracleEngine};
pub use registry::{InMemoryRegistry, Registry};
pub use resolver::Outcome;

use triad_types::{Capability, ReporterId};

/// Error types for oracle operations.
///
/// Every variant is a precondition failure: the engine state is unchanged
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The oracle has not been bootstrapped yet.
    #[error("oracle not started")]
    NotStarted,

    /// The oracle was already bootstrapped.
    #[error("oracle already started")]
    AlreadyStarted,

    /// An observation timestamp lies in the future.
    #[error("invalid timestamp: observed at {observed_at}, now {now}")]
    InvalidTimestamp {
        /// Claimed observation time.
        observed_at: u64,
        /// Current engine time.
        now: u64,
    },

    /// The caller is not a current committee member.
    #[error("unauthorized reporter: {0}")]
    UnauthorizedReporter(ReporterId),

    /// The caller lacks the capability required by a governance call.
    #[error("unauthorized operator {caller}: missing {capability:?} capability")]
    UnauthorizedOperator {
        /// The rejected caller.
        caller: ReporterId,
        /// The capability that was checked.
        capability: Capability,
    },

    /// A cooldown has not elapsed yet.
    #[error("cooldown violation: {remaining_secs}s remaining")]
    CooldownViolation {
        /// Seconds until the call would be accepted.
        remaining_secs: u64,
    },

    /// Unknown governance parameter index.
    #[error("invalid parameter index: {0}")]
    InvalidParameter(u8),

    /// A price of zero cannot serve as a deviation baseline.
    #[error("invalid price: must be positive")]
    InvalidPrice,

    /// Committee slot index out of range.
    #[error("invalid committee slot: {0}")]
    InvalidSlot(usize),

    /// The registry has no eligible replacement reporter.
    #[error("no eligible reporter available for rotation")]
    NoEligibleReporter,

    /// The same identity appears twice in a committee.
    #[error("duplicate committee member: {0}")]
    DuplicateReporter(ReporterId),
}

/// Convenience result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
