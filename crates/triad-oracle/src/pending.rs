//! Pending-observation slots.
//!
//! At most two observations wait for resolution at any time. The enum shape
//! makes "a second observation without a first" unrepresentable.

use serde::{Deserialize, Serialize};
use triad_types::PricePoint;

/// An observation parked in a pending slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingObservation {
    /// The observation as submitted.
    pub point: PricePoint,
    /// Engine time at which it was parked. Staleness is measured from here,
    /// not from the observation's own timestamp.
    pub recorded_at: u64,
}

impl PendingObservation {
    pub fn new(point: PricePoint, recorded_at: u64) -> Self {
        Self { point, recorded_at }
    }

    /// Whether this observation has waited at least `threshold` seconds.
    pub fn is_stale(&self, now: u64, threshold: u64) -> bool {
        now.saturating_sub(self.recorded_at) >= threshold
    }
}

/// Occupancy of the two pending slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PendingSlots {
    /// No observation is waiting.
    #[default]
    Empty,
    /// Only the first slot is occupied.
    One { first: PendingObservation },
    /// Both slots are occupied.
    Two {
        first: PendingObservation,
        second: PendingObservation,
    },
}

impl PendingSlots {
    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        match self {
            PendingSlots::Empty => 0,
            PendingSlots::One { .. } => 1,
            PendingSlots::Two { .. } => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PendingSlots::Empty)
    }

    /// The oldest pending observation.
    pub fn first(&self) -> Option<&PendingObservation> {
        match self {
            PendingSlots::Empty => None,
            PendingSlots::One { first } | PendingSlots::Two { first, .. } => Some(first),
        }
    }

    /// The second pending observation.
    pub fn second(&self) -> Option<&PendingObservation> {
        match self {
            PendingSlots::Two { second, .. } => Some(second),
            _ => None,
        }
    }
}
