//! Resolution of one incoming observation.
//!
//! [`resolve`] is a pure function of the current accepted price, the pending
//! slots, the incoming observation, the parameter snapshot and the current
//! time. It returns the complete next state plus the single event to emit;
//! the engine applies it only after every precondition has passed.
//!
//! ```text
//! pending   condition                          result
//! -------   ---------                          ------
//! empty     within price tolerance             accept incoming
//! empty     otherwise                          park incoming in slot 0
//! one       first is stale                     accept first at `now`, incoming reseeds slot 0
//! one       within disagreement tolerance      accept first verbatim, clear
//! one       otherwise                          park incoming in slot 1
//! two       first is stale                     accept first at `now`, drop second, reseed slot 0
//! two       otherwise                          accept median value with first's metadata, clear
//! ```

use serde::Serialize;
use triad_types::{OracleEvent, OracleParameters, PricePoint};

use crate::math::{median_of_three, within_tolerance};
use crate::pending::{PendingObservation, PendingSlots};

/// Which resolution path a commit took.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Accepted against the current accepted price without buffering.
    FastAccept,
    /// Parked in a pending slot.
    Buffered { slot_index: u8 },
    /// A stale pending observation was finalized at the current time.
    StaleFinalized,
    /// The incoming observation corroborated the first pending one.
    Corroborated,
    /// Three observations resolved by median.
    Median,
}

/// Next engine state produced by [`resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    /// New accepted price, if this step accepts one.
    pub accepted: Option<PricePoint>,
    /// Pending slots after this step.
    pub pending: PendingSlots,
    /// The one event this step emits.
    pub event: OracleEvent,
}

impl Resolution {
    fn accept(outcome: Outcome, point: PricePoint, pending: PendingSlots) -> Self {
        Self {
            outcome,
            accepted: Some(point),
            pending,
            event: OracleEvent::accepted(point),
        }
    }

    fn buffer(point: PricePoint, slot_index: u8, pending: PendingSlots) -> Self {
        Self {
            outcome: Outcome::Buffered { slot_index },
            accepted: None,
            pending,
            event: OracleEvent::buffered(point, slot_index),
        }
    }
}

/// Accept the median value of a three-observation round.
///
/// Timestamp and reporter always come from the oldest observation,
/// `round[0]`, so auditing stays anchored to the observation that opened
/// the round.
pub fn median_round(round: [PricePoint; 3]) -> PricePoint {
    let [first, second, third] = round;
    PricePoint::new(
        median_of_three(first.value, second.value, third.value),
        first.observed_at,
        first.reporter,
    )
}

/// Finalize a stale pending observation and reseed slot 0 with `incoming`.
fn finalize_stale(first: &PendingObservation, incoming: PricePoint, now: u64) -> Resolution {
    let finalized = PricePoint::new(first.point.value, now, first.point.reporter);
    Resolution::accept(
        Outcome::StaleFinalized,
        finalized,
        PendingSlots::One {
            first: PendingObservation::new(incoming, now),
        },
    )
}

/// Decide how `incoming` affects the accepted price and the pending slots.
pub fn resolve(
    accepted: &PricePoint,
    pending: &PendingSlots,
    incoming: PricePoint,
    params: &OracleParameters,
    now: u64,
) -> Resolution {
    match pending {
        PendingSlots::Empty => {
            if within_tolerance(incoming.value, accepted.value, params.price_tolerance_bps) {
                Resolution::accept(Outcome::FastAccept, incoming, PendingSlots::Empty)
            } else {
                Resolution::buffer(
                    incoming,
                    0,
                    PendingSlots::One {
                        first: PendingObservation::new(incoming, now),
                    },
                )
            }
        }
        PendingSlots::One { first } => {
            if first.is_stale(now, params.feed_staleness_threshold_secs) {
                finalize_stale(first, incoming, now)
            } else if within_tolerance(
                incoming.value,
                first.point.value,
                params.feed_disagreement_tolerance_bps,
            ) {
                Resolution::accept(Outcome::Corroborated, first.point, PendingSlots::Empty)
            } else {
                Resolution::buffer(
                    incoming,
                    1,
                    PendingSlots::Two {
                        first: *first,
                        second: PendingObservation::new(incoming, now),
                    },
                )
            }
        }
        PendingSlots::Two { first, second } => {
            if first.is_stale(now, params.feed_staleness_threshold_secs) {
                finalize_stale(first, incoming, now)
            } else {
                let point = median_round([first.point, second.point, incoming]);
                Resolution::accept(Outcome::Median, point, PendingSlots::Empty)
            }
        }
    }
}
