//! Events emitted by the consensus engine.
//!
//! Every successful engine call produces exactly one [`OracleEvent`]. Off-chain
//! monitors and indexers consume them through the daemon's event stream.

use serde::{Deserialize, Serialize};

use crate::{ParamId, Price, PricePoint, ReporterId};

/// All engine event kinds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum OracleEvent {
    /// A price became the canonical accepted price.
    AcceptPrice {
        value: Price,
        observed_at: u64,
        reporter: ReporterId,
    },
    /// An observation was parked in a pending slot (0 = first, 1 = second).
    BufferedObservation {
        value: Price,
        observed_at: u64,
        reporter: ReporterId,
        slot_index: u8,
    },
    /// A governance tunable changed.
    ParameterChanged {
        index: u8,
        param: ParamId,
        old_value: u64,
        new_value: u64,
    },
    /// A committee slot received a new reporter.
    ReporterRotated {
        slot: u8,
        old_reporter: ReporterId,
        new_reporter: ReporterId,
        rotated_by: ReporterId,
    },
}

impl OracleEvent {
    /// Accept event for a price point.
    pub fn accepted(point: PricePoint) -> Self {
        OracleEvent::AcceptPrice {
            value: point.value,
            observed_at: point.observed_at,
            reporter: point.reporter,
        }
    }

    /// Buffered event for a price point parked in `slot_index`.
    pub fn buffered(point: PricePoint, slot_index: u8) -> Self {
        OracleEvent::BufferedObservation {
            value: point.value,
            observed_at: point.observed_at,
            reporter: point.reporter,
            slot_index,
        }
    }

    /// Stable event name, as used in the serialized `event_type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            OracleEvent::AcceptPrice { .. } => "accept_price",
            OracleEvent::BufferedObservation { .. } => "buffered_observation",
            OracleEvent::ParameterChanged { .. } => "parameter_changed",
            OracleEvent::ReporterRotated { .. } => "reporter_rotated",
        }
    }

    /// The accepted price point, if this is an accept event.
    pub fn accepted_point(&self) -> Option<PricePoint> {
        match *self {
            OracleEvent::AcceptPrice {
                value,
                observed_at,
                reporter,
            } => Some(PricePoint::new(value, observed_at, reporter)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> PricePoint {
        PricePoint::new(Price::from_units(582), 1_700_000_000, ReporterId::new([3; 20]))
    }

    #[test]
    fn test_event_tag_matches_name() {
        let events = [
            OracleEvent::accepted(point()),
            OracleEvent::buffered(point(), 1),
            OracleEvent::ParameterChanged {
                index: 2,
                param: ParamId::FeedStalenessThreshold,
                old_value: 300,
                new_value: 120,
            },
            OracleEvent::ReporterRotated {
                slot: 0,
                old_reporter: ReporterId::new([1; 20]),
                new_reporter: ReporterId::new([9; 20]),
                rotated_by: ReporterId::new([5; 20]),
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).expect("serialize");
            assert_eq!(json["event_type"], event.name());
        }
    }

    #[test]
    fn test_buffered_event_payload() {
        let json = serde_json::to_value(OracleEvent::buffered(point(), 0)).expect("serialize");
        assert_eq!(json["value"], "582");
        assert_eq!(json["slot_index"], 0);
        assert_eq!(json["observed_at"], 1_700_000_000u64);
    }

    #[test]
    fn test_accepted_point_roundtrip() {
        let event = OracleEvent::accepted(point());
        assert_eq!(event.accepted_point(), Some(point()));
        assert_eq!(OracleEvent::buffered(point(), 0).accepted_point(), None);
    }
}
