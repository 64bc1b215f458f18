//! Event emission.
//!
//! Every engine event is stamped with a sequence number and pushed to
//! broadcast subscribers. A bounded log of the most recent envelopes backs
//! the `get_recent_events` query.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use triad_types::OracleEvent;

/// An engine event as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Emission order, starting at 1.
    pub sequence: u64,
    /// Engine time of the call that produced the event.
    pub timestamp: u64,
    pub event: OracleEvent,
}

/// Filter for event queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    /// Event names to keep, e.g. "accept_price".
    #[serde(default)]
    pub event_types: Option<Vec<String>>,
    /// Only envelopes with a sequence greater than this.
    #[serde(default)]
    pub after_sequence: Option<u64>,
}

/// Event bus for broadcasting events to subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    sequence: Arc<AtomicU64>,
    recent: Arc<Mutex<VecDeque<EventEnvelope>>>,
    recent_capacity: usize,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacities.
    pub fn new(capacity: usize, recent_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            sequence: Arc::new(AtomicU64::new(0)),
            recent: Arc::new(Mutex::new(VecDeque::with_capacity(recent_capacity))),
            recent_capacity,
        }
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: OracleEvent, timestamp: u64) -> EventEnvelope {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let envelope = EventEnvelope {
            sequence,
            timestamp,
            event,
        };

        if self.recent_capacity > 0 {
            let mut recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
            if recent.len() == self.recent_capacity {
                recent.pop_front();
            }
            recent.push_back(envelope.clone());
        }

        tracing::debug!(sequence, event = envelope.event.name(), "event emitted");
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(envelope.clone());
        envelope
    }

    /// Subscribe to events. Returns a receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Get the current sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Recent envelopes matching `filter`, oldest first, at most `limit`.
    ///
    /// When more than `limit` match, the newest are returned.
    pub fn recent(&self, filter: &EventFilter, limit: usize) -> Vec<EventEnvelope> {
        let recent = self.recent.lock().unwrap_or_else(|e| e.into_inner());
        let matching: Vec<EventEnvelope> = recent
            .iter()
            .filter(|env| filter.matches(env))
            .cloned()
            .collect();
        let skip = matching.len().saturating_sub(limit);
        matching.into_iter().skip(skip).collect()
    }
}

impl EventFilter {
    /// Check if an envelope matches this filter.
    pub fn matches(&self, envelope: &EventEnvelope) -> bool {
        if let Some(after) = self.after_sequence {
            if envelope.sequence <= after {
                return false;
            }
        }

        if let Some(ref types) = self.event_types {
            let name = envelope.event.name();
            if !types.iter().any(|t| t == name) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use triad_types::{ParamId, Price, PricePoint, ReporterId};

    use super::*;

    fn accept(units: u64) -> OracleEvent {
        OracleEvent::accepted(PricePoint::new(
            Price::from_units(units),
            1000,
            ReporterId::new([1; 20]),
        ))
    }

    fn param_changed() -> OracleEvent {
        OracleEvent::ParameterChanged {
            index: 0,
            param: ParamId::PriceTolerance,
            old_value: 500,
            new_value: 100,
        }
    }

    #[test]
    fn test_event_bus_emit_subscribe() {
        let bus = EventBus::new(16, 16);
        let mut rx = bus.subscribe();

        let sent = bus.emit(accept(580), 1000);

        let received = rx.try_recv().expect("receive event");
        assert_eq!(received, sent);
        assert_eq!(received.sequence, 1);
        assert_eq!(bus.sequence(), 1);
    }

    #[test]
    fn test_recent_log_is_bounded() {
        let bus = EventBus::new(16, 2);
        bus.emit(accept(1), 1);
        bus.emit(accept(2), 2);
        bus.emit(accept(3), 3);

        let recent = bus.recent(&EventFilter::default(), 10);
        let sequences: Vec<u64> = recent.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![2, 3]);
    }

    #[test]
    fn test_recent_limit_keeps_newest() {
        let bus = EventBus::new(16, 16);
        for i in 1..=5 {
            bus.emit(accept(i), i);
        }
        let recent = bus.recent(&EventFilter::default(), 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].sequence, 4);
        assert_eq!(recent[1].sequence, 5);
    }

    #[test]
    fn test_event_filter_types() {
        let bus = EventBus::new(16, 16);
        bus.emit(accept(580), 1);
        bus.emit(param_changed(), 2);

        let filter = EventFilter {
            event_types: Some(vec!["parameter_changed".to_string()]),
            after_sequence: None,
        };
        let recent = bus.recent(&filter, 10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].event, param_changed());
    }

    #[test]
    fn test_event_filter_after_sequence() {
        let bus = EventBus::new(16, 16);
        bus.emit(accept(1), 1);
        bus.emit(accept(2), 2);

        let filter = EventFilter {
            event_types: None,
            after_sequence: Some(1),
        };
        let recent = bus.recent(&filter, 10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].sequence, 2);
    }

    #[test]
    fn test_envelope_serialization() {
        let bus = EventBus::new(4, 4);
        let env = bus.emit(accept(540), 7);
        let json = serde_json::to_value(&env).expect("serialize");
        assert_eq!(json["sequence"], 1);
        assert_eq!(json["event"]["event_type"], "accept_price");
        assert_eq!(json["event"]["value"], "540");
    }
}
