//! Diagnostics command handlers.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::{parse_params, to_value, Result};
use crate::events::EventFilter;
use crate::DaemonState;

const DEFAULT_EVENT_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
struct RecentEventsParams {
    #[serde(flatten)]
    filter: EventFilter,
    #[serde(default)]
    limit: Option<usize>,
}

/// Recently emitted events, oldest first.
pub async fn get_recent_events(state: &Arc<DaemonState>, params: &Value) -> Result {
    let req: RecentEventsParams = parse_params(params)?;
    let limit = req.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
    let events = state.event_bus.recent(&req.filter, limit);
    Ok(serde_json::json!({
        "latest_sequence": state.event_bus.sequence(),
        "events": to_value(&events)?,
    }))
}

/// Daemon and engine overview.
pub async fn get_status(state: &Arc<DaemonState>) -> Result {
    let engine = state.engine.lock().await;
    let now = state.clock.now();
    let accepted = engine.current_accepted_price().ok();

    Ok(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "now": now,
        "started": engine.is_started(),
        "accepted": to_value(&accepted)?,
        "pending_count": engine.pending().len(),
        "committee_size": engine.committee().size(),
        "event_sequence": state.event_bus.sequence(),
        "candidate_pool": engine.registry().pool_len(),
    }))
}
