//! Price feed command handlers.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use triad_types::{Price, ReporterId};

use super::{parse_params, to_value, Result};
use crate::rpc::RpcError;
use crate::DaemonState;

/// Parameters of `start_oracle` and `commit_price`.
#[derive(Debug, Deserialize)]
struct Observation {
    /// Submitting reporter. `caller` is accepted as an alias.
    #[serde(alias = "caller")]
    reporter: ReporterId,
    /// Decimal price string, e.g. "224.52".
    value: Price,
    /// Observation time; defaults to the current engine time.
    #[serde(default)]
    observed_at: Option<u64>,
}

/// Bootstrap the oracle with its first accepted price.
pub async fn start_oracle(state: &Arc<DaemonState>, params: &Value) -> Result {
    let obs: Observation = parse_params(params)?;

    let mut engine = state.engine.lock().await;
    let now = state.clock.now();
    let observed_at = obs.observed_at.unwrap_or(now);
    let event = engine
        .start_oracle(obs.reporter, obs.value, observed_at, now)
        .map_err(|e| {
            warn!(reporter = %obs.reporter, error = %e, "start_oracle rejected");
            RpcError::from(e)
        })?;
    let envelope = state.event_bus.emit(event, now);
    drop(engine);

    to_value(&envelope)
}

/// Submit a price observation.
pub async fn commit_price(state: &Arc<DaemonState>, params: &Value) -> Result {
    let obs: Observation = parse_params(params)?;

    let mut engine = state.engine.lock().await;
    let now = state.clock.now();
    let observed_at = obs.observed_at.unwrap_or(now);
    let receipt = engine
        .commit_price(obs.reporter, obs.value, observed_at, now)
        .map_err(|e| {
            warn!(reporter = %obs.reporter, error = %e, "commit_price rejected");
            RpcError::from(e)
        })?;
    let envelope = state.event_bus.emit(receipt.event, now);
    let accepted = engine.current_accepted_price().ok();
    drop(engine);

    Ok(serde_json::json!({
        "outcome": to_value(&receipt.outcome)?,
        "event": to_value(&envelope)?,
        "accepted": to_value(&accepted)?,
    }))
}

/// The canonical accepted price.
pub async fn get_accepted_price(state: &Arc<DaemonState>) -> Result {
    let engine = state.engine.lock().await;
    let point = engine.current_accepted_price()?;
    to_value(&point)
}

/// Observations waiting in the pending slots.
pub async fn get_pending_prices(state: &Arc<DaemonState>) -> Result {
    let engine = state.engine.lock().await;
    let now = state.clock.now();
    let staleness = engine.parameters().feed_staleness_threshold_secs;

    let pending = engine.pending();
    let slots: Vec<Value> = [pending.first(), pending.second()]
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(slot_index, obs)| {
            serde_json::json!({
                "slot_index": slot_index,
                "value": obs.point.value,
                "observed_at": obs.point.observed_at,
                "reporter": obs.point.reporter,
                "recorded_at": obs.recorded_at,
                "stale": obs.is_stale(now, staleness),
            })
        })
        .collect();

    Ok(serde_json::json!({
        "count": pending.len(),
        "pending": slots,
    }))
}
