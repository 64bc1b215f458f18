//! Governance command handlers: parameters and committee rotation.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use triad_oracle::cooldown;
use triad_types::{ParamId, ReporterId};

use super::{parse_params, to_value, Result};
use crate::rpc::RpcError;
use crate::DaemonState;

#[derive(Debug, Deserialize)]
struct SetValueParams {
    caller: ReporterId,
    index: u8,
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RotateParams {
    caller: ReporterId,
    slot: usize,
}

/// Committee seats with their cooldown state.
pub async fn get_committee(state: &Arc<DaemonState>) -> Result {
    let engine = state.engine.lock().await;
    let now = state.clock.now();
    let params = engine.parameters();

    let seats: Vec<Value> = engine
        .committee()
        .slots()
        .iter()
        .enumerate()
        .map(|(slot, seat)| {
            serde_json::json!({
                "slot": slot,
                "reporter": seat.reporter,
                "last_submission": seat.last_submission,
                "last_rotation": seat.last_rotation,
                "submission_cooldown_secs": cooldown::remaining(
                    seat.last_submission,
                    now,
                    params.reporter_min_interval_secs,
                ),
                "rotation_cooldown_secs": cooldown::remaining(
                    seat.last_rotation,
                    now,
                    params.rotation_cooldown_secs,
                ),
            })
        })
        .collect();

    Ok(serde_json::json!({ "committee": seats }))
}

/// Current parameters, by public index, plus the change cooldown.
pub async fn get_parameters(state: &Arc<DaemonState>) -> Result {
    let engine = state.engine.lock().await;
    let now = state.clock.now();
    let params = engine.parameters();

    let tunables: Vec<Value> = ParamId::ALL
        .iter()
        .map(|id| {
            serde_json::json!({
                "index": id.index(),
                "param": id,
                "value": params.get(*id),
            })
        })
        .collect();

    Ok(serde_json::json!({
        "parameters": to_value(params)?,
        "tunables": tunables,
        "cooldown_remaining_secs": engine.param_cooldown_remaining(now),
    }))
}

/// Retune one parameter by its public index.
pub async fn set_value(state: &Arc<DaemonState>, params: &Value) -> Result {
    let req: SetValueParams = parse_params(params)?;

    let mut engine = state.engine.lock().await;
    let now = state.clock.now();
    let event = engine
        .set_value(req.caller, req.index, req.value, now)
        .map_err(|e| {
            warn!(caller = %req.caller, index = req.index, error = %e, "set_value rejected");
            RpcError::from(e)
        })?;
    let envelope = state.event_bus.emit(event, now);
    drop(engine);

    to_value(&envelope)
}

/// Replace the reporter in a committee seat.
pub async fn rotate_reporter(state: &Arc<DaemonState>, params: &Value) -> Result {
    let req: RotateParams = parse_params(params)?;

    let mut engine = state.engine.lock().await;
    let now = state.clock.now();
    let event = engine
        .rotate_reporter(req.caller, req.slot, now)
        .map_err(|e| {
            warn!(caller = %req.caller, slot = req.slot, error = %e, "rotate_reporter rejected");
            RpcError::from(e)
        })?;
    let envelope = state.event_bus.emit(event, now);
    drop(engine);

    to_value(&envelope)
}
