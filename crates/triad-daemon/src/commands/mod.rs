//! IPC command handlers.
//!
//! Each submodule implements the commands for one IPC category.

pub mod diagnostics;
pub mod feed;
pub mod governance;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::rpc::RpcError;

/// Handler result: a JSON value or an RPC error.
pub type Result = std::result::Result<Value, RpcError>;

/// Decode the `params` object of a request.
pub(crate) fn parse_params<T: DeserializeOwned>(
    params: &Value,
) -> std::result::Result<T, RpcError> {
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params.clone()
    };
    serde_json::from_value(params).map_err(|e| RpcError::invalid_params(&e.to_string()))
}

/// Serialize a handler result.
pub(crate) fn to_value<T: serde::Serialize>(value: &T) -> Result {
    serde_json::to_value(value).map_err(|e| RpcError::internal_error(&e.to_string()))
}
