//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! newline-delimited JSON-RPC 2.0 calls to the command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};
use triad_oracle::OracleError;

use crate::commands;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Result or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RpcError {
    /// Stable numeric code.
    pub code: i32,
    /// Error name.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    fn new(code: i32, message: &str, data: Option<serde_json::Value>) -> Self {
        Self {
            code,
            message: message.to_string(),
            data,
        }
    }

    // Standard JSON-RPC errors

    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self::new(-32700, "PARSE_ERROR", None)
    }

    /// Invalid request (-32600).
    pub fn invalid_request() -> Self {
        Self::new(-32600, "INVALID_REQUEST", None)
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            -32601,
            "METHOD_NOT_FOUND",
            Some(serde_json::json!({"method": method})),
        )
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self::new(
            -32602,
            "INVALID_PARAMS",
            Some(serde_json::json!({"detail": detail})),
        )
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self::new(
            -32603,
            "INTERNAL_ERROR",
            Some(serde_json::json!({"detail": detail})),
        )
    }
}

// Engine errors (-32100 .. -32110)

impl From<OracleError> for RpcError {
    fn from(err: OracleError) -> Self {
        let detail = err.to_string();
        let (code, message, data) = match err {
            OracleError::NotStarted => (-32100, "NOT_STARTED", None),
            OracleError::AlreadyStarted => (-32101, "ALREADY_STARTED", None),
            OracleError::InvalidTimestamp { observed_at, now } => (
                -32102,
                "INVALID_TIMESTAMP",
                Some(serde_json::json!({"observed_at": observed_at, "now": now})),
            ),
            OracleError::UnauthorizedReporter(reporter) => (
                -32103,
                "UNAUTHORIZED_REPORTER",
                Some(serde_json::json!({"reporter": reporter})),
            ),
            OracleError::UnauthorizedOperator { caller, capability } => (
                -32104,
                "UNAUTHORIZED_OPERATOR",
                Some(serde_json::json!({"caller": caller, "capability": capability})),
            ),
            OracleError::CooldownViolation { remaining_secs } => (
                -32105,
                "COOLDOWN_VIOLATION",
                Some(serde_json::json!({"remaining_secs": remaining_secs})),
            ),
            OracleError::InvalidParameter(index) => (
                -32106,
                "INVALID_PARAMETER",
                Some(serde_json::json!({"index": index})),
            ),
            OracleError::InvalidPrice => (-32107, "INVALID_PRICE", None),
            OracleError::InvalidSlot(slot) => (
                -32108,
                "INVALID_SLOT",
                Some(serde_json::json!({"slot": slot})),
            ),
            OracleError::NoEligibleReporter => (-32109, "NO_ELIGIBLE_REPORTER", None),
            OracleError::DuplicateReporter(reporter) => (
                -32110,
                "DUPLICATE_REPORTER",
                Some(serde_json::json!({"reporter": reporter})),
            ),
        };
        let data = match data {
            Some(mut value) => {
                value["detail"] = serde_json::Value::String(detail);
                value
            }
            None => serde_json::json!({"detail": detail}),
        };
        Self::new(code, message, Some(data))
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Bind the socket, replacing a stale socket file.
    pub fn bind(&self) -> anyhow::Result<UnixListener> {
        let _ = std::fs::remove_file(&self.socket_path);
        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {:?}", self.socket_path);
        Ok(listener)
    }

    /// Accept connections on `listener` until the task is dropped.
    pub async fn serve(&self, listener: UnixListener) -> anyhow::Result<()> {
        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        let listener = self.bind()?;
        self.serve(listener).await
    }
}

/// Handle a single client connection.
async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => dispatch_request(&state, request).await,
            Err(_) => RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
        };

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
pub async fn dispatch_request(state: &Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    if request.jsonrpc != "2.0" {
        return RpcResponse::error(id, RpcError::invalid_request());
    }
    let method = request.method.as_str();
    let params = &request.params;

    debug!("Dispatching RPC method: {}", method);

    let result = match method {
        // Price feed
        "start_oracle" => commands::feed::start_oracle(state, params).await,
        "commit_price" => commands::feed::commit_price(state, params).await,
        "get_accepted_price" => commands::feed::get_accepted_price(state).await,
        "get_pending_prices" => commands::feed::get_pending_prices(state).await,

        // Governance
        "get_committee" => commands::governance::get_committee(state).await,
        "get_parameters" => commands::governance::get_parameters(state).await,
        "set_value" => commands::governance::set_value(state, params).await,
        "rotate_reporter" => commands::governance::rotate_reporter(state, params).await,

        // Diagnostics
        "get_recent_events" => commands::diagnostics::get_recent_events(state, params).await,
        "get_status" => commands::diagnostics::get_status(state).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, err),
    }
}
