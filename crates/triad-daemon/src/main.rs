//! triad-daemon: the price-oracle daemon binary.

use std::sync::Arc;

use tracing::{error, info};
use triad_daemon::clock::Clock;
use triad_daemon::config::DaemonConfig;
use triad_daemon::rpc::RpcServer;
use triad_daemon::DaemonState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = DaemonConfig::load()?;

    // 2. Initialize tracing
    let level = config.logging.log_level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("triad_daemon={level}").parse()?)
                .add_directive(format!("triad_oracle={level}").parse()?),
        )
        .init();

    info!("Triad daemon starting");

    // Ensure data directory exists
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let socket_path = config.socket_path();

    // 3. Build daemon state
    let state = Arc::new(DaemonState::from_config(config, Clock::System)?);
    let committee = state.engine.lock().await.committee().members();
    info!(?committee, "committee loaded");

    // 4. Start IPC server
    let rpc_server = RpcServer::new(state.clone(), socket_path.clone());
    info!("Starting JSON-RPC server on {:?}", socket_path);

    // 5. Run the RPC server until shutdown
    let mut shutdown_rx = state.shutdown_tx.subscribe();
    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown signal received");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}
