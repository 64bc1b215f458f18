//! triad-daemon: hosts the price-oracle consensus engine.
//!
//! Single OS process running a Tokio async runtime. Reporters, operators and
//! monitors talk to the daemon via JSON-RPC over a Unix socket.

pub mod clock;
pub mod commands;
pub mod config;
pub mod events;
pub mod rpc;

use anyhow::Context;
use tokio::sync::{broadcast, Mutex};
use triad_oracle::{InMemoryRegistry, OracleEngine};

use crate::clock::Clock;
use crate::config::DaemonConfig;
use crate::events::EventBus;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// The consensus engine. Every mutating call holds this lock.
    pub engine: Mutex<OracleEngine<InMemoryRegistry>>,
    /// Configuration.
    pub config: DaemonConfig,
    /// Event bus for pushing events to subscribers.
    pub event_bus: EventBus,
    /// Engine time source.
    pub clock: Clock,
    /// Shutdown signal sender.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl DaemonState {
    /// Build the engine, registry and event bus described by `config`.
    pub fn from_config(config: DaemonConfig, clock: Clock) -> anyhow::Result<Self> {
        let members = config.committee_members()?;
        let registry = config.build_registry();
        let engine = OracleEngine::new(members, registry, config.oracle.clone())
            .context("building oracle engine")?;
        let event_bus = EventBus::new(config.rpc.event_buffer, config.rpc.recent_events);
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            engine: Mutex::new(engine),
            config,
            event_bus,
            clock,
            shutdown_tx,
        })
    }
}
