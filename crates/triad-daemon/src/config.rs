//! Configuration file management.
//!
//! The daemon reads a single toml file. Every section is optional and falls
//! back to defaults, except the committee, which must name exactly
//! [`COMMITTEE_SIZE`] distinct reporters.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use triad_oracle::InMemoryRegistry;
use triad_types::{Capability, OracleParameters, ReporterId, COMMITTEE_SIZE};

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Initial oracle parameters.
    #[serde(default)]
    pub oracle: OracleParameters,
    /// Initial reporter committee.
    #[serde(default)]
    pub committee: CommitteeConfig,
    /// Role registry seed data.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// IPC settings.
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Committee configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitteeConfig {
    /// Reporter identities in seat order.
    #[serde(default)]
    pub reporters: Vec<ReporterId>,
}

/// Registry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Identities allowed to retune parameters.
    #[serde(default)]
    pub operators: Vec<ReporterId>,
    /// Identities allowed to rotate committee seats.
    #[serde(default)]
    pub rotators: Vec<ReporterId>,
    /// Eligibility pool, handed out in order.
    #[serde(default)]
    pub candidates: Vec<ReporterId>,
}

/// RPC configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Unix socket path. Empty = `$data_dir/triad.sock`.
    #[serde(default)]
    pub socket_path: String,
    /// Broadcast buffer per event subscriber.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Number of recent events kept for `get_recent_events`.
    #[serde(default = "default_recent_events")]
    pub recent_events: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions

fn default_event_buffer() -> usize {
    1000
}

fn default_recent_events() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            socket_path: String::new(),
            event_buffer: default_event_buffer(),
            recent_events: default_recent_events(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DaemonConfig =
            toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// The committee as a fixed-size array.
    pub fn committee_members(&self) -> anyhow::Result<[ReporterId; COMMITTEE_SIZE]> {
        let reporters = &self.committee.reporters;
        <[ReporterId; COMMITTEE_SIZE]>::try_from(reporters.as_slice()).map_err(|_| {
            anyhow::anyhow!(
                "committee.reporters must list exactly {COMMITTEE_SIZE} identities, found {}",
                reporters.len()
            )
        })
    }

    /// Build the in-memory registry from the `[registry]` section.
    pub fn build_registry(&self) -> InMemoryRegistry {
        let mut registry = InMemoryRegistry::new();
        for operator in &self.registry.operators {
            registry.grant(*operator, Capability::Operator);
        }
        for rotator in &self.registry.rotators {
            registry.grant(*rotator, Capability::Rotation);
        }
        for candidate in &self.registry.candidates {
            registry.add_candidate(*candidate);
        }
        registry
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::default_data_dir()
    }

    /// Get the IPC socket path.
    pub fn socket_path(&self) -> PathBuf {
        if self.rpc.socket_path.is_empty() {
            self.data_dir().join("triad.sock")
        } else {
            PathBuf::from(&self.rpc.socket_path)
        }
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        // Explicit file override first
        if let Ok(path) = std::env::var("TRIAD_CONFIG") {
            return PathBuf::from(path);
        }
        Self::default_data_dir().join("config.toml")
    }

    /// Platform-specific default data directory.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("TRIAD_DATA_DIR") {
            return PathBuf::from(dir);
        }
        #[cfg(target_os = "macos")]
        {
            dirs_fallback("Library/Application Support/Triad")
        }
        #[cfg(not(target_os = "macos"))]
        {
            dirs_fallback(".triad")
        }
    }
}

/// Fallback home directory resolution.
fn dirs_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/triad"))
}
