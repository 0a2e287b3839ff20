pub mod sources;

use std::path::PathBuf;

use lectern_core::ordering::{ReorderPolicy, SequencerSettings};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ordering: OrderingConfig,
    pub cors: CorsConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// PostgreSQL URL. `None` runs the server on in-memory repositories.
    pub primary_url: Option<String>,
    pub max_connections: u32,
}

/// Position sequencer tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingConfig {
    pub reorder_policy: ReorderPolicy,
    pub assign_attempts: u8,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        let defaults = SequencerSettings::default();
        Self {
            reorder_policy: defaults.reorder_policy,
            assign_attempts: defaults.assign_attempts,
        }
    }
}

impl From<OrderingConfig> for SequencerSettings {
    fn from(value: OrderingConfig) -> Self {
        SequencerSettings {
            reorder_policy: value.reorder_policy,
            assign_attempts: value.assign_attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
