use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{non_empty_var, parse_bool_var, parse_csv_var};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub ordering: FileOrderingConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileOrderingConfig {
    /// `best-effort` or `fail-fast`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reorder_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_attempts: Option<u8>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

/// Environment-derived configuration values.
///
/// Unparsable numbers are kept as raw strings so the loader can report them
/// instead of silently falling back to defaults.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<String>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<String>,
    pub reorder_policy: Option<String>,
    pub assign_attempts: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var("LECTERN_CONFIG").map(PathBuf::from),
            server_host: non_empty_var("SERVER_HOST"),
            server_port: non_empty_var("SERVER_PORT"),
            database_url: non_empty_var("DATABASE_URL"),
            database_max_connections: non_empty_var("DATABASE_MAX_CONNECTIONS"),
            reorder_policy: non_empty_var("LECTERN_REORDER_POLICY"),
            assign_attempts: non_empty_var("LECTERN_ASSIGN_ATTEMPTS"),
            cors_allowed_origins: parse_csv_var("CORS_ALLOWED_ORIGINS"),
            cors_allow_credentials: parse_bool_var("CORS_ALLOW_CREDENTIALS"),
        }
    }
}
