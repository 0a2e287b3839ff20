use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use super::models::{Config, CorsConfig, DatabaseConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("assign_attempts must be at least 1")]
    ZeroAssignAttempts,
    #[error("database URL scheme {scheme:?} is not supported; use postgres:// or postgresql://")]
    UnsupportedDatabaseScheme { scheme: String },
    #[error("database max_connections must be at least 1")]
    ZeroMaxConnections,
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.ordering.assign_attempts == 0 {
        return Err(ConfigGuardRailError::ZeroAssignAttempts);
    }

    validate_database(&config.database, &mut warnings)?;
    validate_cors(&config.cors)?;

    if config.cors.allow_credentials && config.cors.is_wildcard_included() {
        warnings.push(
            "CORS credentials allowed alongside wildcard origin; browsers will reject such configuration",
        );
    }

    Ok(warnings)
}

fn validate_database(
    database: &DatabaseConfig,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    if database.max_connections == 0 {
        return Err(ConfigGuardRailError::ZeroMaxConnections);
    }

    let Some(raw) = database.primary_url.as_deref() else {
        warnings.push_with_hint(
            "DATABASE_URL not configured; courses are kept in memory and lost on restart",
            "Set DATABASE_URL or [database].url to a PostgreSQL connection string",
        );
        return Ok(());
    };

    // The loader has already parsed the URL; only the scheme is checked here.
    let scheme = Url::parse(raw)
        .map(|url| url.scheme().to_string())
        .unwrap_or_default();
    match scheme.as_str() {
        "postgres" | "postgresql" => Ok(()),
        _ => Err(ConfigGuardRailError::UnsupportedDatabaseScheme { scheme }),
    }
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    for origin in &cors.allowed_origins {
        if origin == "*" {
            continue;
        }
        HeaderValue::from_str(origin).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("origin {origin:?} is not a valid header value"),
            }
        })?;
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("origin {origin:?} must start with http:// or https://"),
            });
        }
    }
    Ok(())
}
