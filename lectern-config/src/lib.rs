//! Shared configuration library for Lectern.
//!
//! Configuration is composed from three layers, highest precedence first:
//! environment variables (optionally seeded from a `.env` file), a TOML
//! file (`lectern.toml`, `config/lectern.toml` or `LECTERN_CONFIG`), and
//! built-in defaults. The composed [`Config`] is checked by guard rails
//! before the server starts.

pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, OrderingConfig, ServerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
