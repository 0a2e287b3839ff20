pub mod error;

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use lectern_core::ordering::ReorderPolicy;
use tracing::debug;
use url::Url;

use crate::models::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, OrderingConfig, ServerConfig,
    sources::{EnvConfig, FileConfig},
};
use crate::validation::{self, ConfigWarnings};
use error::ConfigLoadError;

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] = ["lectern.toml", "config/lectern.toml"];
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

/// A composed configuration and the non-fatal findings made while loading it.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Skip `.env` discovery entirely.
    pub skip_env_file: bool,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, then compose environment, file and defaults.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;
        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    /// Compose from an already gathered environment snapshot.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let mut warnings = ConfigWarnings::default();
        if config_path.is_none() {
            warnings.push_with_hint(
                "No lectern.toml detected; using environment variables and defaults",
                "Create lectern.toml or set LECTERN_CONFIG to point at one",
            );
        }

        let config = compose(
            file_config.unwrap_or_default(),
            env,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )?;
        warnings.extend(validation::apply_guard_rails(&config)?);

        Ok(ConfigLoad { config, warnings })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        if self.options.skip_env_file {
            return Ok(false);
        }
        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };
        match loaded {
            Ok(loaded) => Ok(loaded),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge the layers: environment over file over defaults.
pub fn compose(
    file: FileConfig,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<Config, ConfigLoadError> {
    let FileConfig {
        server: file_server,
        database: file_database,
        ordering: file_ordering,
        cors: file_cors,
    } = file;

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: parse_env("SERVER_PORT", env.server_port.as_deref())?
            .or(file_server.port)
            .unwrap_or(DEFAULT_PORT),
    };

    let primary_url = env
        .database_url
        .or(file_database.url)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());
    if let Some(raw) = primary_url.as_deref() {
        Url::parse(raw).map_err(|source| ConfigLoadError::InvalidDatabaseUrl { source })?;
    }
    let database = DatabaseConfig {
        primary_url,
        max_connections: parse_env(
            "DATABASE_MAX_CONNECTIONS",
            env.database_max_connections.as_deref(),
        )?
        .or(file_database.max_connections)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS),
    };

    let defaults = OrderingConfig::default();
    let ordering = OrderingConfig {
        reorder_policy: match env.reorder_policy.or(file_ordering.reorder_policy) {
            Some(raw) => ReorderPolicy::from_str(&raw).map_err(|err| {
                ConfigLoadError::InvalidValue {
                    field: "reorder_policy",
                    value: raw.clone(),
                    reason: err.to_string(),
                }
            })?,
            None => defaults.reorder_policy,
        },
        assign_attempts: parse_env("LECTERN_ASSIGN_ATTEMPTS", env.assign_attempts.as_deref())?
            .or(file_ordering.assign_attempts)
            .unwrap_or(defaults.assign_attempts),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_else(default_cors_origins),
        allow_credentials: env
            .cors_allow_credentials
            .or(file_cors.allow_credentials)
            .unwrap_or(false),
    };

    Ok(Config {
        server,
        database,
        ordering,
        cors,
        metadata,
    })
}

fn parse_env<T>(field: &'static str, raw: Option<&str>) -> Result<Option<T>, ConfigLoadError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|err| ConfigLoadError::InvalidValue {
                field,
                value: value.to_string(),
                reason: err.to_string(),
            })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn loader_for(file: &tempfile::NamedTempFile) -> ConfigLoader {
        ConfigLoader::with_options(ConfigLoaderOptions {
            config_path: Some(file.path().to_path_buf()),
            env_file: None,
            skip_env_file: true,
        })
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let config = compose(
            FileConfig::default(),
            EnvConfig::default(),
            ConfigMetadata::default(),
        )
        .unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.ordering.reorder_policy, ReorderPolicy::BestEffort);
        assert_eq!(config.ordering.assign_attempts, 2);
        assert!(config.database.primary_url.is_none());
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config(
            r#"
            [server]
            port = 8080

            [ordering]
            reorder_policy = "fail-fast"
            assign_attempts = 4
            "#,
        );
        let env = EnvConfig {
            server_port: Some("9090".into()),
            reorder_policy: Some("best_effort".into()),
            ..Default::default()
        };

        let load = loader_for(&file).load_with_env(env, false).unwrap();
        assert_eq!(load.config.server.port, 9090);
        assert_eq!(load.config.ordering.reorder_policy, ReorderPolicy::BestEffort);
        assert_eq!(load.config.ordering.assign_attempts, 4);
        assert_eq!(load.config.metadata.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn zero_assign_attempts_is_rejected() {
        let file = write_config("[ordering]\nassign_attempts = 0\n");
        let err = loader_for(&file)
            .load_with_env(EnvConfig::default(), false)
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::GuardRail(_)));
    }

    #[test]
    fn non_postgres_database_is_rejected() {
        let file = write_config("[database]\nurl = \"mysql://localhost/lectern\"\n");
        let err = loader_for(&file)
            .load_with_env(EnvConfig::default(), false)
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::GuardRail(_)));
    }

    #[test]
    fn garbage_port_is_reported() {
        let env = EnvConfig {
            server_port: Some("eighty".into()),
            ..Default::default()
        };
        let err = compose(FileConfig::default(), env, ConfigMetadata::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::InvalidValue { field: "SERVER_PORT", .. }
        ));
    }

    #[test]
    fn unknown_policy_is_reported() {
        let env = EnvConfig {
            reorder_policy: Some("sometimes".into()),
            ..Default::default()
        };
        assert!(compose(FileConfig::default(), env, ConfigMetadata::default()).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::with_options(ConfigLoaderOptions {
            config_path: Some(dir.path().join("absent.toml")),
            env_file: None,
            skip_env_file: true,
        });
        assert!(matches!(
            loader.load_with_env(EnvConfig::default(), false),
            Err(ConfigLoadError::MissingConfig { .. })
        ));
    }

    #[test]
    fn in_memory_mode_warns() {
        let file = write_config("[server]\nhost = \"127.0.0.1\"\n");
        let load = loader_for(&file)
            .load_with_env(EnvConfig::default(), false)
            .unwrap();
        assert!(
            load.warnings
                .items
                .iter()
                .any(|w| w.message.contains("DATABASE_URL"))
        );
    }
}
