use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tracing::debug;

use crate::{
    constants::{
        DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_CONFIG_LOCATIONS, DEFAULT_HOST,
        DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE,
        DEFAULT_PORT, DEFAULT_TOKEN_TTL, DEV_DATABASE_URL, DEV_PASSWORD_PEPPER,
        DEV_TOKEN_SECRET,
    },
    models::{
        AuthConfig, CatalogConfig, Config, ConfigMetadata, CorsConfig,
        DatabaseConfig, ServerConfig,
        sources::{EnvConfig, FileConfig},
    },
    util::parse_duration,
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

/// Result of a successful load: the configuration and anything worth telling
/// the operator about it.
#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default, Clone)]
struct ConfigLoaderOptions {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, read the process environment and resolve the
    /// configuration.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path)
                .map(|_| true)
                .or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        let mut load = self.load_with_env(EnvConfig::gather())?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Resolve against an explicit environment snapshot instead of the
    /// process environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) = compose_config(file_config, env, config_path)?;
        Ok(ConfigLoad { config, warnings })
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
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if file_config.is_none() {
        warnings.push_with_hint(
            "No cartes.toml detected; falling back to environment variables",
            "Pass --config or set CARTES_CONFIG_PATH to use a configuration \
             file",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        auth: file_auth,
        catalog: file_catalog,
        cors: file_cors,
        dev_mode: file_dev_mode,
    } = file_config.unwrap_or_default();

    let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
    };

    let url = match non_blank(env.database_url.or(file_database.url)) {
        Some(url) => url,
        None if dev_mode => {
            warnings.push(
                "DATABASE_URL not set; using the local development database",
            );
            DEV_DATABASE_URL.to_string()
        }
        None => return Err(ConfigLoadError::MissingDatabaseUrl),
    };
    let database = DatabaseConfig {
        url,
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        acquire_timeout: duration_setting(
            "DATABASE_ACQUIRE_TIMEOUT",
            env.database_acquire_timeout
                .or(file_database.acquire_timeout),
            DEFAULT_ACQUIRE_TIMEOUT,
        )?,
        run_migrations: env
            .run_migrations
            .or(file_database.run_migrations)
            .unwrap_or(dev_mode),
    };

    let auth = AuthConfig {
        password_pepper: secret_setting(
            "AUTH_PASSWORD_PEPPER",
            env.auth_password_pepper.or(file_auth.password_pepper),
            DEV_PASSWORD_PEPPER,
            dev_mode,
        )?,
        token_secret: secret_setting(
            "AUTH_TOKEN_SECRET",
            env.auth_token_secret.or(file_auth.token_secret),
            DEV_TOKEN_SECRET,
            dev_mode,
        )?,
        token_ttl: duration_setting(
            "AUTH_TOKEN_TTL",
            env.auth_token_ttl.or(file_auth.token_ttl),
            DEFAULT_TOKEN_TTL,
        )?,
    };

    let catalog = CatalogConfig {
        default_page_size: env
            .catalog_default_page_size
            .or(file_catalog.default_page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE),
        max_page_size: env
            .catalog_max_page_size
            .or(file_catalog.max_page_size)
            .unwrap_or(DEFAULT_MAX_PAGE_SIZE),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_else(|| {
                if dev_mode {
                    vec!["*".to_string()]
                } else {
                    Vec::new()
                }
            }),
    };

    let config = Config {
        server,
        database,
        auth,
        catalog,
        cors,
        dev_mode,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded: false,
        },
    };

    warnings.extend(validation::apply_guard_rails(&config)?);

    Ok((config, warnings))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn secret_setting(
    field: &'static str,
    value: Option<String>,
    dev_fallback: &str,
    dev_mode: bool,
) -> Result<String, ConfigLoadError> {
    match non_blank(value) {
        Some(secret) => Ok(secret),
        None if dev_mode => Ok(dev_fallback.to_string()),
        None => Err(ConfigLoadError::MissingSecret { field }),
    }
}

fn duration_setting(
    field: &'static str,
    value: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match non_blank(value) {
        Some(raw) => parse_duration(&raw).map_err(|source| {
            ConfigLoadError::InvalidDuration {
                field,
                value: raw,
                source,
            }
        }),
        None => Ok(default),
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("DATABASE_URL is required when DEV_MODE is false")]
    MissingDatabaseUrl,
    #[error("{field} is required when DEV_MODE is false")]
    MissingSecret { field: &'static str },
    #[error("invalid duration `{value}` for {field}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
