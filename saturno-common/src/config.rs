//! Configuration loading and resolution
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE: &str = "saturno";
pub const DEFAULT_COLLECTION: &str = "game1";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "SATURNO_CONFIG";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    /// Development builds expose internal error details in responses
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(Error::Config(format!("Unknown environment: {}", other))),
        }
    }
}

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub mongo_uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    pub environment: Option<String>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

/// Values taken from the command line; `None` defers to lower priorities
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub mongo_uri: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    pub environment: Option<String>,
    pub log_level: Option<String>,
}

/// Values read from the process environment
#[derive(Debug, Clone, Default)]
struct EnvConfig {
    host: Option<String>,
    port: Option<u16>,
    mongo_uri: Option<String>,
    database: Option<String>,
    collection: Option<String>,
    cors_origins: Option<Vec<String>>,
    environment: Option<String>,
    log_level: Option<String>,
}

impl EnvConfig {
    fn from_env() -> Result<Self> {
        let port = match env_var("PORT") {
            Some(raw) => Some(parse_port(&raw)?),
            None => None,
        };

        Ok(Self {
            host: env_var("HOST"),
            port,
            mongo_uri: env_var("MONGO_URI"),
            database: env_var("MONGO_DATABASE"),
            collection: env_var("MONGO_COLLECTION"),
            cors_origins: env_var("CORS_ORIGINS").map(|raw| split_origins(&raw)),
            environment: env_var("APP_ENV"),
            log_level: env_var("LOG_LEVEL"),
        })
    }
}

/// Fully resolved server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty when no source provided one; see [`ServerConfig::mongo_uri`]
    pub mongo_uri: String,
    /// Explicit database name; falls back to the URI's default database
    pub database: Option<String>,
    pub collection: String,
    pub cors_origins: Vec<String>,
    pub environment: Environment,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            mongo_uri: String::new(),
            database: None,
            collection: DEFAULT_COLLECTION.to_string(),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            environment: Environment::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Resolve configuration from CLI overrides, environment, TOML file and defaults
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let file = match config_file_path(overrides)? {
            Some(path) => {
                info!("Loading config file: {}", path.display());
                TomlConfig::load(&path)?
            }
            None => TomlConfig::default(),
        };
        let env = EnvConfig::from_env()?;

        Self::merge(overrides, env, file)
    }

    fn merge(cli: &ConfigOverrides, env: EnvConfig, file: TomlConfig) -> Result<Self> {
        let defaults = Self::default();

        let port = cli.port.or(env.port).or(file.port).unwrap_or(defaults.port);
        if port == 0 {
            return Err(Error::Config("Invalid PORT configuration".to_string()));
        }

        let environment = match cli
            .environment
            .clone()
            .or(env.environment)
            .or(file.environment)
        {
            Some(name) => name.parse()?,
            None => defaults.environment,
        };

        let cors_origins = cli
            .cors_origins
            .clone()
            .or(env.cors_origins)
            .or(file.cors_origins)
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);
        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(Error::Config(
                "Wildcard CORS origin cannot be combined with credentials".to_string(),
            ));
        }

        Ok(Self {
            host: cli.host.clone().or(env.host).or(file.host).unwrap_or(defaults.host),
            port,
            mongo_uri: cli
                .mongo_uri
                .clone()
                .or(env.mongo_uri)
                .or(file.mongo_uri)
                .unwrap_or_default(),
            database: cli.database.clone().or(env.database).or(file.database),
            collection: cli
                .collection
                .clone()
                .or(env.collection)
                .or(file.collection)
                .unwrap_or(defaults.collection),
            cors_origins,
            environment,
            log_level: cli
                .log_level
                .clone()
                .or(env.log_level)
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
        })
    }

    /// MongoDB connection string, required when running against a real store
    pub fn mongo_uri(&self) -> Result<&str> {
        if self.mongo_uri.trim().is_empty() {
            return Err(Error::Config("MongoDB URI is not defined".to_string()));
        }
        Ok(&self.mongo_uri)
    }

    /// `host:port` string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a port number, rejecting 0 and non-numeric input
pub fn parse_port(raw: &str) -> Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(Error::Config("Invalid PORT configuration".to_string())),
    }
}

/// Split a comma separated origin list, dropping blanks
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Locate the config file
///
/// An explicitly named file (CLI or `SATURNO_CONFIG`) must exist. The
/// platform default location is optional.
fn config_file_path(overrides: &ConfigOverrides) -> Result<Option<PathBuf>> {
    let explicit = overrides
        .config_file
        .clone()
        .or_else(|| env_var(CONFIG_FILE_ENV).map(PathBuf::from));

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    match default_config_path() {
        Some(path) if path.exists() => Ok(Some(path)),
        Some(path) => {
            debug!("No config file at {}, using defaults", path.display());
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Platform config location, e.g. `~/.config/saturno/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("saturno").join("config.toml"))
}
