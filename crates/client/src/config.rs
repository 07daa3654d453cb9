//! Client configuration.
//!
//! Layers, lowest precedence first:
//! 1. built-in defaults
//! 2. a TOML file (`--config FILE`, or `ceramerp.toml` in the working directory if present)
//! 3. environment variables `CERAMERP__SECTION__KEY` (e.g. `CERAMERP__BACKEND__URL`)

use std::path::Path;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use ceramerp_backend::BackendConfig;
use ceramerp_observability::LogFormat;

const ENV_PREFIX: &str = "CERAMERP";
const DEFAULT_FILE: &str = "ceramerp";

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub inventory: InventoryConfig,
    pub log: LogConfig,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
    /// Seconds after which a cached list is refetched on next read.
    pub stale_after_secs: u64,
}

impl CacheConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

/// How a stock adjustment protects itself against concurrent writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentGuard {
    /// Write only if the quantity still equals the value read just before.
    #[default]
    Snapshot,
    /// Plain read-then-write; the last writer wins.
    #[serde(rename = "none")]
    Unguarded,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InventoryConfig {
    pub adjustment_guard: AdjustmentGuard,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub filter: String,
}

/// Account the CLI signs in with.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ClientConfig {
    /// Load defaults, the config file and environment overrides.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };
        defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Defaults overlaid with an inline TOML document (no environment).
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("backend.url", "http://localhost:54321")?
        .set_default("backend.anon_key", "")?
        .set_default("backend.timeout_secs", 30)?
        .set_default("cache.stale_after_secs", 30)?
        .set_default("inventory.adjustment_guard", "snapshot")?
        .set_default("log.format", "pretty")?
        .set_default("log.filter", "info")
}
