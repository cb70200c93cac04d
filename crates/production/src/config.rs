//! Broker configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working broker on `127.0.0.1:8080`:
//!
//! ```toml
//! listen_addr = "0.0.0.0:8080"
//! async_enabled = true
//! update_mode = "echo"            # or "apply"
//! completion_mode = "deferred"    # or "immediate"
//! completion_delay = "5s"
//! completion_interval = "1s"
//! log_level = "info"
//! log_json = false
//! catalog_path = "catalog.json"
//!
//! [[seed_instances]]
//! id = "9ca5dd24-5010-4c7f-89e9-71f67d35fd6d"
//! service_id = "serviceId"
//! plan_id = "planId"
//! ```

use osb_core::BrokerError;
use osb_lifecycle::{CompletionMode, LifecycleConfig, UpdateMode};
use osb_types::{Catalog, InstanceRecord};
use serde::{Deserialize, Deserializer};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid catalog {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid seed instance: {0}")]
    Seed(#[from] BrokerError),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level broker configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    /// Address the HTTP adapter listens on.
    pub listen_addr: SocketAddr,

    /// Report operations asynchronously to callers that accept it.
    pub async_enabled: bool,

    pub update_mode: UpdateMode,

    pub completion_mode: CompletionMode,

    /// Minimum age of an in-progress operation before the background task
    /// completes it. Only used in deferred completion mode.
    #[serde(deserialize_with = "human_duration")]
    pub completion_delay: Duration,

    /// How often the background task scans for operations to complete.
    #[serde(deserialize_with = "human_duration")]
    pub completion_interval: Duration,

    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub log_json: bool,

    /// JSON catalog to serve instead of the built-in example catalog.
    pub catalog_path: Option<PathBuf>,

    /// Instances inserted at startup.
    pub seed_instances: Vec<InstanceRecord>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            async_enabled: true,
            update_mode: UpdateMode::default(),
            completion_mode: CompletionMode::default(),
            completion_delay: Duration::from_secs(5),
            completion_interval: Duration::from_secs(1),
            log_level: "info".to_string(),
            log_json: false,
            catalog_path: None,
            seed_instances: Vec::new(),
        }
    }
}

fn human_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

impl BrokerConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.completion_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "completion_interval must be greater than zero".to_string(),
            ));
        }
        if let Some(seed) = self.seed_instances.iter().find(|s| s.id.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "seed instance on plan {} has an empty id",
                seed.plan_id
            )));
        }
        Ok(())
    }

    /// Set the listen address.
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Set whether operations may be reported asynchronously.
    pub fn with_async(mut self, enabled: bool) -> Self {
        self.async_enabled = enabled;
        self
    }

    /// Set the update mode.
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// Set the completion mode.
    pub fn with_completion_mode(mut self, mode: CompletionMode) -> Self {
        self.completion_mode = mode;
        self
    }

    /// Set the deferred completion delay.
    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    /// Set the default log filter.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Add an instance to insert at startup.
    pub fn with_seed_instance(mut self, record: InstanceRecord) -> Self {
        self.seed_instances.push(record);
        self
    }

    /// The lifecycle manager settings.
    pub fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig::default()
            .with_async(self.async_enabled)
            .with_update_mode(self.update_mode)
            .with_completion_mode(self.completion_mode)
    }

    /// Load the configured catalog, or the example catalog if none is set.
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        let Some(path) = &self.catalog_path else {
            return Ok(Catalog::example());
        };
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Catalog {
            path: path.clone(),
            source,
        })
    }
}
