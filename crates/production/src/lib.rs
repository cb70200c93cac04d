//! Production runner for the service broker.
//!
//! Wires the [`LifecycleManager`](osb_lifecycle::LifecycleManager) to the
//! outside world:
//!
//! - [`api`]: axum router speaking the Open Service Broker v2 HTTP API
//! - [`config`]: TOML configuration with defaults for every field
//! - [`completion`]: background task that finishes deferred operations
//! - [`telemetry`]: tracing subscriber setup
//! - [`runner`]: assembles the above and serves until shutdown

pub mod api;
pub mod completion;
pub mod config;
pub mod runner;
pub mod telemetry;

pub use api::{router, API_VERSION_HEADER};
pub use config::{BrokerConfig, ConfigError};
pub use runner::{build_manager, run};
pub use telemetry::init_tracing;
