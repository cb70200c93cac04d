//! Service broker server.
//!
//! Serves the Open Service Broker v2 API backed by the in-memory lifecycle
//! manager.

use clap::Parser;
use osb_lifecycle::{CompletionMode, UpdateMode};
use osb_production::{init_tracing, run, BrokerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "osb-broker")]
#[command(about = "In-memory Open Service Broker")]
#[command(version)]
struct Cli {
    /// TOML config file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Report operations asynchronously to callers that accept it (true/false)
    #[arg(long)]
    async_enabled: Option<bool>,

    /// Update mode (echo, apply)
    #[arg(long)]
    update_mode: Option<UpdateMode>,

    /// Completion mode (immediate, deferred)
    #[arg(long)]
    completion_mode: Option<CompletionMode>,

    /// Age at which deferred operations complete (e.g., "5s", "1m")
    #[arg(long)]
    completion_delay: Option<humantime::Duration>,

    /// Default log filter (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<BrokerConfig> {
        let mut config = match &self.config {
            Some(path) => BrokerConfig::load(path)?,
            None => BrokerConfig::default(),
        };

        if let Some(addr) = self.listen {
            config = config.with_listen_addr(addr);
        }
        if let Some(enabled) = self.async_enabled {
            config = config.with_async(enabled);
        }
        if let Some(mode) = self.update_mode {
            config = config.with_update_mode(mode);
        }
        if let Some(mode) = self.completion_mode {
            config = config.with_completion_mode(mode);
        }
        if let Some(delay) = self.completion_delay {
            config = config.with_completion_delay(delay.into());
        }
        if let Some(level) = self.log_level {
            config = config.with_log_level(level);
        }
        config.log_json |= self.log_json;

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    init_tracing(&config.log_level, config.log_json)?;
    run(config).await
}
