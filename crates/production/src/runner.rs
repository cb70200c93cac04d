//! Broker process assembly.

use crate::api::router;
use crate::completion::spawn_completion_task;
use crate::config::{BrokerConfig, ConfigError};
use anyhow::Context;
use osb_lifecycle::{CompletionMode, LifecycleManager};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Build the lifecycle manager described by `config`, catalog and seed
/// instances included.
pub fn build_manager(config: &BrokerConfig) -> Result<Arc<LifecycleManager>, ConfigError> {
    let catalog = config.load_catalog()?;
    let manager = LifecycleManager::with_catalog(config.lifecycle_config(), catalog);
    manager.seed(config.seed_instances.iter().cloned())?;
    Ok(Arc::new(manager))
}

/// Serve the broker until ctrl-c.
pub async fn run(config: BrokerConfig) -> anyhow::Result<()> {
    let manager = build_manager(&config)?;

    let completion = (config.completion_mode == CompletionMode::Deferred).then(|| {
        spawn_completion_task(
            manager.clone(),
            config.completion_delay,
            config.completion_interval,
        )
    });

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!(
        addr = %listener.local_addr()?,
        async_enabled = config.async_enabled,
        update_mode = %config.update_mode,
        completion_mode = %config.completion_mode,
        seeded = manager.store().len(),
        "Broker listening"
    );

    axum::serve(listener, router(manager))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = completion {
        task.abort();
    }
    info!("Broker stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until killed.
        std::future::pending::<()>().await;
    }
}
