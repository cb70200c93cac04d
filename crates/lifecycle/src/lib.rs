//! Service instance lifecycle manager.
//!
//! This crate implements [`ServiceBroker`](osb_core::ServiceBroker) on top of
//! the [`InstanceStore`](osb_store::InstanceStore). Each lifecycle verb is a
//! short contract over the store:
//!
//! - `provision` → compare-and-insert; equivalent retries succeed, conflicts fail
//! - `deprovision` → unconditional, idempotent removal (bindings included)
//! - `bind` → requires the instance; credentials are the instance parameters
//! - `unbind` → always succeeds
//! - `update` → echo or apply, per [`UpdateMode`]
//! - `last_operation` / `binding_last_operation` → report recorded operation state
//!
//! Whether a completed operation is reported asynchronously is decided by
//! the process-wide [`AsyncPolicy`]. Whether an asynchronously reported
//! operation starts out `in progress` is decided by [`CompletionMode`].

mod config;
mod credentials;
mod manager;
mod policy;

pub use config::{CompletionMode, LifecycleConfig, ParseModeError, UpdateMode};
pub use credentials::example_credentials;
pub use manager::LifecycleManager;
pub use policy::AsyncPolicy;
