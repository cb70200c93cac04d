//! Configuration for the lifecycle manager.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How `update` treats stored state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Leave stored state untouched and only echo the async flag.
    #[default]
    Echo,

    /// Replace plan and parameters of the stored instance.
    Apply,
}

/// How asynchronously reported operations progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// Operations are complete as soon as they are accepted.
    #[default]
    Immediate,

    /// Asynchronously reported operations stay `in progress` until
    /// explicitly completed.
    Deferred,
}

/// Unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} mode: {value}")]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
}

impl FromStr for UpdateMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "echo" => Ok(UpdateMode::Echo),
            "apply" => Ok(UpdateMode::Apply),
            _ => Err(ParseModeError {
                kind: "update",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for CompletionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "immediate" => Ok(CompletionMode::Immediate),
            "deferred" => Ok(CompletionMode::Deferred),
            _ => Err(ParseModeError {
                kind: "completion",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateMode::Echo => write!(f, "echo"),
            UpdateMode::Apply => write!(f, "apply"),
        }
    }
}

impl fmt::Display for CompletionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionMode::Immediate => write!(f, "immediate"),
            CompletionMode::Deferred => write!(f, "deferred"),
        }
    }
}

/// Configuration for a [`LifecycleManager`](crate::LifecycleManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Report operations asynchronously to callers that accept it.
    pub async_enabled: bool,

    /// How `update` treats stored state.
    pub update_mode: UpdateMode,

    /// How asynchronously reported operations progress.
    pub completion_mode: CompletionMode,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            async_enabled: true,
            update_mode: UpdateMode::default(),
            completion_mode: CompletionMode::default(),
        }
    }
}

impl LifecycleConfig {
    /// A config that never reports operations asynchronously.
    pub fn synchronous() -> Self {
        Self {
            async_enabled: false,
            ..Default::default()
        }
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LifecycleConfig::default();
        assert!(config.async_enabled);
        assert_eq!(config.update_mode, UpdateMode::Echo);
        assert_eq!(config.completion_mode, CompletionMode::Immediate);
        assert!(!LifecycleConfig::synchronous().async_enabled);
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("apply".parse::<UpdateMode>().unwrap(), UpdateMode::Apply);
        assert_eq!("Echo".parse::<UpdateMode>().unwrap(), UpdateMode::Echo);
        assert_eq!(
            "deferred".parse::<CompletionMode>().unwrap(),
            CompletionMode::Deferred
        );

        let err = "later".parse::<CompletionMode>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown completion mode: later");
    }
}
