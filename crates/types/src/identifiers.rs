//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $label, self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Service instance identifier, assigned by the platform.
    InstanceId,
    "Instance"
);

string_id!(
    /// Service binding identifier, assigned by the platform.
    BindingId,
    "Binding"
);

string_id!(
    /// Catalog service identifier.
    ServiceId,
    "Service"
);

string_id!(
    /// Catalog plan identifier.
    PlanId,
    "Plan"
);

/// Opaque token handed to platforms for polling an asynchronous operation.
///
/// Rendered on the wire as `op-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationKey(pub u64);

impl OperationKey {
    /// Create a new operation key.
    pub fn new(n: u64) -> Self {
        Self(n)
    }

    /// Get the raw sequence number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

impl FromStr for OperationKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("op-")
            .and_then(|n| n.parse::<u64>().ok())
            .map(OperationKey)
            .ok_or_else(|| format!("Invalid operation key: {}", s))
    }
}

impl TryFrom<String> for OperationKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<OperationKey> for String {
    fn from(key: OperationKey) -> Self {
        key.to_string()
    }
}
