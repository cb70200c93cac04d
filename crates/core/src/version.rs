//! Broker API version negotiation.

use crate::BrokerError;
use std::fmt;

/// Lowest API version this broker speaks.
pub const MIN_API_VERSION: ApiVersion = ApiVersion { major: 2, minor: 0 };

/// A `major.minor` broker API version, as sent in `X-Broker-API-Version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    /// Parse a `major.minor` version string.
    pub fn parse(s: &str) -> Option<Self> {
        let (major, minor) = s.trim().split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    /// Parse a version string and check it is supported.
    pub fn parse_supported(s: &str) -> Result<Self, BrokerError> {
        let version =
            Self::parse(s).ok_or_else(|| BrokerError::UnsupportedApiVersion(s.to_string()))?;
        if version.major != MIN_API_VERSION.major || version < MIN_API_VERSION {
            return Err(BrokerError::UnsupportedApiVersion(s.to_string()));
        }
        Ok(version)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
