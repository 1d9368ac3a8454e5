//! Errors raised by the health pass itself.

use thiserror::Error;

use crate::admin::BrokerId;

/// Errors that can occur while deriving cluster health.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HealthError {
    /// Broker config carries no usable inter-broker protocol version.
    #[error("Version unavailable for broker {broker}: {reason}")]
    VersionUnavailable { broker: BrokerId, reason: String },

    /// Version string is not `N.N.N` with optional `x` components.
    #[error("Invalid version format '{0}': expected three dot-separated components")]
    VersionFormat(String),

    /// Operator configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for health pass operations.
pub type Result<T> = std::result::Result<T, HealthError>;
