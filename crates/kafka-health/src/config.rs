//! Operator configuration for a health pass.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::consistency::DEFAULT_ALLOWED_DIFFERENT_CONFIGS;
use crate::error::{HealthError, Result};
use crate::version::VersionRange;

/// Keys removed from fetched configs because they are unique per broker.
pub const DEFAULT_BROKER_LOCAL_CONFIGS: &[&str] =
    &["broker.id", "log.dirs", "advertised.listeners", "broker.rack"];

/// Default per-broker fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

static TIMEOUT_REGEX: OnceLock<Regex> = OnceLock::new();

/// Immutable settings for one evaluation pass.
#[derive(Debug, Clone)]
pub struct HealthCheckConfig {
    /// Number of brokers the cluster is expected to run.
    pub total_brokers: usize,
    /// Whether the operator declared KRaft mode.
    pub kraft_enabled: bool,
    /// Supported version range.
    pub version_range: VersionRange,
    /// Upper bound for a single broker query.
    pub fetch_timeout: Duration,
    /// Namespace reported on the compatibility line.
    pub namespace: String,
    /// Keys exempt from the consistency check.
    pub allowed_different_configs: Vec<String>,
    /// Keys stripped from every fetched config.
    pub broker_local_configs: Vec<String>,
}

impl HealthCheckConfig {
    pub fn new(total_brokers: usize) -> Self {
        Self {
            total_brokers,
            kraft_enabled: false,
            version_range: VersionRange::default(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            namespace: String::new(),
            allowed_different_configs: owned_keys(DEFAULT_ALLOWED_DIFFERENT_CONFIGS),
            broker_local_configs: owned_keys(DEFAULT_BROKER_LOCAL_CONFIGS),
        }
    }

    #[must_use]
    pub fn with_kraft_enabled(mut self, kraft_enabled: bool) -> Self {
        self.kraft_enabled = kraft_enabled;
        self
    }

    /// Set the supported range, failing fast on malformed bounds.
    pub fn with_version_range(mut self, min: &str, max: &str) -> Result<Self> {
        self.version_range = VersionRange::parse(min, max)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_allowed_different_configs<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_different_configs = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_broker_local_configs<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.broker_local_configs = keys.into_iter().map(Into::into).collect();
        self
    }
}

fn owned_keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| (*k).to_string()).collect()
}

/// Parse an operator boolean (`yes`, `true`, `t`, `1`; anything else is false).
pub fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    Ok(matches!(
        value.trim().to_lowercase().as_str(),
        "yes" | "true" | "t" | "1"
    ))
}

/// Parse a timeout such as `60s` or `30`; leading digits are seconds.
pub fn parse_timeout(value: &str) -> Result<Duration> {
    let regex =
        TIMEOUT_REGEX.get_or_init(|| Regex::new(r"^\s*(\d+)").expect("Invalid regex pattern"));

    regex
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse::<u64>().ok())
        .map(Duration::from_secs)
        .ok_or_else(|| HealthError::InvalidConfig(format!("invalid timeout '{value}'")))
}
