//! Broker version resolution and compatibility range checks.
//!
//! Versions are compared as `(major, minor, patch)` triples. A textual `x`
//! component is mapped to [`WILDCARD`], which sorts above every real
//! component. That holds for the checked version as well as for the bounds,
//! so `3.2.x` is treated as `3.2.<max>`: it passes `max = 3.5.0` but fails
//! `max = 3.2.5`.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::admin::{BrokerConfig, BrokerId};
use crate::error::{HealthError, Result};

/// Config key advertising the inter-broker protocol version.
pub const PROTOCOL_VERSION_KEY: &str = "inter.broker.protocol.version";

/// Sentinel value standing in for an `x` component.
pub const WILDCARD: u32 = u32::MAX;

/// A `major.minor.patch` version with optional wildcard components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionTriple {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    fn parse_component(component: &str, raw: &str) -> Result<u32> {
        if component == "x" {
            return Ok(WILDCARD);
        }
        parse_digits(component).ok_or_else(|| HealthError::VersionFormat(raw.to_string()))
    }
}

/// Plain ASCII digits only; `u32::from_str` alone would accept a leading `+`.
fn parse_digits(component: &str) -> Option<u32> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    component.parse().ok()
}

impl FromStr for VersionTriple {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(HealthError::VersionFormat(s.to_string()));
        };

        Ok(Self {
            major: Self::parse_component(major, s)?,
            minor: Self::parse_component(minor, s)?,
            patch: Self::parse_component(patch, s)?,
        })
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let component = |v: u32| {
            if v == WILDCARD {
                "x".to_string()
            } else {
                v.to_string()
            }
        };
        write!(
            f,
            "{}.{}.{}",
            component(self.major),
            component(self.minor),
            component(self.patch)
        )
    }
}

/// Operator-declared supported version range, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    min_raw: String,
    max_raw: String,
    min: VersionTriple,
    max: VersionTriple,
}

impl VersionRange {
    /// Parse both bounds, failing on the first malformed one.
    pub fn parse(min: &str, max: &str) -> Result<Self> {
        Ok(Self {
            min: min.parse()?,
            max: max.parse()?,
            min_raw: min.to_string(),
            max_raw: max.to_string(),
        })
    }

    /// Lower bound as declared.
    pub fn min_raw(&self) -> &str {
        &self.min_raw
    }

    /// Upper bound as declared.
    pub fn max_raw(&self) -> &str {
        &self.max_raw
    }

    pub fn contains(&self, version: &VersionTriple) -> bool {
        self.min <= *version && *version <= self.max
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self {
            min_raw: "0.0.0".to_string(),
            max_raw: "x.x.x".to_string(),
            min: VersionTriple::new(0, 0, 0),
            max: VersionTriple::new(WILDCARD, WILDCARD, WILDCARD),
        }
    }
}

/// Check whether `version` lies within `[min, max]`.
pub fn is_version_compatible(version: &str, min: &str, max: &str) -> Result<bool> {
    let version: VersionTriple = version.parse()?;
    Ok(VersionRange::parse(min, max)?.contains(&version))
}

/// Resolve a broker's version as `<major>.<minor>.x`.
///
/// The inter-broker protocol version may carry a qualifier (`2.7-IV1`) which
/// is dropped. Only major and minor are kept; the patch is always a wildcard.
pub fn resolve_broker_version(broker: BrokerId, config: &BrokerConfig) -> Result<VersionTriple> {
    let unavailable = |reason: String| HealthError::VersionUnavailable { broker, reason };

    let raw = config
        .value(PROTOCOL_VERSION_KEY)
        .ok_or_else(|| unavailable(format!("{PROTOCOL_VERSION_KEY} is not set")))?;

    let base = raw.split('-').next().unwrap_or_default().trim();
    let mut parts = base.split('.');
    let (Some(major), Some(minor)) = (parts.next(), parts.next()) else {
        return Err(unavailable(format!("unparsable version '{raw}'")));
    };

    let (Some(major), Some(minor)) = (parse_digits(major), parse_digits(minor)) else {
        return Err(unavailable(format!("unparsable version '{raw}'")));
    };

    let version = VersionTriple::new(major, minor, WILDCARD);
    debug!(broker_id = %broker, raw = %raw, version = %version, "Resolved broker version");
    Ok(version)
}

/// Oldest version among the brokers, the one gating compatibility.
pub fn minimum_version<I>(versions: I) -> Option<VersionTriple>
where
    I: IntoIterator<Item = VersionTriple>,
{
    versions.into_iter().min()
}
