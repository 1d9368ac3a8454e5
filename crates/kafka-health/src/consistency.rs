//! Configuration drift detection across brokers.

use std::collections::HashSet;
use std::fmt;

use crate::admin::BrokerConfig;

/// Keys expected to differ between brokers.
pub const DEFAULT_ALLOWED_DIFFERENT_CONFIGS: &[&str] =
    &["listeners", "zookeeper.connect", "node.id"];

/// A config value as observed on one broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedValue {
    /// Key not reported by the broker.
    Missing,
    /// Key reported without a value.
    Null,
    Value(String),
}

impl ObservedValue {
    fn observe(config: &BrokerConfig, key: &str) -> Self {
        match config.get(key) {
            None => Self::Missing,
            Some(None) => Self::Null,
            Some(Some(v)) => Self::Value(v.to_string()),
        }
    }
}

impl fmt::Display for ObservedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "<missing>"),
            Self::Null => write!(f, "null"),
            Self::Value(v) => write!(f, "{v}"),
        }
    }
}

/// First differing key between the reference broker and another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDivergence {
    pub key: String,
    /// Value on the reference (first) broker.
    pub reference: ObservedValue,
    /// Value on the broker that diverged.
    pub other: ObservedValue,
}

/// Outcome of a consistency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyVerdict {
    Consistent,
    Divergent(ConfigDivergence),
    /// No broker configs were available to compare.
    NoData,
}

impl ConsistencyVerdict {
    pub fn is_consistent(&self) -> bool {
        matches!(self, Self::Consistent)
    }
}

impl fmt::Display for ConsistencyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consistent => write!(f, "Yes"),
            Self::Divergent(d) => write!(f, "No: [{}]: {} VS {}", d.key, d.reference, d.other),
            Self::NoData => write!(f, "Empty configs"),
        }
    }
}

/// Compares broker configurations against the first one in sequence.
#[derive(Debug, Clone)]
pub struct ConsistencyChecker {
    allowed_different: HashSet<String>,
}

impl Default for ConsistencyChecker {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_DIFFERENT_CONFIGS.iter().copied())
    }
}

impl ConsistencyChecker {
    pub fn new<I, S>(allowed_different: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_different: allowed_different.into_iter().map(Into::into).collect(),
        }
    }

    /// Report the first non-allow-listed key that differs from the reference.
    ///
    /// Brokers are scanned in the given order and keys in sorted order;
    /// scanning stops at the first hit.
    pub fn check(&self, configs: &[BrokerConfig]) -> ConsistencyVerdict {
        let Some((reference, others)) = configs.split_first() else {
            return ConsistencyVerdict::NoData;
        };

        for other in others.iter().filter(|other| *other != reference) {
            if let Some(divergence) = self.first_divergence(reference, other) {
                return ConsistencyVerdict::Divergent(divergence);
            }
        }

        ConsistencyVerdict::Consistent
    }

    fn first_divergence(
        &self,
        reference: &BrokerConfig,
        other: &BrokerConfig,
    ) -> Option<ConfigDivergence> {
        let extra_keys = other.keys().filter(|key| !reference.contains_key(key));

        reference
            .keys()
            .chain(extra_keys)
            .filter(|key| !self.allowed_different.contains(*key))
            .find(|key| reference.get(key) != other.get(key))
            .map(|key| ConfigDivergence {
                key: key.to_string(),
                reference: ObservedValue::observe(reference, key),
                other: ObservedValue::observe(other, key),
            })
    }
}
