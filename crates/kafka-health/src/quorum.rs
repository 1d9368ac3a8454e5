//! KRaft vs. ZooKeeper mode detection.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::admin::BrokerConfig;

/// Config key listing the KRaft controller quorum.
pub const QUORUM_VOTERS_KEY: &str = "controller.quorum.voters";

/// How cluster metadata is managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuorumMode {
    /// External ZooKeeper ensemble.
    #[serde(rename = "zookeeper")]
    ZooKeeper,
    /// Internal Raft quorum.
    #[serde(rename = "kraft")]
    KRaft,
}

impl QuorumMode {
    pub const fn from_kraft_flag(kraft: bool) -> Self {
        if kraft {
            Self::KRaft
        } else {
            Self::ZooKeeper
        }
    }

    pub const fn is_kraft(self) -> bool {
        matches!(self, Self::KRaft)
    }

    /// Numeric code understood by the metrics consumer.
    pub const fn code(self) -> u16 {
        match self {
            Self::ZooKeeper => 100,
            Self::KRaft => 101,
        }
    }
}

/// Detect the mode from a broker's configuration.
pub fn detect(config: &BrokerConfig) -> QuorumMode {
    let voters = config.value(QUORUM_VOTERS_KEY).unwrap_or_default();
    QuorumMode::from_kraft_flag(!voters.is_empty())
}

/// Resolve the reported mode, warning when it disagrees with the declared one.
///
/// The detected mode wins. Without a config to inspect the declared mode is
/// reported as is.
pub fn resolve(config: Option<&BrokerConfig>, declared_kraft: bool) -> QuorumMode {
    let declared = QuorumMode::from_kraft_flag(declared_kraft);
    let Some(config) = config else {
        return declared;
    };

    let detected = detect(config);
    if detected != declared {
        warn!(
            declared_kraft,
            detected_kraft = detected.is_kraft(),
            "KRAFT_ENABLED does not match the mode reported by the broker"
        );
    }
    detected
}
