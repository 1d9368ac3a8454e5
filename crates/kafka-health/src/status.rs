//! Cluster status classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tri-state cluster health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthCode {
    /// Every expected broker answered.
    Up,
    /// Some, but not all, expected brokers answered.
    Degraded,
    /// No broker answered.
    Down,
}

impl HealthCode {
    /// Numeric code understood by the metrics consumer.
    pub const fn code(self) -> u8 {
        match self {
            Self::Up => 0,
            Self::Degraded => 6,
            Self::Down => 10,
        }
    }
}

impl fmt::Display for HealthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Degraded => write!(f, "DEGRADED"),
            Self::Down => write!(f, "DOWN"),
        }
    }
}

/// Classify the cluster from active vs. expected broker counts.
///
/// More active brokers than expected is treated as degraded: the declared
/// total no longer describes the cluster.
pub fn classify(active: usize, expected_total: usize) -> HealthCode {
    if active == 0 {
        HealthCode::Down
    } else if active == expected_total {
        HealthCode::Up
    } else {
        HealthCode::Degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(0, 3), HealthCode::Down);
        assert_eq!(classify(3, 3), HealthCode::Up);
        assert_eq!(classify(1, 3), HealthCode::Degraded);
        assert_eq!(classify(2, 3), HealthCode::Degraded);
    }

    #[test]
    fn test_classify_inconsistent_totals() {
        assert_eq!(classify(4, 3), HealthCode::Degraded);
        assert_eq!(classify(0, 0), HealthCode::Down);
        assert_eq!(classify(1, 0), HealthCode::Degraded);
    }

    #[test]
    fn test_codes() {
        assert_eq!(HealthCode::Up.code(), 0);
        assert_eq!(HealthCode::Degraded.code(), 6);
        assert_eq!(HealthCode::Down.code(), 10);
        assert_eq!(HealthCode::Degraded.to_string(), "DEGRADED");
    }
}
