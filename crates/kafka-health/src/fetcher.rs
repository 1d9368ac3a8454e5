//! Concurrent per-broker config retrieval.

use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use crate::admin::{AdminClient, AdminError, BrokerConfig, BrokerId};

/// A broker could not be queried during this pass.
#[derive(Error, Debug)]
#[error("Broker {broker} unreachable: {source}")]
pub struct BrokerUnreachable {
    pub broker: BrokerId,
    pub source: AdminError,
}

/// Broker configs gathered in one pass, ordered by broker id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSnapshot {
    /// Brokers that answered, with their comparable configs.
    pub brokers: Vec<(BrokerId, BrokerConfig)>,
    /// Brokers that failed or timed out.
    pub unreachable: Vec<BrokerId>,
}

impl ClusterSnapshot {
    pub fn active_brokers(&self) -> Vec<BrokerId> {
        self.brokers.iter().map(|(id, _)| *id).collect()
    }

    pub fn active_count(&self) -> usize {
        self.brokers.len()
    }

    /// Configs in broker id order.
    pub fn configs(&self) -> Vec<BrokerConfig> {
        self.brokers.iter().map(|(_, config)| config.clone()).collect()
    }
}

/// Fetches broker configs and strips broker-local keys.
pub struct BrokerConfigFetcher<'a> {
    admin: &'a dyn AdminClient,
    broker_local_configs: &'a [String],
    timeout: Duration,
}

impl<'a> BrokerConfigFetcher<'a> {
    pub fn new(
        admin: &'a dyn AdminClient,
        broker_local_configs: &'a [String],
        timeout: Duration,
    ) -> Self {
        Self {
            admin,
            broker_local_configs,
            timeout,
        }
    }

    /// Fetch one broker's config, bounded by the fetch timeout.
    pub async fn fetch(&self, broker: BrokerId) -> Result<BrokerConfig, BrokerUnreachable> {
        let result = tokio::time::timeout(self.timeout, self.admin.describe_broker_config(broker))
            .await
            .unwrap_or_else(|_| Err(AdminError::Timeout(self.timeout.as_secs())));

        let mut config = result.map_err(|source| BrokerUnreachable { broker, source })?;
        for key in self.broker_local_configs {
            config.remove(key);
        }

        debug!(broker_id = %broker, keys = config.len(), "Fetched broker config");
        Ok(config)
    }

    /// Fetch all brokers concurrently.
    ///
    /// Failures are logged and recorded as unreachable; they never abort the
    /// pass. The snapshot is ordered by broker id regardless of completion
    /// order.
    pub async fn fetch_all(&self, brokers: &[BrokerId]) -> ClusterSnapshot {
        let mut ids = brokers.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let results = join_all(ids.iter().map(|id| self.fetch(*id))).await;

        let mut snapshot = ClusterSnapshot::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(config) => snapshot.brokers.push((id, config)),
                Err(e) => {
                    warn!(broker_id = %id, error = %e.source, "Excluding unreachable broker");
                    snapshot.unreachable.push(id);
                }
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::traits::MockAdminClient;
    use crate::config::HealthCheckConfig;

    fn broker_config(id: i32) -> BrokerConfig {
        [
            ("broker.id", Some(id.to_string())),
            ("log.dirs", Some(format!("/var/lib/kafka/data-{id}"))),
            ("advertised.listeners", Some(format!("PLAINTEXT://kafka-{id}:9092"))),
            ("broker.rack", None),
            ("min.insync.replicas", Some("2".to_string())),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_fetch_strips_broker_local_keys() {
        let mut admin = MockAdminClient::new();
        admin
            .expect_describe_broker_config()
            .returning(|id| Ok(broker_config(id.0)));

        let local = HealthCheckConfig::new(1).broker_local_configs;
        let fetcher = BrokerConfigFetcher::new(&admin, &local, Duration::from_secs(5));
        let config = fetcher.fetch(BrokerId(1)).await.unwrap();

        let keys: Vec<_> = config.keys().collect();
        assert_eq!(keys, vec!["min.insync.replicas"]);
    }

    #[tokio::test]
    async fn test_fetch_all_isolates_failures() {
        let mut admin = MockAdminClient::new();
        admin.expect_describe_broker_config().returning(|id| {
            if id == BrokerId(2) {
                Err(AdminError::Unauthorized("denied".to_string()))
            } else {
                Ok(broker_config(id.0))
            }
        });

        let local = HealthCheckConfig::new(3).broker_local_configs;
        let fetcher = BrokerConfigFetcher::new(&admin, &local, Duration::from_secs(5));
        let snapshot = fetcher
            .fetch_all(&[BrokerId(3), BrokerId(1), BrokerId(2), BrokerId(1)])
            .await;

        assert_eq!(snapshot.active_brokers(), vec![BrokerId(1), BrokerId(3)]);
        assert_eq!(snapshot.unreachable, vec![BrokerId(2)]);
        assert_eq!(snapshot.configs()[0], snapshot.configs()[1]);
    }

    #[tokio::test]
    async fn test_fetch_all_empty() {
        let admin = MockAdminClient::new();
        let fetcher = BrokerConfigFetcher::new(&admin, &[], Duration::from_secs(5));
        let snapshot = fetcher.fetch_all(&[]).await;
        assert_eq!(snapshot, ClusterSnapshot::default());
        assert_eq!(snapshot.active_count(), 0);
    }
}
