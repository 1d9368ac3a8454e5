//! Health pass orchestration and metric line rendering.
//!
//! A pass lists the brokers, fetches their configs concurrently and derives
//! the cluster status, quorum mode, config consistency and the oldest broker
//! version from that single snapshot. The result renders as one
//! `kafka_cluster` line plus an optional `supplementary_services` line.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::admin::AdminClient;
use crate::config::HealthCheckConfig;
use crate::consistency::{ConsistencyChecker, ConsistencyVerdict};
use crate::fetcher::{BrokerConfigFetcher, ClusterSnapshot};
use crate::quorum::{self, QuorumMode};
use crate::status::{self, HealthCode};
use crate::version::{self, VersionTriple};

/// Version compatibility verdict for the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityReport {
    pub namespace: String,
    /// Oldest broker version.
    pub application_version: String,
    pub min_version: String,
    pub max_version: String,
    pub compatible: bool,
}

impl CompatibilityReport {
    pub fn line(&self) -> String {
        format!(
            "supplementary_services,application=kafka,namespace={},application_version={},min_version={},max_version={} version_compatible={}i",
            self.namespace,
            self.application_version,
            self.min_version,
            self.max_version,
            u8::from(self.compatible)
        )
    }
}

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// Number of brokers that answered.
    pub size: usize,
    pub status: HealthCode,
    pub quorum_mode: QuorumMode,
    pub same_configs: ConsistencyVerdict,
    /// Oldest broker version, `None` when no broker reported one.
    pub kafka_version: Option<VersionTriple>,
    /// Present when the admin interface was reachable and a version resolved.
    pub compatibility: Option<CompatibilityReport>,
}

impl HealthReport {
    pub fn status_line(&self) -> String {
        let version = self
            .kafka_version
            .map(|v| v.to_string())
            .unwrap_or_default();

        format!(
            "kafka_cluster size={}i,status={},quorum_mode={}i,same_configs=\"{}\",kafka_version=\"{}\"",
            self.size,
            self.status.code(),
            self.quorum_mode.code(),
            self.same_configs,
            version
        )
    }

    pub fn compatibility_line(&self) -> Option<String> {
        self.compatibility.as_ref().map(CompatibilityReport::line)
    }

    /// All metric lines, newline separated.
    pub fn render(&self) -> String {
        let mut message = self.status_line();
        if let Some(line) = self.compatibility_line() {
            message.push('\n');
            message.push_str(&line);
        }
        message
    }

    /// Structured form of the report for JSON output.
    pub fn to_json(&self) -> Value {
        json!({
            "size": self.size,
            "status": self.status,
            "status_code": self.status.code(),
            "quorum_mode": self.quorum_mode,
            "quorum_mode_code": self.quorum_mode.code(),
            "same_configs": self.same_configs.to_string(),
            "kafka_version": self.kafka_version.map(|v| v.to_string()),
            "compatibility": self.compatibility,
        })
    }
}

/// Runs a health pass against an admin capability.
pub struct HealthReportAssembler<'a> {
    config: &'a HealthCheckConfig,
    checker: ConsistencyChecker,
}

impl<'a> HealthReportAssembler<'a> {
    pub fn new(config: &'a HealthCheckConfig) -> Self {
        Self {
            config,
            checker: ConsistencyChecker::new(config.allowed_different_configs.iter().cloned()),
        }
    }

    /// Run one pass.
    ///
    /// `admin` is `None` when no admin connection could be established; the
    /// pass then reports zero active brokers instead of failing.
    pub async fn assemble(&self, admin: Option<&dyn AdminClient>) -> HealthReport {
        let Some(admin) = admin else {
            warn!("Admin connection unavailable, reporting cluster as down");
            return self.unreachable_report();
        };

        let broker_ids = match admin.describe_cluster().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to describe cluster, reporting cluster as down");
                return self.unreachable_report();
            }
        };
        info!(brokers = ?broker_ids, "Describing brokers");

        let fetcher = BrokerConfigFetcher::new(
            admin,
            &self.config.broker_local_configs,
            self.config.fetch_timeout,
        );
        let snapshot = fetcher.fetch_all(&broker_ids).await;
        self.evaluate(&snapshot)
    }

    /// Derive the report from a collected snapshot.
    pub fn evaluate(&self, snapshot: &ClusterSnapshot) -> HealthReport {
        let active = snapshot.active_brokers();
        info!(
            active_brokers = ?active,
            unreachable = ?snapshot.unreachable,
            "Collected broker configs"
        );

        let status = status::classify(active.len(), self.config.total_brokers);
        info!(status = %status, "Cluster status");

        let quorum_mode = quorum::resolve(
            snapshot.brokers.first().map(|(_, config)| config),
            self.config.kraft_enabled,
        );

        let same_configs = self.checker.check(&snapshot.configs());

        let versions = snapshot
            .brokers
            .iter()
            .filter_map(|(id, config)| match version::resolve_broker_version(*id, config) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(error = %e, "Excluding broker from version resolution");
                    None
                }
            });
        let kafka_version = version::minimum_version(versions);

        let compatibility = kafka_version.map(|v| self.compatibility(v));

        HealthReport {
            size: active.len(),
            status,
            quorum_mode,
            same_configs,
            kafka_version,
            compatibility,
        }
    }

    fn compatibility(&self, version: VersionTriple) -> CompatibilityReport {
        let range = &self.config.version_range;
        CompatibilityReport {
            namespace: self.config.namespace.clone(),
            application_version: version.to_string(),
            min_version: range.min_raw().to_string(),
            max_version: range.max_raw().to_string(),
            compatible: range.contains(&version),
        }
    }

    fn unreachable_report(&self) -> HealthReport {
        HealthReport {
            size: 0,
            status: HealthCode::Down,
            quorum_mode: QuorumMode::from_kraft_flag(self.config.kraft_enabled),
            same_configs: ConsistencyVerdict::NoData,
            kafka_version: None,
            compatibility: None,
        }
    }
}
