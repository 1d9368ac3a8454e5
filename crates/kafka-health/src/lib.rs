//! Kafka cluster health assessment.
//!
//! This crate queries a Kafka cluster's admin interface once per invocation and
//! derives a health summary for an external metrics collector:
//!
//! - how many of the expected brokers answered (UP / DEGRADED / DOWN)
//! - whether the cluster runs in KRaft or ZooKeeper mode
//! - whether broker configurations have drifted apart
//! - the oldest broker version and whether it is inside the supported range
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    HealthReportAssembler                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  describe_cluster ──► BrokerConfigFetcher (1 future/broker)  │
//! │                              │  join + sort by broker id     │
//! │                              ▼                               │
//! │                       ClusterSnapshot                        │
//! │        ┌──────────┬──────────┼──────────┬──────────┐         │
//! │        ▼          ▼          ▼          ▼          │         │
//! │     status     quorum   consistency  version ──► range check │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The admin interface sits behind the [`AdminClient`] trait; the crate ships
//! a Kafka REST Proxy v3 implementation in [`admin::rest`].
//!
//! ## Example
//!
//! ```ignore
//! use kafka_health::admin::rest::{RestAdmin, RestAdminConfig};
//! use kafka_health::{HealthCheckConfig, HealthReportAssembler};
//!
//! let config = HealthCheckConfig::new(3).with_version_range("2.0.0", "3.x.x")?;
//! let admin = RestAdmin::new(RestAdminConfig::new("http://kafka-rest:8082"))?;
//!
//! let report = HealthReportAssembler::new(&config).assemble(Some(&admin)).await;
//! println!("{}", report.render());
//! ```

pub mod admin;
pub mod config;
pub mod consistency;
pub mod error;
pub mod fetcher;
pub mod quorum;
pub mod report;
pub mod status;
pub mod version;

pub use admin::{AdminClient, AdminError, BrokerConfig, BrokerId};
pub use config::HealthCheckConfig;
pub use consistency::{ConsistencyChecker, ConsistencyVerdict};
pub use error::HealthError;
pub use fetcher::{BrokerConfigFetcher, ClusterSnapshot};
pub use quorum::QuorumMode;
pub use report::{HealthReport, HealthReportAssembler};
pub use status::HealthCode;
pub use version::{VersionRange, VersionTriple};
