//! Kafka REST Proxy admin backend.
//!
//! Implements the [`AdminClient`](crate::admin::AdminClient) trait against the
//! REST Proxy v3 API:
//!
//! - `GET /v3/clusters`
//! - `GET /v3/clusters/{cluster_id}/brokers`
//! - `GET /v3/clusters/{cluster_id}/brokers/{broker_id}/configs`
//!
//! ## Example
//!
//! ```ignore
//! use kafka_health::admin::rest::{RestAdmin, RestAdminConfig};
//! use kafka_health::admin::AdminClient;
//!
//! let admin = RestAdmin::new(RestAdminConfig::new("http://kafka-rest:8082"))?;
//! let brokers = admin.describe_cluster().await?;
//! ```

mod client;
mod models;

pub use client::{RestAdmin, RestAdminConfig};
