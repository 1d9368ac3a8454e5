//! Kafka REST Proxy v3 API models.
//!
//! Only the fields read by the health pass are modelled; everything else in
//! the payloads is ignored.

use serde::Deserialize;

/// v3 list response wrapper.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    /// Response data.
    pub data: Vec<T>,
}

/// Cluster resource from `GET /v3/clusters`.
#[derive(Debug, Deserialize)]
pub struct ClusterData {
    /// Cluster ID.
    pub cluster_id: String,
}

/// Broker resource from `GET /v3/clusters/{cluster_id}/brokers`.
#[derive(Debug, Deserialize)]
pub struct BrokerData {
    /// Broker ID.
    pub broker_id: i32,
    /// Advertised host.
    pub host: Option<String>,
    /// Advertised port.
    pub port: Option<u16>,
    /// Rack identifier.
    pub rack: Option<String>,
}

/// Config entry from `GET /v3/clusters/{cluster_id}/brokers/{broker_id}/configs`.
#[derive(Debug, Deserialize)]
pub struct BrokerConfigData {
    /// Config key.
    pub name: String,
    /// Config value, `null` for unset or sensitive entries.
    pub value: Option<String>,
}

/// Error body returned by the REST Proxy.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error_code: Option<i32>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_entry_with_null_value() {
        let body = r#"{
            "kind": "KafkaBrokerConfigList",
            "data": [
                {"name": "log.flush.interval.ms", "value": null, "is_sensitive": false},
                {"name": "min.insync.replicas", "value": "2", "is_default": false}
            ]
        }"#;

        let parsed: ListResponse<BrokerConfigData> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].value, None);
        assert_eq!(parsed.data[1].value.as_deref(), Some("2"));
    }
}
