//! Kafka REST Proxy v3 admin client implementation.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::models::{BrokerConfigData, BrokerData, ClusterData, ErrorBody, ListResponse};
use crate::admin::traits::{AdminClient, AdminError, BrokerConfig, BrokerId};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the REST Proxy.
#[derive(Debug, Clone)]
pub struct RestAdminConfig {
    /// Base URL, e.g. `http://kafka-rest.kafka:8082`.
    pub base_url: String,
    /// Cluster to query. Discovered from `/v3/clusters` when unset.
    pub cluster_id: Option<String>,
    /// Basic auth user.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// PEM CA bundle trusted in addition to the system roots.
    pub ca_cert: Option<PathBuf>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RestAdminConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cluster_id: None,
            username: None,
            password: None,
            ca_cert: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_cluster_id(mut self, cluster_id: impl Into<String>) -> Self {
        self.cluster_id = Some(cluster_id.into());
        self
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// REST Proxy backed admin client.
#[derive(Debug)]
pub struct RestAdmin {
    /// HTTP client.
    client: Client,
    /// Base URL without trailing slash.
    base_url: String,
    /// Basic auth credentials, only sent when both parts are non-empty.
    credentials: Option<(String, String)>,
    /// Configured or lazily discovered cluster id.
    cluster_id: OnceCell<String>,
    /// Request timeout, reported on timed out requests.
    timeout_secs: u64,
}

impl RestAdmin {
    /// Create a new REST admin client.
    ///
    /// # Errors
    /// Returns error if the CA bundle cannot be read or the HTTP client
    /// cannot be created.
    pub fn new(config: RestAdminConfig) -> Result<Self, AdminError> {
        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(path) = &config.ca_cert {
            let pem = std::fs::read(path).map_err(|e| {
                AdminError::Config(format!("cannot read CA bundle {}: {e}", path.display()))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)?;
            builder = builder.add_root_certificate(cert);
        }

        let credentials = match (config.username, config.password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        };

        let cluster_id = match config.cluster_id {
            Some(id) if !id.is_empty() => OnceCell::new_with(Some(id)),
            _ => OnceCell::new(),
        };

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            cluster_id,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Make an authenticated GET request.
    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, AdminError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "GET request");

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AdminError::Timeout(self.timeout_secs)
            } else {
                AdminError::Http(e)
            }
        })?;

        Self::handle_response(response).await
    }

    /// Handle API response, parsing JSON or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AdminError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                AdminError::Serialization(e)
            });
        }

        let message = Self::error_message(&text);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AdminError::Unauthorized(message))
            }
            StatusCode::NOT_FOUND => Err(AdminError::NotFound(message)),
            _ => Err(AdminError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// Prefer the proxy's structured error message over the raw body.
    fn error_message(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                error_code: Some(code),
                message: Some(message),
            }) => format!("{message} (error_code {code})"),
            Ok(ErrorBody {
                message: Some(message),
                ..
            }) => message,
            _ => body.to_string(),
        }
    }

    /// Cluster id to query, discovering it on first use.
    async fn cluster_id(&self) -> Result<&str, AdminError> {
        self.cluster_id
            .get_or_try_init(|| async {
                let response: ListResponse<ClusterData> = self.get("/v3/clusters").await?;
                let cluster = response.data.into_iter().next().ok_or(AdminError::NoCluster)?;
                debug!(cluster_id = %cluster.cluster_id, "Discovered cluster");
                Ok::<_, AdminError>(cluster.cluster_id)
            })
            .await
            .map(String::as_str)
    }
}

#[async_trait]
impl AdminClient for RestAdmin {
    async fn describe_cluster(&self) -> Result<Vec<BrokerId>, AdminError> {
        let cluster_id = self.cluster_id().await?;
        let response: ListResponse<BrokerData> = self
            .get(&format!("/v3/clusters/{cluster_id}/brokers"))
            .await?;

        for broker in &response.data {
            debug!(
                broker_id = broker.broker_id,
                host = broker.host.as_deref().unwrap_or(""),
                port = broker.port.unwrap_or(0),
                rack = broker.rack.as_deref().unwrap_or(""),
                "Broker registered"
            );
        }

        Ok(response.data.iter().map(|b| BrokerId(b.broker_id)).collect())
    }

    async fn describe_broker_config(&self, broker: BrokerId) -> Result<BrokerConfig, AdminError> {
        let cluster_id = self.cluster_id().await?;
        let response: ListResponse<BrokerConfigData> = self
            .get(&format!("/v3/clusters/{cluster_id}/brokers/{broker}/configs"))
            .await?;

        Ok(response
            .data
            .into_iter()
            .map(|entry| (entry.name, entry.value))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_structured_body() {
        let body = r#"{"error_code":40403,"message":"Broker not found."}"#;
        assert_eq!(
            RestAdmin::error_message(body),
            "Broker not found. (error_code 40403)"
        );
        assert_eq!(RestAdmin::error_message("gateway down"), "gateway down");
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let admin = RestAdmin::new(
            RestAdminConfig::new("http://localhost:8082/").with_credentials("kafka", ""),
        )
        .unwrap();
        assert!(admin.credentials.is_none());
        assert_eq!(admin.base_url, "http://localhost:8082");
    }

    #[test]
    fn test_missing_ca_bundle_is_config_error() {
        let result = RestAdmin::new(
            RestAdminConfig::new("https://localhost:8082").with_ca_cert("/nonexistent/ca.crt"),
        );
        assert!(matches!(result, Err(AdminError::Config(_))));
    }
}
