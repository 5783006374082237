use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::HttpError;
use crate::metrics::{HealthStatus, MetricsSnapshot};

use super::client::Target;

/// Where live tools read server state from.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Display name of the server, usually its base URL.
    fn target(&self) -> &str;

    /// The `/metrics` document exactly as served.
    async fn fetch_raw_metrics(&self) -> Result<Value, HttpError>;

    async fn fetch_health(&self) -> Result<HealthStatus, HttpError>;

    async fn fetch_snapshot(&self) -> Result<MetricsSnapshot, HttpError> {
        let raw = self.fetch_raw_metrics().await?;
        serde_json::from_value(raw).map_err(|source| HttpError::DecodeFailed {
            endpoint: "/metrics".to_owned(),
            source,
        })
    }
}

/// Polls `/metrics` and `/` with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpMetricsSource {
    client: Client,
    label: String,
    health: Url,
    metrics: Url,
    poll_timeout: Duration,
}

impl HttpMetricsSource {
    #[must_use]
    pub fn new(client: Client, target: &Target, poll_timeout: Duration) -> Self {
        let label = target.base().as_str().trim_end_matches('/').to_owned();
        Self {
            client,
            label,
            health: target.base().clone(),
            metrics: target.metrics().clone(),
            poll_timeout,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, HttpError> {
        let endpoint = url.path().to_owned();
        let response = self
            .client
            .get(url.clone())
            .timeout(self.poll_timeout)
            .send()
            .await
            .map_err(|source| HttpError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| HttpError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| HttpError::DecodeFailed { endpoint, source })
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    fn target(&self) -> &str {
        &self.label
    }

    async fn fetch_raw_metrics(&self) -> Result<Value, HttpError> {
        self.get_json(&self.metrics).await
    }

    async fn fetch_health(&self) -> Result<HealthStatus, HttpError> {
        self.get_json(&self.health).await
    }
}
