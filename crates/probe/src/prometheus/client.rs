use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::{Error, Result};

/// A single alert as reported by `GET /api/v1/alerts`.
///
/// The endpoint only returns active alerts, so the entries seen here are
/// always firing or pending; resolved alerts are absent from the result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    pub state: AlertState,
    #[serde(rename = "activeAt", skip_serializing_if = "Option::is_none")]
    pub active_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Alert {
    /// Value of the well-known `severity` label, if present.
    pub fn severity(&self) -> Option<&str> {
        self.labels.get("severity").map(String::as_str)
    }

    /// Value of the well-known `alertname` label, if present.
    pub fn name(&self) -> Option<&str> {
        self.labels.get("alertname").map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    Firing,
    Pending,
    Inactive,
}

// Response envelope of the Prometheus HTTP API.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    data: Option<AlertsData>,
    #[serde(rename = "errorType", default)]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlertsData {
    alerts: Vec<Alert>,
}

/// The one Prometheus operation the probe consumes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertsApi: Send + Sync {
    /// List the alerts currently active on the backend.
    async fn active_alerts(&self) -> Result<Vec<Alert>>;
}

/// Thin client for the Prometheus alerts endpoint.
pub struct PrometheusClient {
    endpoint: Url,
    client: Client,
    bearer_token: Option<String>,
    timeout: Duration,
}

impl PrometheusClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            client: Client::new(),
            bearer_token: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a token sent as a bearer Authorization header.
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }

    /// Set the per-query timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AlertsApi for PrometheusClient {
    async fn active_alerts(&self) -> Result<Vec<Alert>> {
        let url = format!(
            "{}/api/v1/alerts",
            self.endpoint.as_str().trim_end_matches('/')
        );

        let mut request = self.client.get(&url).timeout(self.timeout);
        if let Some(token) = &self.bearer_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(Error::Prometheus(format!(
                "alerts query returned {}: {}",
                status, error_text
            )));
        }

        let body: ApiResponse = response.json().await?;
        if body.status != "success" {
            return Err(Error::Prometheus(format!(
                "alerts query failed with status {:?}: {} {}",
                body.status,
                body.error_type.unwrap_or_default(),
                body.error.unwrap_or_default()
            )));
        }

        Ok(body.data.map(|data| data.alerts).unwrap_or_default())
    }
}
