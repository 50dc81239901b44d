use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use obsgate_common::api::backend::BackendErrorBody;
use obsgate_common::config::BackendConfig;

/// Thin client for the observability API every tool proxies to.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend request failed: {0}")]
    Http(String),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse backend response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .user_agent("obsgate/0.1")
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BackendError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, BackendError> {
        let start = std::time::Instant::now();
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        Self::decode(path, start, response).await
    }

    /// GET with query parameters and decode the JSON response.
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, BackendError> {
        let start = std::time::Instant::now();
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        Self::decode(path, start, response).await
    }

    async fn decode(
        path: &str,
        start: std::time::Instant,
        response: reqwest::Response,
    ) -> Result<Value, BackendError> {
        let status = response.status();
        let latency = start.elapsed().as_secs_f64();
        metrics::histogram!("backend.request.latency", "path" => path.to_string()).record(latency);

        if !status.is_success() {
            metrics::counter!("backend.request.errors", "path" => path.to_string()).increment(1);
            let body = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<BackendErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}
