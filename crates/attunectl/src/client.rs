//! HTTP client for the attune daemon.

use anyhow::{bail, Context, Result};
use attune_shared::{
    ErrorResponse, HealthResponse, RespondRequest, RespondResponse, RewriteRequest,
    RewriteResponse,
};
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://127.0.0.1:5000";

/// Covers the daemon's own request deadline plus transport slack.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(200);

pub struct DaemonClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl DaemonClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn respond(&self, message: &str) -> Result<RespondResponse> {
        self.post("get_response", &RespondRequest::new(message)).await
    }

    pub async fn rewrite(&self, text: &str) -> Result<RewriteResponse> {
        self.post("rewrite", &RewriteRequest::new(text)).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Daemon not reachable at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| "no details".to_string());
            bail!("Daemon returned {}: {}", status, detail);
        }

        response
            .json()
            .await
            .context("Failed to parse daemon response")
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.http_client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .with_context(|| format!("Daemon not reachable at {}", self.base_url))?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse health response")
    }
}
