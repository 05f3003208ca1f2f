//! HTTP outline collection.
//!
//! Talks to the publication API:
//! `{api_base_url}/publications/{publication}/outlines[/{outline}]`.

use super::remote::OutlineCollection;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use pagemark_outline::{NewOutline, OutlineEntry, OutlinePatch};
use pagemark_types::{OutlineId, PublicationId};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP collection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpCollectionConfig {
    /// Base URL of the publication API (e.g. `http://localhost:3001`).
    pub api_base_url: String,
    /// Per-request timeout enforced by the HTTP client (in seconds).
    pub timeout_secs: u64,
}

impl Default for HttpCollectionConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001".to_string(),
            timeout_secs: 60,
        }
    }
}

/// List responses wrap the entries in a `data` field; anything but an
/// array there reads as no entries.
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl ListResponse {
    fn into_entries(self) -> SyncResult<Vec<OutlineEntry>> {
        match self.data {
            Some(data @ serde_json::Value::Array(_)) => Ok(serde_json::from_value(data)?),
            _ => Ok(Vec::new()),
        }
    }
}

/// Error bodies may carry a human-readable `detail`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Outline collection backed by the publication HTTP API.
pub struct HttpOutlineCollection {
    config: HttpCollectionConfig,
    client: Client,
}

impl HttpOutlineCollection {
    /// Creates a collection client.
    pub fn new(config: HttpCollectionConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpCollectionConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.api_base_url.trim_end_matches('/')
    }

    fn outlines_url(&self, publication: &PublicationId) -> String {
        format!(
            "{}/publications/{}/outlines",
            self.base_url(),
            urlencoding::encode(publication.as_str())
        )
    }

    fn outline_url(&self, publication: &PublicationId, id: &OutlineId) -> String {
        format!(
            "{}/{}",
            self.outlines_url(publication),
            urlencoding::encode(id.as_str())
        )
    }

    /// Returns true if the API answers its health probe.
    pub async fn health(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url()))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Health check against {} failed: {}", self.base_url(), e);
                false
            }
        }
    }

    async fn parse_entry(response: Response, action: &str) -> SyncResult<OutlineEntry> {
        response
            .json::<OutlineEntry>()
            .await
            .map_err(|e| SyncError::Network(format!("failed to parse {action} response: {e}")))
    }
}

/// Turns a non-success response into [`SyncError::Remote`], preferring the
/// body's `detail` over the raw text.
async fn remote_error(response: Response, action: &str) -> SyncError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.detail)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("{action} failed with status {status}")
            } else {
                body
            }
        });

    SyncError::Remote {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl OutlineCollection for HttpOutlineCollection {
    fn provider_name(&self) -> &'static str {
        "HTTP"
    }

    async fn list_outlines(&self, publication: &PublicationId) -> SyncResult<Vec<OutlineEntry>> {
        let response = self
            .client
            .get(self.outlines_url(publication))
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("list outlines failed: {e}")))?;

        if !response.status().is_success() {
            return Err(remote_error(response, "list outlines").await);
        }

        let list: ListResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Network(format!("failed to parse outline list: {e}")))?;

        let entries = list.into_entries()?;
        debug!("Listed {} outlines for {}", entries.len(), publication);
        Ok(entries)
    }

    async fn get_outline(
        &self,
        publication: &PublicationId,
        id: &OutlineId,
    ) -> SyncResult<OutlineEntry> {
        let response = self
            .client
            .get(self.outline_url(publication, id))
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("get outline failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SyncError::NotFound(format!("outline {id}")));
        }
        if !response.status().is_success() {
            return Err(remote_error(response, "get outline").await);
        }

        Self::parse_entry(response, "get outline").await
    }

    async fn create_outline(
        &self,
        publication: &PublicationId,
        outline: &NewOutline,
    ) -> SyncResult<OutlineEntry> {
        let response = self
            .client
            .post(self.outlines_url(publication))
            .json(outline)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("create outline failed: {e}")))?;

        if !response.status().is_success() {
            return Err(remote_error(response, "create outline").await);
        }

        let created = Self::parse_entry(response, "create outline").await?;
        debug!("Created outline {} ({})", created.id, created.title);
        Ok(created)
    }

    async fn update_outline(
        &self,
        publication: &PublicationId,
        id: &OutlineId,
        patch: &OutlinePatch,
    ) -> SyncResult<OutlineEntry> {
        let response = self
            .client
            .patch(self.outline_url(publication, id))
            .json(patch)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("update outline failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SyncError::NotFound(format!("outline {id}")));
        }
        if !response.status().is_success() {
            return Err(remote_error(response, "update outline").await);
        }

        Self::parse_entry(response, "update outline").await
    }

    async fn delete_outline(&self, publication: &PublicationId, id: &OutlineId) -> SyncResult<()> {
        debug!("Deleting outline: {}", id);

        let response = self
            .client
            .delete(self.outline_url(publication, id))
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("delete outline failed: {e}")))?;

        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(remote_error(response, "delete outline").await);
        }

        info!("Deleted outline: {}", id);
        Ok(())
    }
}
