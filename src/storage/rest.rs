use super::{ObjectStorage, StorageError};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

/// Client for a bucket on a Supabase-compatible storage REST API.
#[derive(Clone, Debug)]
pub struct RestObjectStorage {
    client: Client,
    base: Url,
    bucket: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemovedObject {
    name: String,
}

impl RestObjectStorage {
    pub fn new(base_url: &str, bucket: impl Into<String>, service_key: impl Into<String>) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StorageError::Config(format!("failed to construct storage client: {e}")))?;
        Self::with_client(client, base_url, bucket, service_key)
    }

    pub fn with_client(client: Client, base_url: &str, bucket: impl Into<String>, service_key: impl Into<String>) -> Result<Self, StorageError> {
        let base = Url::parse(base_url).map_err(|e| StorageError::Config(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(StorageError::Config(format!("{base_url} cannot be a base URL")));
        }
        Ok(Self { client, base, bucket: bucket.into(), service_key: service_key.into() })
    }

    /// `{base}/storage/v1/object/{segments..}` with each segment percent-encoded.
    fn object_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["storage", "v1", "object"]).extend(segments);
        }
        url
    }

    fn stored_path(&self, key: Option<String>, requested: &str) -> String {
        let prefix = format!("{}/", self.bucket);
        match key {
            Some(key) => key.strip_prefix(&prefix).map(str::to_string).unwrap_or(key),
            None => requested.to_string(),
        }
    }

    async fn upstream_error(response: reqwest::Response) -> StorageError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        StorageError::Upstream { status, message }
    }
}

#[async_trait]
impl ObjectStorage for RestObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<String, StorageError> {
        let url = self.object_url(&[&self.bucket, path]);
        let size = bytes.len();
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(header::CONTENT_TYPE, content_type.unwrap_or("application/octet-stream"))
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::upstream_error(response).await;
            error!("❌ Failed to upload {}: {}", path, err);
            return Err(err);
        }

        let body: UploadResponse = response.json().await.unwrap_or(UploadResponse { key: None });
        let stored = self.stored_path(body.key, path);
        info!("✅ Uploaded {} ({} bytes)", stored, size);
        Ok(stored)
    }

    fn public_url(&self, path: &str) -> String {
        self.object_url(&["public", &self.bucket, path]).to_string()
    }

    async fn remove(&self, paths: &[String]) -> Result<Vec<String>, StorageError> {
        let url = self.object_url(&[&self.bucket]);
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&serde_json::json!({ "prefixes": paths }))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            info!("🗑️ Nothing to remove for {:?}", paths);
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            let err = Self::upstream_error(response).await;
            error!("❌ Failed to remove {:?}: {}", paths, err);
            return Err(err);
        }

        let removed: Vec<RemovedObject> = response.json().await.unwrap_or_default();
        let removed: Vec<String> = removed.into_iter().map(|o| o.name).collect();
        info!("🗑️ Removed {} of {} objects", removed.len(), paths.len());
        Ok(removed)
    }
}
