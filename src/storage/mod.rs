//! Object storage boundary: upload a file, resolve its public URL, delete it.

mod rest;

pub use rest::RestObjectStorage;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Storage request failed: {0}")]
    Transport(String),

    #[error("Invalid storage configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Transport(err.to_string())
    }
}

pub type DynObjectStorage = Arc<dyn ObjectStorage + Send + Sync>;

#[async_trait]
pub trait ObjectStorage {
    /// Stores `bytes` under `path` and returns the stored path.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<String, StorageError>;

    /// Stable, unauthenticated link to a stored object.
    fn public_url(&self, path: &str) -> String;

    /// Deletes the given paths and returns those that existed. Missing paths
    /// are skipped, not reported as errors.
    async fn remove(&self, paths: &[String]) -> Result<Vec<String>, StorageError>;
}
