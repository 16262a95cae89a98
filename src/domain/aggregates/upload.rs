//! Uploaded media

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Upload {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: Option<String>,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewUpload {
    pub user_id: Option<String>,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: Option<String>,
    pub storage_path: String,
}

/// A file picked in an admin form, before it reaches object storage.
#[derive(Clone, Debug)]
pub struct PendingFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl PendingFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), content_type, bytes }
    }

    pub fn size(&self) -> i64 { self.bytes.len() as i64 }

    /// Storage object name: `{prefix}{unix millis}-{file name}`.
    pub fn object_name(&self, prefix: &str, now: DateTime<Utc>) -> String {
        let name: String = self
            .file_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        format!("{prefix}{}-{name}", now.timestamp_millis())
    }
}
