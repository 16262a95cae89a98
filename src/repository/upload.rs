use super::UploadRepository;
use crate::domain::aggregates::{NewUpload, Upload};
use crate::errors::RepositoryError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

const UPLOAD_COLUMNS: &str = "id, user_id, file_name, file_size, file_type, storage_path, created_at";

#[derive(Clone)]
pub struct PgUploadRepository {
    db: PgPool,
}

impl PgUploadRepository {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl UploadRepository for PgUploadRepository {
    async fn create(&self, upload: &NewUpload) -> Result<Upload, RepositoryError> {
        let sql = format!(
            "INSERT INTO uploads (id, user_id, file_name, file_size, file_type, storage_path) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {UPLOAD_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Upload>(&sql)
            .bind(Uuid::now_v7())
            .bind(&upload.user_id)
            .bind(&upload.file_name)
            .bind(upload.file_size)
            .bind(&upload.file_type)
            .bind(&upload.storage_path)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to record upload {}: {:?}", upload.storage_path, err);
                RepositoryError::from(err)
            })?;

        info!("✅ Recorded upload {} at {}", created.id, created.storage_path);
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Upload>, RepositoryError> {
        let sql = format!("SELECT {UPLOAD_COLUMNS} FROM uploads ORDER BY created_at DESC");
        sqlx::query_as::<_, Upload>(&sql).fetch_all(&self.db).await.map_err(|err| {
            error!("❌ Failed to list uploads: {:?}", err);
            RepositoryError::from(err)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Upload>, RepositoryError> {
        let sql = format!("SELECT {UPLOAD_COLUMNS} FROM uploads WHERE id = $1");
        sqlx::query_as::<_, Upload>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch upload {}: {:?}", id, err);
                RepositoryError::from(err)
            })
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM uploads WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to delete upload {}: {:?}", id, err);
                RepositoryError::from(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        info!("🗑️ Deleted upload {}", id);
        Ok(())
    }
}
