//! Media gallery: listing and deleting uploaded files.

use crate::domain::aggregates::Upload;
use crate::domain::events::{DomainEvent, UploadEvent};
use crate::errors::ServiceError;
use crate::publisher::EventPublisher;
use crate::repository::DynUploadRepository;
use crate::saga::{Compensation, SagaLog, SagaStep};
use crate::storage::DynObjectStorage;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaStep { RemoveObject, DeleteRow }

impl SagaStep for MediaStep {
    fn name(&self) -> &'static str {
        match self { Self::RemoveObject => "remove_object", Self::DeleteRow => "delete_row" }
    }

    /// A removed object cannot be restored, so it stays removed.
    fn compensation(&self) -> Compensation { Compensation::Retain }
}

#[derive(Clone, Debug, Serialize)]
pub struct MediaItem {
    pub upload: Upload,
    pub public_url: String,
}

#[derive(Clone)]
pub struct MediaService {
    uploads: DynUploadRepository,
    storage: DynObjectStorage,
    publisher: EventPublisher,
}

impl MediaService {
    pub fn new(uploads: DynUploadRepository, storage: DynObjectStorage, publisher: EventPublisher) -> Self {
        Self { uploads, storage, publisher }
    }

    /// Newest first, each with its public URL.
    pub async fn gallery(&self) -> Result<Vec<MediaItem>, ServiceError> {
        let uploads = self.uploads.list().await?;
        Ok(uploads
            .into_iter()
            .map(|upload| MediaItem { public_url: self.storage.public_url(&upload.storage_path), upload })
            .collect())
    }

    /// Removes the stored object, then the row. An object that is already
    /// gone counts as removed.
    pub async fn delete(&self, id: Uuid) -> Result<Upload, ServiceError> {
        let upload = self
            .uploads
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Upload not found".into()))?;

        let mut saga = SagaLog::begin("delete_upload");
        let removed = saga
            .run(MediaStep::RemoveObject, async {
                self.storage.remove(std::slice::from_ref(&upload.storage_path)).await.map_err(ServiceError::from)
            })
            .await?;
        if removed.is_empty() {
            info!("🫥 Object {} was already gone", upload.storage_path);
        }

        saga.run(MediaStep::DeleteRow, async { self.uploads.delete(upload.id).await.map_err(ServiceError::from) })
            .await?;
        saga.finish();

        self.publisher
            .publish(DomainEvent::Upload(UploadEvent::Deleted {
                upload_id: upload.id,
                storage_path: upload.storage_path.clone(),
            }))
            .await;
        Ok(upload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ObjectStorage;
    use crate::testing::{FakeStorage, FakeUploads};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn service() -> (MediaService, Arc<FakeUploads>, Arc<FakeStorage>) {
        let uploads = Arc::new(FakeUploads::default());
        let storage = Arc::new(FakeStorage::default());
        (MediaService::new(uploads.clone(), storage.clone(), EventPublisher::disabled()), uploads, storage)
    }

    #[tokio::test]
    async fn test_delete_removes_object_and_row() {
        let (service, uploads, storage) = service();
        storage.upload("1700000000000-front.png", vec![1], None).await.unwrap();
        let upload = uploads.seed("1700000000000-front.png");

        service.delete(upload.id).await.unwrap();
        assert!(!storage.contains("1700000000000-front.png"));
        assert_eq!(uploads.len(), 0);
    }

    #[tokio::test]
    async fn test_missing_object_still_deletes_row() {
        let (service, uploads, _) = service();
        let upload = uploads.seed("1700000000000-gone.png");
        service.delete(upload.id).await.unwrap();
        assert_eq!(uploads.len(), 0);
    }

    #[tokio::test]
    async fn test_missing_object_on_storage_api_still_deletes_row() {
        use crate::storage::RestObjectStorage;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/v1/object/uploads"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "not_found"})))
            .expect(1)
            .mount(&server)
            .await;
        let uploads = Arc::new(FakeUploads::default());
        let storage = RestObjectStorage::new(&server.uri(), "uploads", "service-key").unwrap();
        let service = MediaService::new(uploads.clone(), Arc::new(storage), EventPublisher::disabled());

        let upload = uploads.seed("1700000000000-gone.png");
        service.delete(upload.id).await.unwrap();
        assert_eq!(uploads.len(), 0);
    }

    #[tokio::test]
    async fn test_row_failure_after_object_removed() {
        let (service, uploads, storage) = service();
        storage.upload("1-a.png", vec![1], None).await.unwrap();
        let upload = uploads.seed("1-a.png");
        uploads.fail_delete.store(true, Ordering::SeqCst);

        let err = service.delete(upload.id).await.unwrap_err();
        let ServiceError::Saga(failure) = err else { panic!("expected saga failure") };
        assert_eq!(failure.failed_step, "delete_row");
        assert_eq!(failure.retained().map(|c| c.step).collect::<Vec<_>>(), vec!["remove_object"]);
        assert!(!storage.contains("1-a.png"));
        assert_eq!(uploads.len(), 1);
    }

    #[tokio::test]
    async fn test_gallery_has_public_urls() {
        let (service, uploads, _) = service();
        uploads.seed("1-a.png");
        let items = service.gallery().await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].public_url.ends_with("/uploads/1-a.png"));
        assert!(matches!(service.delete(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }
}
