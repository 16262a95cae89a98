//! Product creation with concurrent image uploads.

use crate::auth::AuthUser;
use crate::domain::aggregates::{NewProduct, NewUpload, PendingFile, Product};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::errors::ServiceError;
use crate::publisher::EventPublisher;
use crate::repository::{DynProductRepository, DynUploadRepository};
use crate::storage::DynObjectStorage;
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Lifecycle of one selected image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadSlot {
    Uploading,
    Uploaded { url: String },
    Failed { reason: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct SlotReport {
    pub slot_id: Uuid,
    pub file_name: String,
    pub state: UploadSlot,
}

impl SlotReport {
    pub fn url(&self) -> Option<&str> {
        match &self.state {
            UploadSlot::Uploaded { url } => Some(url),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CreatedProduct {
    pub product: Product,
    pub slots: Vec<SlotReport>,
}

impl CreatedProduct {
    pub fn failed(&self) -> impl Iterator<Item = &SlotReport> {
        self.slots.iter().filter(|s| matches!(s.state, UploadSlot::Failed { .. }))
    }
}

#[derive(Clone)]
pub struct CatalogService {
    products: DynProductRepository,
    uploads: DynUploadRepository,
    storage: DynObjectStorage,
    publisher: EventPublisher,
}

impl CatalogService {
    pub fn new(
        products: DynProductRepository,
        uploads: DynUploadRepository,
        storage: DynObjectStorage,
        publisher: EventPublisher,
    ) -> Self {
        Self { products, uploads, storage, publisher }
    }

    pub async fn newest(&self, limit: i64) -> Result<Vec<Product>, ServiceError> {
        Ok(self.products.list_active(Some(limit)).await?)
    }

    pub async fn all_active(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.products.list_active(None).await?)
    }

    pub async fn product(&self, id: Uuid) -> Result<Product, ServiceError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".into()))
    }

    /// Validates the form, uploads every image concurrently, then inserts the
    /// product with the images that made it, in selection order.
    pub async fn create_product(&self, user: &AuthUser, mut product: NewProduct, files: Vec<PendingFile>) -> Result<CreatedProduct, ServiceError> {
        product.validate().map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

        let slots = join_all(files.into_iter().map(|file| self.upload_image(user, file))).await;
        product.images = slots.iter().filter_map(|s| s.url().map(str::to_string)).collect();

        let created = self.products.create(&product).await?;
        self.publisher
            .publish(DomainEvent::Product(ProductEvent::Created {
                product_id: created.id,
                name: created.name.clone(),
                price: created.price,
            }))
            .await;

        let result = CreatedProduct { product: created, slots };
        let failed = result.failed().count();
        if failed > 0 {
            warn!("⚠️ Product {} created without {} image(s)", result.product.id, failed);
        }
        Ok(result)
    }

    async fn upload_image(&self, user: &AuthUser, file: PendingFile) -> SlotReport {
        let slot_id = Uuid::new_v4();
        let mut report = SlotReport { slot_id, file_name: file.file_name.clone(), state: UploadSlot::Uploading };
        info!("⬆️ Uploading {} (slot {})", file.file_name, slot_id);

        let object_name = file.object_name(&format!("{slot_id}-"), Utc::now());
        let size = file.size();
        let path = match self.storage.upload(&object_name, file.bytes, file.content_type.as_deref()).await {
            Ok(path) => path,
            Err(e) => {
                warn!("⚠️ Failed to upload {}: {}", file.file_name, e);
                report.state = UploadSlot::Failed { reason: format!("Failed to upload {}", file.file_name) };
                return report;
            }
        };

        let record = NewUpload {
            user_id: Some(user.id.clone()),
            file_name: file.file_name.clone(),
            file_size: size,
            file_type: file.content_type.clone(),
            storage_path: path.clone(),
        };
        if let Err(e) = self.uploads.create(&record).await {
            warn!("⚠️ Uploaded {} but could not record it: {}", path, e);
        }

        report.state = UploadSlot::Uploaded { url: self.storage.public_url(&path) };
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{hoodie, FakeProducts, FakeStorage, FakeUploads};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn admin() -> AuthUser {
        AuthUser { id: "admin_1".into(), full_name: None, role: Some("admin".into()) }
    }

    fn png(name: &str) -> PendingFile {
        PendingFile::new(name, Some("image/png".into()), vec![1, 2, 3])
    }

    fn service() -> (CatalogService, Arc<FakeProducts>, Arc<FakeUploads>, Arc<FakeStorage>) {
        let products = FakeProducts::with(vec![]);
        let uploads = Arc::new(FakeUploads::default());
        let storage = Arc::new(FakeStorage::default());
        let service = CatalogService::new(products.clone(), uploads.clone(), storage.clone(), EventPublisher::disabled());
        (service, products, uploads, storage)
    }

    #[tokio::test]
    async fn test_create_product_keeps_selection_order() {
        let (service, products, uploads, storage) = service();
        let form = NewProduct::new("Classic Hoodie", Decimal::new(1999, 0)).unwrap();
        let created = service.create_product(&admin(), form, vec![png("front.png"), png("back.png")]).await.unwrap();

        let images = &created.product.images;
        assert_eq!(images.len(), 2);
        assert!(images[0].ends_with("-front.png"));
        assert!(images[1].ends_with("-back.png"));
        assert_eq!(created.product.image_url.as_deref(), Some(images[0].as_str()));
        assert!(created.product.is_active);
        assert_eq!(uploads.len(), 2);
        assert_eq!(storage.paths().len(), 2);
        assert_eq!(products.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_named_files_get_their_own_objects() {
        let (service, _, uploads, storage) = service();
        let form = NewProduct::new("Classic Hoodie", Decimal::new(1999, 0)).unwrap();
        let files = vec![
            PendingFile::new("photo.jpg", Some("image/jpeg".into()), vec![1]),
            PendingFile::new("photo.jpg", Some("image/jpeg".into()), vec![2]),
        ];
        let created = service.create_product(&admin(), form, files).await.unwrap();

        let images = &created.product.images;
        assert_eq!(images.len(), 2);
        assert_ne!(images[0], images[1]);
        for (slot, image) in created.slots.iter().zip(images) {
            assert!(image.contains(&slot.slot_id.to_string()));
        }
        assert_eq!(storage.paths().len(), 2);
        assert_eq!(uploads.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_upload_is_reported_and_dropped() {
        let (service, _, uploads, storage) = service();
        storage.reject_names_containing("huge");
        let form = NewProduct::new("Classic Hoodie", Decimal::new(1999, 0)).unwrap();
        let created = service
            .create_product(&admin(), form, vec![png("huge.png"), png("ok.png")])
            .await
            .unwrap();

        assert_eq!(created.product.images.len(), 1);
        let failed: Vec<&str> = created.failed().map(|s| s.file_name.as_str()).collect();
        assert_eq!(failed, vec!["huge.png"]);
        assert_eq!(uploads.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_uploads_nothing() {
        let (service, _, _, storage) = service();
        let form = NewProduct { name: "Hoodie".into(), price: Decimal::ZERO, ..Default::default() };
        let err = service.create_product(&admin(), form, vec![png("a.png")]).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(msg) if msg == "Name and price are required"));
        assert!(storage.paths().is_empty());
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let products = FakeProducts::with(vec![hoodie()]);
        let service = CatalogService::new(
            products,
            Arc::new(FakeUploads::default()),
            Arc::new(FakeStorage::default()),
            EventPublisher::disabled(),
        );
        assert_eq!(service.all_active().await.unwrap().len(), 1);
        assert!(matches!(service.product(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
    }
}
