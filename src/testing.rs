//! In-memory fakes of the persistence, storage and generation boundaries.

use crate::ai::{GenerationError, TextGenerator, TextStream, Transcript};
use crate::domain::aggregates::{
    AddressUpsert, Blog, NewBlog, NewOrder, NewOrderItem, NewProduct, NewUpload, Order, OrderCounts, OrderItem,
    OrderLine, OrderStatus, OrderWithLines, Product, ShippingAddress, Upload,
};
use crate::errors::RepositoryError;
use crate::repository::{BlogRepository, OrderRepository, ProductRepository, ShippingAddressRepository, UploadRepository};
use crate::storage::{ObjectStorage, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use sqlx::types::Json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub fn hoodie() -> Product {
    Product {
        id: Uuid::new_v4(),
        name: "Classic Hoodie".into(),
        price: Decimal::new(1999, 0),
        description: Some("Heavyweight fleece".into()),
        category: Some("Hoodies".into()),
        image_url: None,
        images: vec![],
        is_active: true,
        stock: Some(10),
        sizes: vec!["M".into(), "L".into()],
        colors: vec!["Black".into()],
        material: None,
        care_instructions: None,
        created_at: Utc::now(),
    }
}

#[derive(Default)]
pub struct FakeProducts {
    pub rows: Mutex<Vec<Product>>,
}

impl FakeProducts {
    pub fn with(products: Vec<Product>) -> Arc<Self> { Arc::new(Self { rows: Mutex::new(products) }) }
}

#[async_trait]
impl ProductRepository for FakeProducts {
    async fn list_active(&self, limit: Option<i64>) -> Result<Vec<Product>, RepositoryError> {
        let mut rows: Vec<Product> = self.rows.lock().unwrap().iter().filter(|p| p.is_active).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let created = Product {
            id: Uuid::new_v4(),
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            category: product.category.clone(),
            image_url: product.thumbnail().map(str::to_string),
            images: product.images.clone(),
            is_active: true,
            stock: product.stock,
            sizes: product.sizes.clone(),
            colors: product.colors.clone(),
            material: product.material.clone(),
            care_instructions: product.care_instructions.clone(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }
}

#[derive(Default)]
pub struct FakeOrders {
    pub orders: Mutex<Vec<Order>>,
    pub items: Mutex<Vec<OrderItem>>,
    pub fail_items: AtomicBool,
    pub product_names: Mutex<BTreeMap<Uuid, String>>,
}

impl FakeOrders {
    pub fn fail_item_inserts(&self) { self.fail_items.store(true, Ordering::SeqCst); }
    pub fn order_count(&self) -> usize { self.orders.lock().unwrap().len() }
    pub fn item_count(&self) -> usize { self.items.lock().unwrap().len() }
}

#[async_trait]
impl OrderRepository for FakeOrders {
    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let created = Order {
            id: Uuid::new_v4(),
            user_id: order.user_id.clone(),
            status: OrderStatus::Pending.as_str().to_string(),
            total_amount: order.total_amount,
            shipping_address: Json(order.shipping_address.clone()),
            billing_address: Json(order.billing_address.clone()),
            created_at: Utc::now(),
        };
        self.orders.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn add_item(&self, item: &NewOrderItem) -> Result<OrderItem, RepositoryError> {
        if self.fail_items.load(Ordering::SeqCst) {
            return Err(RepositoryError::ForeignKey("order_items_product_id_fkey".into()));
        }
        let created = OrderItem {
            id: Uuid::new_v4(),
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
        };
        self.items.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list_pending_with_lines(&self) -> Result<Vec<OrderWithLines>, RepositoryError> {
        let names = self.product_names.lock().unwrap().clone();
        let items = self.items.lock().unwrap().clone();
        let mut pending: Vec<Order> = self.orders.lock().unwrap().iter().filter(|o| o.is_pending()).cloned().collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending
            .into_iter()
            .map(|order| {
                let lines = items
                    .iter()
                    .filter(|i| i.order_id == order.id)
                    .map(|i| OrderLine {
                        order_id: i.order_id,
                        quantity: i.quantity,
                        price: i.price,
                        product_name: names.get(&i.product_id).cloned(),
                    })
                    .collect();
                OrderWithLines { order, lines }
            })
            .collect())
    }

    async fn counts(&self) -> Result<OrderCounts, RepositoryError> {
        let orders = self.orders.lock().unwrap();
        let pending = orders.iter().filter(|o| o.is_pending()).count() as i64;
        Ok(OrderCounts { pending, completed: orders.len() as i64 - pending })
    }

    async fn mark_completed(&self, id: Uuid) -> Result<Order, RepositoryError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders.iter_mut().find(|o| o.id == id).ok_or(RepositoryError::NotFound)?;
        order.complete();
        Ok(order.clone())
    }
}

#[derive(Default)]
pub struct FakeAddresses {
    pub rows: Mutex<Vec<ShippingAddress>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl ShippingAddressRepository for FakeAddresses {
    async fn upsert(&self, address: &AddressUpsert) -> Result<ShippingAddress, RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        let form = &address.form;
        let row = ShippingAddress {
            id: Uuid::new_v4(),
            user_id: address.user_id.clone(),
            name: form.name.clone(),
            phone: form.phone.clone(),
            address_line1: form.address_line1.clone(),
            city: form.city.clone(),
            state: form.state.clone(),
            postal_code: form.postal_code.clone(),
            country: address.country.clone(),
            created_at: Utc::now(),
        };
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.user_id == row.user_id && r.address_line1 == row.address_line1) {
            Some(existing) => {
                let id = existing.id;
                *existing = ShippingAddress { id, ..row };
                Ok(existing.clone())
            }
            None => {
                rows.push(row.clone());
                Ok(row)
            }
        }
    }

    async fn latest_for_user(&self, user_id: &str) -> Result<Option<ShippingAddress>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().filter(|r| r.user_id == user_id).max_by_key(|r| r.created_at).cloned())
    }
}

#[derive(Default)]
pub struct FakeUploads {
    pub rows: Mutex<Vec<Upload>>,
    pub fail_delete: AtomicBool,
}

impl FakeUploads {
    pub fn seed(&self, storage_path: &str) -> Upload {
        let upload = Upload {
            id: Uuid::new_v4(),
            user_id: Some("admin_1".into()),
            file_name: storage_path.rsplit('-').next().unwrap_or(storage_path).to_string(),
            file_size: 3,
            file_type: Some("image/png".into()),
            storage_path: storage_path.into(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(upload.clone());
        upload
    }

    pub fn len(&self) -> usize { self.rows.lock().unwrap().len() }
}

#[async_trait]
impl UploadRepository for FakeUploads {
    async fn create(&self, upload: &NewUpload) -> Result<Upload, RepositoryError> {
        let created = Upload {
            id: Uuid::new_v4(),
            user_id: upload.user_id.clone(),
            file_name: upload.file_name.clone(),
            file_size: upload.file_size,
            file_type: upload.file_type.clone(),
            storage_path: upload.storage_path.clone(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Upload>, RepositoryError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Upload>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(RepositoryError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|u| u.id != id);
        if rows.len() == before { Err(RepositoryError::NotFound) } else { Ok(()) }
    }
}

#[derive(Default)]
pub struct FakeBlogs {
    pub rows: Mutex<Vec<Blog>>,
}

#[async_trait]
impl BlogRepository for FakeBlogs {
    async fn list_published(&self) -> Result<Vec<Blog>, RepositoryError> {
        let mut rows: Vec<Blog> = self.rows.lock().unwrap().iter().filter(|b| b.is_published).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Blog>, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().find(|b| b.slug == slug && b.is_published).cloned())
    }

    async fn create(&self, blog: &NewBlog) -> Result<Blog, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|b| b.slug == blog.slug.as_str()) {
            return Err(RepositoryError::Conflict("blogs_slug_key".into()));
        }
        let created = Blog {
            id: Uuid::new_v4(),
            title: blog.title.clone(),
            slug: blog.slug.to_string(),
            content: blog.content.clone(),
            excerpt: blog.excerpt.clone(),
            featured_image_url: blog.featured_image_url.clone(),
            author_id: blog.author_id.clone(),
            author_name: None,
            is_published: true,
            created_at: Utc::now(),
        };
        rows.push(created.clone());
        Ok(created)
    }
}

/// Bucket keyed by object path. Uploads whose path contains one of
/// `reject` fail with an upstream error.
#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<BTreeMap<String, Vec<u8>>>,
    pub reject: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn reject_names_containing(&self, needle: &str) { self.reject.lock().unwrap().push(needle.into()); }
    pub fn contains(&self, path: &str) -> bool { self.objects.lock().unwrap().contains_key(path) }
    pub fn paths(&self) -> Vec<String> { self.objects.lock().unwrap().keys().cloned().collect() }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: Option<&str>) -> Result<String, StorageError> {
        if self.reject.lock().unwrap().iter().any(|needle| path.contains(needle.as_str())) {
            return Err(StorageError::Upstream { status: 413, message: "Payload too large".into() });
        }
        self.objects.lock().unwrap().insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://cdn.test/storage/v1/object/public/uploads/{path}")
    }

    async fn remove(&self, paths: &[String]) -> Result<Vec<String>, StorageError> {
        let mut objects = self.objects.lock().unwrap();
        Ok(paths.iter().filter(|p| objects.remove(p.as_str()).is_some()).cloned().collect())
    }
}

/// Replies with fixed chunks and a fixed JSON object.
pub struct FakeGenerator {
    pub chunks: Vec<String>,
    pub object: serde_json::Value,
    pub fail: bool,
}

impl FakeGenerator {
    pub fn replying(chunks: &[&str], object: serde_json::Value) -> Arc<Self> {
        Arc::new(Self { chunks: chunks.iter().map(|c| c.to_string()).collect(), object, fail: false })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { chunks: vec![], object: serde_json::Value::Null, fail: true })
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn stream_chat(&self, _system: &str, transcript: &Transcript) -> Result<TextStream, GenerationError> {
        transcript.ensure_awaiting_reply()?;
        if self.fail {
            return Err(GenerationError::Upstream { status: 503, message: "overloaded".into() });
        }
        Ok(stream::iter(self.chunks.clone().into_iter().map(Ok)).boxed())
    }

    async fn generate_json(&self, _prompt: &str, _schema: &serde_json::Value) -> Result<serde_json::Value, GenerationError> {
        if self.fail {
            return Err(GenerationError::Upstream { status: 503, message: "overloaded".into() });
        }
        Ok(self.object.clone())
    }
}
