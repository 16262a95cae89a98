//! Persistence boundary: one trait per table and its PostgreSQL implementation.

mod blog;
mod order;
mod product;
mod shipping;
mod upload;

pub use blog::PgBlogRepository;
pub use order::PgOrderRepository;
pub use product::PgProductRepository;
pub use shipping::PgShippingAddressRepository;
pub use upload::PgUploadRepository;

use crate::domain::aggregates::{
    AddressUpsert, Blog, NewBlog, NewOrder, NewOrderItem, NewProduct, NewUpload, Order, OrderCounts,
    OrderItem, OrderWithLines, Product, ShippingAddress, Upload,
};
use crate::errors::RepositoryError;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type DynProductRepository = Arc<dyn ProductRepository + Send + Sync>;
pub type DynOrderRepository = Arc<dyn OrderRepository + Send + Sync>;
pub type DynShippingAddressRepository = Arc<dyn ShippingAddressRepository + Send + Sync>;
pub type DynUploadRepository = Arc<dyn UploadRepository + Send + Sync>;
pub type DynBlogRepository = Arc<dyn BlogRepository + Send + Sync>;

#[async_trait]
pub trait ProductRepository {
    /// Active products, newest first.
    async fn list_active(&self, limit: Option<i64>) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError>;
    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError>;
}

#[async_trait]
pub trait OrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError>;
    async fn add_item(&self, item: &NewOrderItem) -> Result<OrderItem, RepositoryError>;
    /// Pending orders, newest first, each with its lines and product names.
    async fn list_pending_with_lines(&self) -> Result<Vec<OrderWithLines>, RepositoryError>;
    async fn counts(&self) -> Result<OrderCounts, RepositoryError>;
    /// Sets the status to `completed`. `NotFound` when the id is unknown.
    async fn mark_completed(&self, id: Uuid) -> Result<Order, RepositoryError>;
}

#[async_trait]
pub trait ShippingAddressRepository {
    /// Insert or update the row keyed by `(user_id, address_line1)`.
    async fn upsert(&self, address: &AddressUpsert) -> Result<ShippingAddress, RepositoryError>;
    async fn latest_for_user(&self, user_id: &str) -> Result<Option<ShippingAddress>, RepositoryError>;
}

#[async_trait]
pub trait UploadRepository {
    async fn create(&self, upload: &NewUpload) -> Result<Upload, RepositoryError>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<Upload>, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Upload>, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait BlogRepository {
    /// Published posts, newest first, with the author name joined in.
    async fn list_published(&self) -> Result<Vec<Blog>, RepositoryError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Blog>, RepositoryError>;
    async fn create(&self, blog: &NewBlog) -> Result<Blog, RepositoryError>;
}
