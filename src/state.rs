use crate::ai::DynTextGenerator;
use crate::auth::SessionVerifier;
use crate::publisher::EventPublisher;
use crate::repository::{
    DynBlogRepository, DynOrderRepository, DynProductRepository, DynShippingAddressRepository, DynUploadRepository,
    PgBlogRepository, PgOrderRepository, PgProductRepository, PgShippingAddressRepository, PgUploadRepository,
};
use crate::services::{BlogService, CatalogService, CheckoutService, MediaService, OrderService};
use crate::storage::DynObjectStorage;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct Repositories {
    pub products: DynProductRepository,
    pub orders: DynOrderRepository,
    pub addresses: DynShippingAddressRepository,
    pub uploads: DynUploadRepository,
    pub blogs: DynBlogRepository,
}

impl Repositories {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            products: Arc::new(PgProductRepository::new(db.clone())),
            orders: Arc::new(PgOrderRepository::new(db.clone())),
            addresses: Arc::new(PgShippingAddressRepository::new(db.clone())),
            uploads: Arc::new(PgUploadRepository::new(db.clone())),
            blogs: Arc::new(PgBlogRepository::new(db)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub checkout: CheckoutService,
    pub orders: OrderService,
    pub media: MediaService,
    pub blogs: BlogService,
    pub generator: DynTextGenerator,
    pub sessions: SessionVerifier,
    pub sign_in_url: String,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        storage: DynObjectStorage,
        generator: DynTextGenerator,
        publisher: EventPublisher,
        sessions: SessionVerifier,
        sign_in_url: impl Into<String>,
        whatsapp_number: impl Into<String>,
    ) -> Self {
        Self {
            catalog: CatalogService::new(repos.products.clone(), repos.uploads.clone(), storage.clone(), publisher.clone()),
            checkout: CheckoutService::new(
                repos.products,
                repos.addresses,
                repos.orders.clone(),
                publisher.clone(),
                whatsapp_number,
            ),
            orders: OrderService::new(repos.orders, publisher.clone()),
            media: MediaService::new(repos.uploads, storage.clone(), publisher.clone()),
            blogs: BlogService::new(repos.blogs, storage, publisher),
            generator,
            sessions,
            sign_in_url: sign_in_url.into(),
        }
    }
}
