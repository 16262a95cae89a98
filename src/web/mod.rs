//! HTTP surface: storefront pages, the cookie wishlist, JSON APIs and the
//! admin back office.

mod admin;
mod api;
mod extract;
mod middleware;
mod pages;
mod templates;
mod wishlist;

pub use extract::{MaybeUser, ValidatedJson};
pub use middleware::require_admin;

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Multipart forms carry product images.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/orders/:id/complete", post(admin::complete_order))
        .route("/admin/products/new", get(admin::new_product_form).post(admin::create_product))
        .route("/admin/media", get(admin::media_gallery))
        .route("/admin/media/:id/delete", post(admin::delete_media))
        .route("/admin/blog/new", get(admin::new_blog_form).post(admin::create_blog))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "entities-storefront"})) }))
        .route("/", get(pages::home))
        .route("/store", get(pages::store))
        .route("/product/:id", get(pages::product))
        .route("/blog", get(pages::blog_list))
        .route("/blog/:slug", get(pages::blog_post))
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/items", post(wishlist::add))
        .route("/wishlist/items/:id/delete", post(wishlist::remove))
        .route("/wishlist/clear", post(wishlist::clear))
        .route("/api/checkout", post(api::checkout))
        .route("/api/checkout/address", get(api::saved_address))
        .route("/api/chat", post(api::chat))
        .route("/api/blog/generate", post(api::generate_blog))
        .merge(admin)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
