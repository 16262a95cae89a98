//! Page templates and the flattened views they render.

use crate::auth::AuthUser;
use crate::domain::aggregates::{Blog, OrderWithLines, Product};
use crate::domain::value_objects::Money;
use crate::errors::HttpError;
use crate::services::{MediaItem, SlotReport, UploadSlot};
use crate::wishlist::WishlistItem;
use askama::Template;
use axum::response::Html;
use tracing::error;

pub fn render<T: Template>(template: &T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|e| {
        error!("❌ Failed to render template: {}", e);
        HttpError::Internal("Failed to render page".into())
    })
}

pub struct Nav {
    pub signed_in: bool,
    pub is_admin: bool,
    pub sign_in_url: String,
}

impl Nav {
    pub fn for_user(user: Option<&AuthUser>, sign_in_url: &str) -> Self {
        Self {
            signed_in: user.is_some(),
            is_admin: user.is_some_and(AuthUser::is_admin),
            sign_in_url: sign_in_url.to_string(),
        }
    }
}

pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: String,
    pub category: String,
}

impl From<&Product> for ProductCard {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            price: p.price().to_string(),
            image: p.thumbnail().unwrap_or_default().to_string(),
            category: p.category.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub products: Vec<ProductCard>,
}

#[derive(Template)]
#[template(path = "store.html")]
pub struct StoreTemplate {
    pub nav: Nav,
    pub products: Vec<ProductCard>,
}

#[derive(Template)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub nav: Nav,
    pub id: String,
    pub name: String,
    pub price: String,
    pub price_value: String,
    pub thumbnail: String,
    pub description: String,
    pub category: String,
    pub gallery: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub material: String,
    pub care_instructions: String,
    pub stock_notice: String,
    pub wishlisted: bool,
}

impl ProductTemplate {
    pub fn new(nav: Nav, p: &Product, wishlisted: bool) -> Self {
        let stock_notice = match p.stock {
            Some(0) => "Out of stock".to_string(),
            Some(n) if p.is_low_stock() => format!("Only {n} left"),
            _ => String::new(),
        };
        Self {
            nav,
            id: p.id.to_string(),
            name: p.name.clone(),
            price: p.price().to_string(),
            price_value: p.price.normalize().to_string(),
            thumbnail: p.thumbnail().unwrap_or_default().to_string(),
            description: p.description.clone().unwrap_or_default(),
            category: p.category.clone().unwrap_or_default(),
            gallery: p.gallery(),
            sizes: p.sizes.clone(),
            colors: p.colors.clone(),
            material: p.material.clone().unwrap_or_default(),
            care_instructions: p.care_instructions.clone().unwrap_or_default(),
            stock_notice,
            wishlisted,
        }
    }
}

pub struct BlogCard {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub published_on: String,
    pub image: String,
}

fn author_of(blog: &Blog) -> String {
    blog.author_name.clone().unwrap_or_else(|| "ENTITIES".to_string())
}

impl From<&Blog> for BlogCard {
    fn from(b: &Blog) -> Self {
        Self {
            slug: b.slug.clone(),
            title: b.title.clone(),
            excerpt: b.excerpt_or_default().to_string(),
            author: author_of(b),
            published_on: b.created_at.format("%B %-d, %Y").to_string(),
            image: b.featured_image_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "blog_list.html")]
pub struct BlogListTemplate {
    pub nav: Nav,
    pub posts: Vec<BlogCard>,
}

#[derive(Template)]
#[template(path = "blog_post.html")]
pub struct BlogPostTemplate {
    pub nav: Nav,
    pub title: String,
    pub author: String,
    pub published_on: String,
    pub image: String,
    pub content: String,
}

impl BlogPostTemplate {
    pub fn new(nav: Nav, b: &Blog) -> Self {
        Self {
            nav,
            title: b.title.clone(),
            author: author_of(b),
            published_on: b.created_at.format("%B %-d, %Y").to_string(),
            image: b.featured_image_url.clone().unwrap_or_default(),
            content: b.content.clone(),
        }
    }
}

pub struct WishlistRow {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: String,
}

impl From<&WishlistItem> for WishlistRow {
    fn from(item: &WishlistItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: Money::inr(item.price).to_string(),
            image: item.image.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "wishlist.html")]
pub struct WishlistTemplate {
    pub nav: Nav,
    pub items: Vec<WishlistRow>,
    /// Set after an add was refused for size.
    pub full: bool,
}

pub struct LineView {
    pub name: String,
    pub quantity: i32,
    pub price: String,
}

pub struct OrderCard {
    pub id: String,
    pub short_id: String,
    pub placed_at: String,
    pub customer: String,
    pub phone: String,
    pub address: String,
    pub total: String,
    pub lines: Vec<LineView>,
}

impl From<&OrderWithLines> for OrderCard {
    fn from(o: &OrderWithLines) -> Self {
        let shipping = &o.order.shipping_address.0;
        Self {
            id: o.order.id.to_string(),
            short_id: o.order.short_id(),
            placed_at: o.order.created_at.format("%b %-d, %Y %H:%M").to_string(),
            customer: shipping.name.clone(),
            phone: shipping.phone.clone(),
            address: shipping.address_summary(),
            total: o.order.total().to_string(),
            lines: o
                .lines
                .iter()
                .map(|l| LineView {
                    name: l.product_name.clone().unwrap_or_else(|| "Unknown product".to_string()),
                    quantity: l.quantity,
                    price: Money::inr(l.price).to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub pending_count: i64,
    pub completed_count: i64,
    pub orders: Vec<OrderCard>,
}

pub struct SlotView {
    pub file_name: String,
    pub state: &'static str,
    pub detail: String,
}

impl From<&SlotReport> for SlotView {
    fn from(s: &SlotReport) -> Self {
        let (state, detail) = match &s.state {
            UploadSlot::Uploading => ("uploading", String::new()),
            UploadSlot::Uploaded { url } => ("uploaded", url.clone()),
            UploadSlot::Failed { reason } => ("failed", reason.clone()),
        };
        Self { file_name: s.file_name.clone(), state, detail }
    }
}

#[derive(Template, Default)]
#[template(path = "admin/product_new.html")]
pub struct ProductFormTemplate {
    pub error: String,
    pub created: String,
    pub slots: Vec<SlotView>,
}

pub struct MediaCard {
    pub id: String,
    pub url: String,
    pub file_name: String,
}

impl From<&MediaItem> for MediaCard {
    fn from(m: &MediaItem) -> Self {
        Self { id: m.upload.id.to_string(), url: m.public_url.clone(), file_name: m.upload.file_name.clone() }
    }
}

#[derive(Template)]
#[template(path = "admin/media.html")]
pub struct MediaTemplate {
    pub items: Vec<MediaCard>,
}

#[derive(Template, Default)]
#[template(path = "admin/blog_new.html")]
pub struct BlogFormTemplate {
    pub error: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub nav: Nav,
    pub message: String,
}
