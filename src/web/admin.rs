//! Back office: orders dashboard, product and blog forms, media gallery.

use super::templates::{
    render, BlogFormTemplate, DashboardTemplate, MediaCard, MediaTemplate, OrderCard, ProductFormTemplate, SlotView,
};
use crate::auth::AuthUser;
use crate::domain::aggregates::{NewBlog, NewProduct, PendingFile};
use crate::errors::{HttpError, RepositoryError, ServiceError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, HttpError> {
    let dashboard = state.orders.dashboard().await?;
    render(&DashboardTemplate {
        pending_count: dashboard.counts.pending,
        completed_count: dashboard.counts.completed,
        orders: dashboard.pending.iter().map(OrderCard::from).collect(),
    })
}

pub async fn complete_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect, HttpError> {
    state.orders.complete(id).await?;
    Ok(Redirect::to("/admin"))
}

/// Text fields and files of a multipart form.
#[derive(Default)]
struct FormParts {
    fields: HashMap<String, String>,
    files: Vec<(String, PendingFile)>,
}

impl FormParts {
    fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or_default()
    }

    fn optional(&self, name: &str) -> Option<String> {
        Some(self.text(name)).filter(|v| !v.is_empty()).map(str::to_string)
    }

    /// Comma-separated list field, e.g. `S, M, L`.
    fn list(&self, name: &str) -> Vec<String> {
        self.text(name).split(',').map(str::trim).filter(|v| !v.is_empty()).map(str::to_string).collect()
    }

    fn take_files(&mut self, name: &str) -> Vec<PendingFile> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files).into_iter().partition(|(field, _)| field == name);
        self.files = rest;
        matching.into_iter().map(|(_, file)| file).collect()
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormParts, HttpError> {
    let mut parts = FormParts::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| HttpError::BadRequest(e.body_text()))? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| HttpError::BadRequest(e.body_text()))?;
                // An empty file input still submits a nameless part.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                parts.files.push((name, PendingFile::new(file_name, content_type, bytes.to_vec())));
            }
            None => {
                let value = field.text().await.map_err(|e| HttpError::BadRequest(e.body_text()))?;
                parts.fields.insert(name, value);
            }
        }
    }
    Ok(parts)
}

pub async fn new_product_form() -> Result<Html<String>, HttpError> {
    render(&ProductFormTemplate::default())
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Response, HttpError> {
    let mut form = read_multipart(multipart).await?;
    let price = Decimal::from_str(form.text("price")).unwrap_or(Decimal::ZERO);
    let stock = match form.optional("stock") {
        Some(raw) => match raw.parse::<i32>() {
            Ok(stock) => Some(stock),
            Err(_) => return form_error("Stock must be a whole number"),
        },
        None => None,
    };

    let product = NewProduct {
        name: form.text("name").to_string(),
        price,
        description: form.optional("description"),
        category: form.optional("category"),
        stock,
        sizes: form.list("sizes"),
        colors: form.list("colors"),
        material: form.optional("material"),
        care_instructions: form.optional("care_instructions"),
        images: vec![],
    };
    let files = form.take_files("images");

    match state.catalog.create_product(&user, product, files).await {
        Ok(created) => {
            info!("🛍️ {} added product {}", user.id, created.product.id);
            let page = ProductFormTemplate {
                error: String::new(),
                created: created.product.name.clone(),
                slots: created.slots.iter().map(SlotView::from).collect(),
            };
            Ok((StatusCode::CREATED, render(&page)?).into_response())
        }
        Err(ServiceError::InvalidInput(message)) => form_error(&message),
        Err(e) => Err(e.into()),
    }
}

fn form_error(message: &str) -> Result<Response, HttpError> {
    let page = ProductFormTemplate { error: message.to_string(), ..Default::default() };
    Ok((StatusCode::BAD_REQUEST, render(&page)?).into_response())
}

pub async fn media_gallery(State(state): State<AppState>) -> Result<Html<String>, HttpError> {
    let items = state.media.gallery().await?;
    render(&MediaTemplate { items: items.iter().map(MediaCard::from).collect() })
}

pub async fn delete_media(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Redirect, HttpError> {
    state.media.delete(id).await?;
    Ok(Redirect::to("/admin/media"))
}

pub async fn new_blog_form() -> Result<Html<String>, HttpError> {
    render(&BlogFormTemplate::default())
}

pub async fn create_blog(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Response, HttpError> {
    let mut form = read_multipart(multipart).await?;
    let image = form.take_files("image").into_iter().next();
    let mut page = BlogFormTemplate {
        title: form.text("title").to_string(),
        slug: form.text("slug").to_string(),
        content: form.fields.get("content").cloned().unwrap_or_default(),
        excerpt: form.text("excerpt").to_string(),
        ..Default::default()
    };

    let post = match NewBlog::new(&page.title, &page.slug, &page.content, &page.excerpt) {
        Ok(post) => post,
        Err(e) => {
            page.error = e.to_string();
            return Ok((StatusCode::BAD_REQUEST, render(&page)?).into_response());
        }
    };

    match state.blogs.publish(&user, post, image).await {
        Ok(blog) => Ok(Redirect::to(&format!("/blog/{}", blog.slug)).into_response()),
        Err(ServiceError::Repo(RepositoryError::Conflict(message))) => {
            page.error = message;
            Ok((StatusCode::CONFLICT, render(&page)?).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
