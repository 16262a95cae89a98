use super::extract::MaybeUser;
use super::templates::{
    render, BlogCard, BlogListTemplate, BlogPostTemplate, HomeTemplate, Nav, NotFoundTemplate, ProductCard,
    ProductTemplate, StoreTemplate,
};
use super::wishlist::open_wishlist;
use crate::errors::{HttpError, ServiceError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

/// Products on the home page.
pub const FEATURED_COUNT: i64 = 4;

pub async fn home(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Result<Html<String>, HttpError> {
    let products = state.catalog.newest(FEATURED_COUNT).await?;
    render(&HomeTemplate { nav: Nav::for_user(user.as_ref(), &state.sign_in_url), products: products.iter().map(ProductCard::from).collect() })
}

pub async fn store(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Result<Html<String>, HttpError> {
    let products = state.catalog.all_active().await?;
    render(&StoreTemplate { nav: Nav::for_user(user.as_ref(), &state.sign_in_url), products: products.iter().map(ProductCard::from).collect() })
}

pub async fn product(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    let nav = Nav::for_user(user.as_ref(), &state.sign_in_url);
    let Ok(id) = Uuid::parse_str(&id) else {
        return not_found(nav, "Product not found");
    };
    match state.catalog.product(id).await {
        Ok(product) => {
            let (wishlist, _) = open_wishlist(&jar);
            let wishlisted = wishlist.is_in_wishlist(&product.id.to_string());
            Ok(render(&ProductTemplate::new(nav, &product, wishlisted))?.into_response())
        }
        Err(ServiceError::NotFound(message)) => not_found(nav, &message),
        Err(e) => Err(e.into()),
    }
}

pub async fn blog_list(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Result<Html<String>, HttpError> {
    let posts = state.blogs.published().await?;
    render(&BlogListTemplate { nav: Nav::for_user(user.as_ref(), &state.sign_in_url), posts: posts.iter().map(BlogCard::from).collect() })
}

pub async fn blog_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(slug): Path<String>,
) -> Result<Response, HttpError> {
    let nav = Nav::for_user(user.as_ref(), &state.sign_in_url);
    match state.blogs.by_slug(&slug).await {
        Ok(blog) => Ok(render(&BlogPostTemplate::new(nav, &blog))?.into_response()),
        Err(ServiceError::NotFound(message)) => not_found(nav, &message),
        Err(e) => Err(e.into()),
    }
}

fn not_found(nav: Nav, message: &str) -> Result<Response, HttpError> {
    let page = render(&NotFoundTemplate { nav, message: message.to_string() })?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}
