//! The shopper's wishlist, kept in a cookie under the store's storage name.
//!
//! Each request opens a [`WishlistStore`] over the cookie's contents, applies
//! one mutation and writes the result back as the new cookie value.

use super::extract::MaybeUser;
use super::templates::{render, Nav, WishlistRow, WishlistTemplate};
use crate::errors::HttpError;
use crate::state::AppState;
use crate::wishlist::{MemoryPersistence, WishlistItem, WishlistStore, STORAGE_NAME};
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;
use url::form_urlencoded;

const WISHLIST_PATH: &str = "/wishlist";
const WISHLIST_FULL_PATH: &str = "/wishlist?full=true";

/// Browsers discard a cookie over 4096 bytes, attributes included.
pub(super) const MAX_COOKIE_BYTES: usize = 4000;

#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    /// Page to return to, e.g. the product page the heart was clicked on.
    #[serde(default)]
    pub return_to: String,
}

pub(super) fn open_wishlist(jar: &CookieJar) -> (WishlistStore, MemoryPersistence) {
    let raw = jar.get(STORAGE_NAME).map(|c| decode_value(c.value())).unwrap_or_default();
    let persistence = MemoryPersistence::from_encoded(&raw);
    (WishlistStore::open(persistence.clone()), persistence)
}

fn wishlist_cookie(store: WishlistStore, persistence: &MemoryPersistence) -> Option<Cookie<'static>> {
    store.close();
    match persistence.encoded() {
        Ok(raw) => {
            let mut cookie = Cookie::new(STORAGE_NAME, encode_value(&raw));
            cookie.set_path("/");
            cookie.set_http_only(true);
            cookie.set_same_site(SameSite::Lax);
            Some(cookie)
        }
        Err(e) => {
            warn!("⚠️ Failed to encode wishlist: {}", e);
            None
        }
    }
}

/// Length of the `Set-Cookie` value as it goes on the wire.
fn wire_len(cookie: &Cookie<'_>) -> usize {
    cookie.encoded().to_string().len()
}

fn save_wishlist(jar: CookieJar, store: WishlistStore, persistence: &MemoryPersistence) -> CookieJar {
    match wishlist_cookie(store, persistence) {
        Some(cookie) => jar.add(cookie),
        None => jar,
    }
}

fn encode_value(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn decode_value(value: &str) -> String {
    form_urlencoded::parse(format!("v={value}").as_bytes())
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// Only same-site paths are followed.
fn return_target(return_to: &str) -> &str {
    if return_to.starts_with('/') && !return_to.starts_with("//") { return_to } else { WISHLIST_PATH }
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowParams {
    #[serde(default)]
    pub full: bool,
}

pub async fn show(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
    Query(params): Query<ShowParams>,
) -> Result<Html<String>, HttpError> {
    let (store, _) = open_wishlist(&jar);
    render(&WishlistTemplate {
        nav: Nav::for_user(user.as_ref(), &state.sign_in_url),
        items: store.items().iter().map(WishlistRow::from).collect(),
        full: params.full,
    })
}

/// An add that would push the cookie past [`MAX_COOKIE_BYTES`] is refused and
/// the stored wishlist is left as it was.
pub async fn add(jar: CookieJar, Form(form): Form<AddForm>) -> (CookieJar, Redirect) {
    let (mut store, persistence) = open_wishlist(&jar);
    let target = return_target(&form.return_to).to_string();
    if store.is_in_wishlist(&form.id) {
        return (jar, Redirect::to(&target));
    }
    let id = form.id.clone();
    store.add_item(WishlistItem {
        id: form.id,
        name: form.name,
        price: form.price,
        image: Some(form.image).filter(|i| !i.is_empty()),
    });
    let count = store.len();
    match wishlist_cookie(store, &persistence) {
        Some(cookie) if wire_len(&cookie) <= MAX_COOKIE_BYTES => (jar.add(cookie), Redirect::to(&target)),
        Some(cookie) => {
            warn!("⚠️ Wishlist full: adding {} would make a {} byte cookie ({} items)", id, wire_len(&cookie), count);
            (jar, Redirect::to(WISHLIST_FULL_PATH))
        }
        None => (jar, Redirect::to(&target)),
    }
}

pub async fn remove(jar: CookieJar, Path(id): Path<String>) -> (CookieJar, Redirect) {
    let (mut store, persistence) = open_wishlist(&jar);
    store.remove_item(&id);
    (save_wishlist(jar, store, &persistence), Redirect::to(WISHLIST_PATH))
}

pub async fn clear(jar: CookieJar) -> (CookieJar, Redirect) {
    let (mut store, persistence) = open_wishlist(&jar);
    store.clear_wishlist();
    (save_wishlist(jar, store, &persistence), Redirect::to(WISHLIST_PATH))
}
