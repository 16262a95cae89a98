//! Wishlist Store
//!
//! A deduplicated set of liked products that lives on the shopper's device.
//! The store is injected with a [`WishlistPersistence`] hook: it loads once on
//! open, writes through after every mutation and flushes again on close.

mod persistence;

pub use persistence::{JsonFilePersistence, MemoryPersistence, WishlistPersistence, STORAGE_NAME};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Error, Debug)]
pub enum WishlistError {
    #[error("Wishlist storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Wishlist storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub struct WishlistStore {
    items: Vec<WishlistItem>,
    index: HashMap<String, usize>,
    persistence: Box<dyn WishlistPersistence + Send>,
}

impl WishlistStore {
    /// Load hook. Unreadable storage starts an empty wishlist.
    pub fn open(persistence: impl WishlistPersistence + Send + 'static) -> Self {
        let loaded = persistence.load().unwrap_or_else(|e| {
            warn!("⚠️ Could not load wishlist, starting empty: {}", e);
            Vec::new()
        });
        let mut store = Self { items: Vec::new(), index: HashMap::new(), persistence: Box::new(persistence) };
        for item in loaded {
            store.insert(item);
        }
        store
    }

    pub fn items(&self) -> &[WishlistItem] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Inserts unless an item with the same id is already present.
    pub fn add_item(&mut self, item: WishlistItem) {
        if self.insert(item) {
            self.persist();
        }
    }

    pub fn remove_item(&mut self, id: &str) {
        if self.index.remove(id).is_some() {
            self.items.retain(|i| i.id != id);
            self.reindex();
            self.persist();
        }
    }

    pub fn is_in_wishlist(&self, id: &str) -> bool { self.index.contains_key(id) }

    pub fn clear_wishlist(&mut self) {
        self.items.clear();
        self.index.clear();
        self.persist();
    }

    /// Save hook for process shutdown.
    pub fn close(self) {
        self.persist();
    }

    fn insert(&mut self, item: WishlistItem) -> bool {
        if self.index.contains_key(&item.id) { return false; }
        self.index.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        true
    }

    fn reindex(&mut self) {
        self.index = self.items.iter().enumerate().map(|(pos, i)| (i.id.clone(), pos)).collect();
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.items) {
            warn!("⚠️ Failed to persist wishlist ({} items): {}", self.items.len(), e);
        }
    }
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore").field("items", &self.items).finish()
    }
}
