//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::value_objects::Money;

/// Products at or below this stock level show a "only N left" notice.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub is_active: bool,
    pub stock: Option<i32>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub material: Option<String>,
    pub care_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn price(&self) -> Money { Money::inr(self.price) }

    /// All images in display order; falls back to the single thumbnail column.
    pub fn gallery(&self) -> Vec<String> {
        if !self.images.is_empty() { return self.images.clone(); }
        self.image_url.iter().cloned().collect()
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().or(self.image_url.as_ref()).map(String::as_str)
    }

    pub fn is_low_stock(&self) -> bool {
        matches!(self.stock, Some(stock) if stock <= LOW_STOCK_THRESHOLD)
    }
}

/// Admin input for a new product, validated before any upload happens.
#[derive(Clone, Debug, Default)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub material: Option<String>,
    pub care_instructions: Option<String>,
    pub images: Vec<String>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: Decimal) -> Result<Self, ProductError> {
        let product = Self { name: name.into().trim().to_string(), price, ..Default::default() };
        product.validate()?;
        Ok(product)
    }

    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() { return Err(ProductError::MissingName); }
        if self.price <= Decimal::ZERO { return Err(ProductError::InvalidPrice); }
        if matches!(self.stock, Some(stock) if stock < 0) { return Err(ProductError::InvalidStock); }
        Ok(())
    }

    /// First uploaded image doubles as the thumbnail.
    pub fn thumbnail(&self) -> Option<&str> { self.images.first().map(String::as_str) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { MissingName, InvalidPrice, InvalidStock }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName | Self::InvalidPrice => write!(f, "Name and price are required"),
            Self::InvalidStock => write!(f, "Stock cannot be negative"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(images: Vec<&str>, image_url: Option<&str>) -> Product {
        Product {
            id: Uuid::new_v4(), name: "Classic Hoodie".into(), price: Decimal::new(1999, 0),
            description: None, category: Some("Hoodies".into()), image_url: image_url.map(Into::into),
            images: images.into_iter().map(Into::into).collect(), is_active: true, stock: Some(3),
            sizes: vec![], colors: vec![], material: None, care_instructions: None, created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_product_requires_name_and_price() {
        assert_eq!(NewProduct::new("  ", Decimal::ONE).unwrap_err(), ProductError::MissingName);
        assert_eq!(NewProduct::new("Hoodie", Decimal::ZERO).unwrap_err(), ProductError::InvalidPrice);
        assert_eq!(NewProduct::new(" Hoodie ", Decimal::new(1999, 0)).unwrap().name, "Hoodie");
    }

    #[test]
    fn test_gallery_falls_back_to_thumbnail() {
        assert_eq!(product(vec![], Some("a.png")).gallery(), vec!["a.png".to_string()]);
        assert_eq!(product(vec!["b.png", "c.png"], Some("a.png")).thumbnail(), Some("b.png"));
        assert!(product(vec![], None).gallery().is_empty());
    }

    #[test]
    fn test_low_stock() {
        assert!(product(vec![], None).is_low_stock());
    }
}
