//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::aggregates::shipping::ShippingForm;
use crate::domain::value_objects::{short_id, Money};

/// Lifecycle is one-way: `Pending -> Completed`. There is no cancellation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Completed }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Pending => "pending", Self::Completed => "completed" }
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub status: String,
    pub total_amount: Decimal,
    pub shipping_address: Json<ShippingForm>,
    pub billing_address: Json<ShippingForm>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn status(&self) -> OrderStatus { self.status.parse().unwrap_or_default() }
    pub fn is_pending(&self) -> bool { self.status() == OrderStatus::Pending }
    pub fn short_id(&self) -> String { short_id(&self.id) }
    pub fn total(&self) -> Money { Money::inr(self.total_amount) }

    /// Applies the admin "mark completed" action. Returns `false` when the
    /// order was already completed, which is not an error.
    pub fn complete(&mut self) -> bool {
        let changed = self.status() != OrderStatus::Completed;
        self.status = OrderStatus::Completed.as_str().to_string();
        changed
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Money { Money::inr(self.price).multiply(self.quantity.max(0) as u32) }
}

/// Sum of price x quantity over the items, the value `total_amount` is meant to equal.
pub fn items_total(items: &[OrderItem]) -> Money {
    items.iter().fold(Money::inr(Decimal::ZERO), |acc, i| acc.add(&i.line_total()).unwrap_or(acc))
}

/// Order line as shown on the admin dashboard, joined with the product name.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderLine {
    pub order_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub product_name: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderWithLines {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

#[derive(Clone, Debug)]
pub struct NewOrder {
    pub user_id: String,
    pub total_amount: Decimal,
    pub shipping_address: ShippingForm,
    pub billing_address: ShippingForm,
}

impl NewOrder {
    /// Single-product checkout: total is the product price, billing mirrors shipping.
    pub fn pending_for_product(user_id: impl Into<String>, price: Decimal, form: &ShippingForm) -> Self {
        Self { user_id: user_id.into(), total_amount: price, shipping_address: form.clone(), billing_address: form.clone() }
    }
}

#[derive(Clone, Debug)]
pub struct NewOrderItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrderCounts { pub pending: i64, pub completed: i64 }

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { UnknownStatus(String) }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::UnknownStatus(s) => write!(f, "Unknown order status: {s}") }
    }
}
