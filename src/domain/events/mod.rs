//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
    Blog(BlogEvent),
    Upload(UploadEvent),
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> String {
        let (aggregate, name) = match self {
            Self::Product(ProductEvent::Created { .. }) => ("products", "created"),
            Self::Order(OrderEvent::Placed { .. }) => ("orders", "placed"),
            Self::Order(OrderEvent::Completed { .. }) => ("orders", "completed"),
            Self::Blog(BlogEvent::Published { .. }) => ("blogs", "published"),
            Self::Upload(UploadEvent::Stored { .. }) => ("uploads", "stored"),
            Self::Upload(UploadEvent::Deleted { .. }) => ("uploads", "deleted"),
        };
        format!("storefront.{aggregate}.{name}")
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid, name: String, price: Decimal },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, user_id: String, total: Decimal },
    Completed { order_id: Uuid },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlogEvent {
    Published { blog_id: Uuid, slug: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadEvent {
    Stored { upload_id: Uuid, storage_path: String },
    Deleted { upload_id: Uuid, storage_path: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_subjects() {
        let placed = DomainEvent::Order(OrderEvent::Placed { order_id: Uuid::nil(), user_id: "u".into(), total: Decimal::ONE });
        assert_eq!(placed.subject(), "storefront.orders.placed");
        let json = serde_json::to_value(&placed).unwrap();
        assert_eq!(json["aggregate"], "order");
        assert!(json["event"]["placed"].is_object());
    }
}
