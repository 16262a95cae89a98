use super::OrderRepository;
use crate::domain::aggregates::{NewOrder, NewOrderItem, Order, OrderCounts, OrderItem, OrderLine, OrderStatus, OrderWithLines};
use crate::errors::RepositoryError;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{error, info};
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, user_id, status, total_amount, shipping_address, billing_address, created_at";

#[derive(Clone)]
pub struct PgOrderRepository {
    db: PgPool,
}

impl PgOrderRepository {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let sql = format!(
            "INSERT INTO orders (id, user_id, status, total_amount, shipping_address, billing_address) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ORDER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Order>(&sql)
            .bind(Uuid::now_v7())
            .bind(&order.user_id)
            .bind(OrderStatus::Pending.as_str())
            .bind(order.total_amount)
            .bind(Json(&order.shipping_address))
            .bind(Json(&order.billing_address))
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to create order for user {}: {:?}", order.user_id, err);
                RepositoryError::from(err)
            })?;

        info!("✅ Created order {} for user {} (total {})", created.id, created.user_id, created.total());
        Ok(created)
    }

    async fn add_item(&self, item: &NewOrderItem) -> Result<OrderItem, RepositoryError> {
        let created = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items (id, order_id, product_id, quantity, price) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id, order_id, product_id, quantity, price",
        )
        .bind(Uuid::now_v7())
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to add product {} to order {}: {:?}", item.product_id, item.order_id, err);
            RepositoryError::from(err)
        })?;

        info!("➕ Added product {} x{} to order {}", created.product_id, created.quantity, created.order_id);
        Ok(created)
    }

    async fn list_pending_with_lines(&self) -> Result<Vec<OrderWithLines>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 ORDER BY created_at DESC");
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(OrderStatus::Pending.as_str())
            .fetch_all(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to list pending orders: {:?}", err);
                RepositoryError::from(err)
            })?;

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let lines = sqlx::query_as::<_, OrderLine>(
            "SELECT oi.order_id, oi.quantity, oi.price, p.name AS product_name \
             FROM order_items oi LEFT JOIN products p ON p.id = oi.product_id \
             WHERE oi.order_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to load lines for {} pending orders: {:?}", ids.len(), err);
            RepositoryError::from(err)
        })?;

        let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for line in lines {
            by_order.entry(line.order_id).or_default().push(line);
        }
        Ok(orders
            .into_iter()
            .map(|order| {
                let lines = by_order.remove(&order.id).unwrap_or_default();
                OrderWithLines { order, lines }
            })
            .collect())
    }

    async fn counts(&self) -> Result<OrderCounts, RepositoryError> {
        let (pending, completed) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*) FILTER (WHERE status = 'pending'), COUNT(*) FILTER (WHERE status = 'completed') FROM orders",
        )
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to count orders: {:?}", err);
            RepositoryError::from(err)
        })?;
        Ok(OrderCounts { pending, completed })
    }

    async fn mark_completed(&self, id: Uuid) -> Result<Order, RepositoryError> {
        let sql = format!("UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}");
        let updated = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(OrderStatus::Completed.as_str())
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to complete order {}: {:?}", id, err);
                RepositoryError::from(err)
            })?
            .ok_or(RepositoryError::NotFound)?;

        info!("🔄 Order {} marked completed", updated.id);
        Ok(updated)
    }
}
