//! Admin view of orders.

use crate::domain::aggregates::{OrderCounts, OrderStatus, OrderWithLines};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::errors::{RepositoryError, ServiceError};
use crate::publisher::EventPublisher;
use crate::repository::DynOrderRepository;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    pub pending: Vec<OrderWithLines>,
    pub counts: OrderCounts,
}

#[derive(Clone)]
pub struct OrderService {
    orders: DynOrderRepository,
    publisher: EventPublisher,
}

impl OrderService {
    pub fn new(orders: DynOrderRepository, publisher: EventPublisher) -> Self { Self { orders, publisher } }

    pub async fn dashboard(&self) -> Result<Dashboard, ServiceError> {
        let (pending, counts) = tokio::try_join!(self.orders.list_pending_with_lines(), self.orders.counts())?;
        Ok(Dashboard { pending, counts })
    }

    /// One-way and idempotent: completing a completed order is a no-op.
    pub async fn complete(&self, id: Uuid) -> Result<OrderStatus, ServiceError> {
        let order = match self.orders.mark_completed(id).await {
            Ok(order) => order,
            Err(RepositoryError::NotFound) => return Err(ServiceError::NotFound("Order not found".into())),
            Err(e) => return Err(e.into()),
        };
        self.publisher.publish(DomainEvent::Order(OrderEvent::Completed { order_id: order.id })).await;
        Ok(order.status())
    }
}
