//! Manual checkout with a WhatsApp handoff.
//!
//! The flow is a saga of independently committed writes. A failure stops
//! the remaining steps and leaves earlier writes in place; the returned
//! [`SagaFailure`](crate::saga::SagaFailure) names them.

use crate::auth::AuthUser;
use crate::domain::aggregates::{AddressUpsert, NewOrder, NewOrderItem, ShippingForm};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::short_id;
use crate::errors::ServiceError;
use crate::publisher::EventPublisher;
use crate::repository::{DynOrderRepository, DynProductRepository, DynShippingAddressRepository};
use crate::saga::{Compensation, SagaLog, SagaStep};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;
use uuid::Uuid;

pub const WHATSAPP_BASE: &str = "https://wa.me";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutStep { ValidateForm, UpsertAddress, InsertOrder, InsertOrderItem, BuildHandoff }

impl SagaStep for CheckoutStep {
    fn name(&self) -> &'static str {
        match self {
            Self::ValidateForm => "validate_form",
            Self::UpsertAddress => "upsert_address",
            Self::InsertOrder => "insert_order",
            Self::InsertOrderItem => "insert_order_item",
            Self::BuildHandoff => "build_handoff",
        }
    }

    fn compensation(&self) -> Compensation {
        match self {
            Self::ValidateForm | Self::BuildHandoff => Compensation::Nothing,
            Self::UpsertAddress | Self::InsertOrder | Self::InsertOrderItem => Compensation::Retain,
        }
    }
}

/// The product being bought, as shown on the page the shopper checked out from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutProduct {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CheckoutRequest {
    pub product: CheckoutProduct,
    pub shipping: ShippingForm,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order_id: Uuid,
    pub short_id: String,
    pub whatsapp_url: String,
}

/// How the submitted price compares with the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceCheck {
    Matches,
    Differs { stored: Decimal },
    UnknownProduct,
    LookupFailed,
}

#[derive(Clone)]
pub struct CheckoutService {
    products: DynProductRepository,
    addresses: DynShippingAddressRepository,
    orders: DynOrderRepository,
    publisher: EventPublisher,
    whatsapp_number: String,
}

impl CheckoutService {
    pub fn new(
        products: DynProductRepository,
        addresses: DynShippingAddressRepository,
        orders: DynOrderRepository,
        publisher: EventPublisher,
        whatsapp_number: impl Into<String>,
    ) -> Self {
        Self { products, addresses, orders, publisher, whatsapp_number: whatsapp_number.into() }
    }

    /// Compares the submitted price with the stored one. The order is still
    /// recorded at the submitted price; a mismatch is only logged.
    pub async fn check_price(&self, product: &CheckoutProduct) -> PriceCheck {
        match self.products.find_by_id(product.id).await {
            Ok(Some(stored)) if stored.price == product.price => PriceCheck::Matches,
            Ok(Some(stored)) => {
                warn!(
                    "⚠️ Checkout price for product {} is {} but the catalog says {}",
                    product.id, product.price, stored.price
                );
                PriceCheck::Differs { stored: stored.price }
            }
            Ok(None) => {
                warn!("⚠️ Checkout for product {} which is not in the catalog", product.id);
                PriceCheck::UnknownProduct
            }
            Err(err) => {
                warn!("⚠️ Could not look up product {} to check its price: {}", product.id, err);
                PriceCheck::LookupFailed
            }
        }
    }

    pub async fn place_order(&self, user: Option<&AuthUser>, request: &CheckoutRequest) -> Result<CheckoutReceipt, ServiceError> {
        let user = user.ok_or_else(|| ServiceError::Unauthenticated("Please sign in to place an order".into()))?;
        let product = &request.product;
        let form = &request.shipping;

        let mut saga = SagaLog::begin("checkout");
        saga.run(CheckoutStep::ValidateForm, async { form.check().map_err(ServiceError::Validation) }).await?;
        self.check_price(product).await;

        saga.run(CheckoutStep::UpsertAddress, async {
            self.addresses.upsert(&AddressUpsert::new(&user.id, form.clone())).await.map_err(ServiceError::from)
        })
        .await?;

        let order = saga
            .run(CheckoutStep::InsertOrder, async {
                let order = NewOrder::pending_for_product(&user.id, product.price, form);
                self.orders.create(&order).await.map_err(ServiceError::from)
            })
            .await?;

        saga.run(CheckoutStep::InsertOrderItem, async {
            let item = NewOrderItem { order_id: order.id, product_id: product.id, quantity: 1, price: product.price };
            self.orders.add_item(&item).await.map_err(ServiceError::from)
        })
        .await?;

        let whatsapp_url = saga
            .run(CheckoutStep::BuildHandoff, async {
                whatsapp_link(&self.whatsapp_number, &handoff_message(&order.id, product, form))
            })
            .await?;
        saga.finish();

        self.publisher
            .publish(DomainEvent::Order(OrderEvent::Placed {
                order_id: order.id,
                user_id: order.user_id.clone(),
                total: order.total_amount,
            }))
            .await;

        Ok(CheckoutReceipt { order_id: order.id, short_id: order.short_id(), whatsapp_url })
    }

    /// Prefill for the checkout form: the most recently saved address, with
    /// the session's full name filling in a missing name.
    pub async fn saved_address(&self, user: &AuthUser) -> Result<ShippingForm, ServiceError> {
        let full_name = user.full_name.clone().unwrap_or_default();
        let form = match self.addresses.latest_for_user(&user.id).await? {
            Some(address) => {
                let mut form = address.to_form();
                if form.name.trim().is_empty() {
                    form.name = full_name;
                }
                form
            }
            None => ShippingForm { name: full_name, ..Default::default() },
        };
        Ok(form)
    }
}

pub fn handoff_message(order_id: &Uuid, product: &CheckoutProduct, form: &ShippingForm) -> String {
    format!(
        "Order #{}: I want to buy {} (Amount: ₹{}).\n\nShipping Details:\n{}\n{}\n{}",
        short_id(order_id),
        product.name,
        product.price.normalize(),
        form.name,
        form.phone,
        form.address_summary(),
    )
}

pub fn whatsapp_link(number: &str, message: &str) -> Result<String, ServiceError> {
    let url = Url::parse_with_params(&format!("{WHATSAPP_BASE}/{number}"), &[("text", message)])
        .map_err(|e| ServiceError::InvalidInput(format!("Invalid WhatsApp number {number}: {e}")))?;
    Ok(url.to_string())
}
