use super::ShippingAddressRepository;
use crate::domain::aggregates::{AddressUpsert, ShippingAddress};
use crate::errors::RepositoryError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgShippingAddressRepository {
    db: PgPool,
}

impl PgShippingAddressRepository {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl ShippingAddressRepository for PgShippingAddressRepository {
    async fn upsert(&self, address: &AddressUpsert) -> Result<ShippingAddress, RepositoryError> {
        let form = &address.form;
        let saved = sqlx::query_as::<_, ShippingAddress>(
            r#"
            INSERT INTO shipping_addresses (id, user_id, name, phone, address_line1, city, state, postal_code, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, address_line1) DO UPDATE
            SET name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                city = EXCLUDED.city,
                state = EXCLUDED.state,
                postal_code = EXCLUDED.postal_code,
                country = EXCLUDED.country,
                created_at = NOW()
            RETURNING id, user_id, name, phone, address_line1, city, state, postal_code, country, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&address.user_id)
        .bind(&form.name)
        .bind(&form.phone)
        .bind(&form.address_line1)
        .bind(&form.city)
        .bind(&form.state)
        .bind(&form.postal_code)
        .bind(&address.country)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to save address for user {}: {:?}", address.user_id, err);
            RepositoryError::from(err)
        })?;

        info!("🏠 Saved shipping address {} for user {}", saved.id, saved.user_id);
        Ok(saved)
    }

    async fn latest_for_user(&self, user_id: &str) -> Result<Option<ShippingAddress>, RepositoryError> {
        sqlx::query_as::<_, ShippingAddress>(
            "SELECT id, user_id, name, phone, address_line1, city, state, postal_code, country, created_at \
             FROM shipping_addresses WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to load address for user {}: {:?}", user_id, err);
            RepositoryError::from(err)
        })
    }
}
