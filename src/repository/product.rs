use super::ProductRepository;
use crate::domain::aggregates::{NewProduct, Product};
use crate::errors::RepositoryError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, price, description, category, image_url, images, is_active, stock, \
    sizes, colors, material, care_instructions, created_at";

#[derive(Clone)]
pub struct PgProductRepository {
    db: PgPool,
}

impl PgProductRepository {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list_active(&self, limit: Option<i64>) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = TRUE ORDER BY created_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to list products: {:?}", err);
                RepositoryError::from(err)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch product {}: {:?}", id, err);
                RepositoryError::from(err)
            })
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products (id, name, price, description, category, image_url, images, is_active, stock, \
                sizes, colors, material, care_instructions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $9, $10, $11, $12) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::now_v7())
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.description)
            .bind(&product.category)
            .bind(product.thumbnail())
            .bind(&product.images)
            .bind(product.stock)
            .bind(&product.sizes)
            .bind(&product.colors)
            .bind(&product.material)
            .bind(&product.care_instructions)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to create product '{}': {:?}", product.name, err);
                RepositoryError::from(err)
            })?;

        info!("✅ Created product {} '{}' with {} images", created.id, created.name, created.images.len());
        Ok(created)
    }
}
