use super::BlogRepository;
use crate::domain::aggregates::{Blog, NewBlog};
use crate::errors::RepositoryError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

const BLOG_SELECT: &str = "SELECT b.id, b.title, b.slug, b.content, b.excerpt, b.featured_image_url, b.author_id, \
    a.name AS author_name, b.is_published, b.created_at";

#[derive(Clone)]
pub struct PgBlogRepository {
    db: PgPool,
}

impl PgBlogRepository {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl BlogRepository for PgBlogRepository {
    async fn list_published(&self) -> Result<Vec<Blog>, RepositoryError> {
        let sql = format!(
            "{BLOG_SELECT} FROM blogs b LEFT JOIN authors a ON a.id = b.author_id \
             WHERE b.is_published = TRUE ORDER BY b.created_at DESC"
        );
        sqlx::query_as::<_, Blog>(&sql).fetch_all(&self.db).await.map_err(|err| {
            error!("❌ Failed to list blog posts: {:?}", err);
            RepositoryError::from(err)
        })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Blog>, RepositoryError> {
        let sql = format!(
            "{BLOG_SELECT} FROM blogs b LEFT JOIN authors a ON a.id = b.author_id \
             WHERE b.slug = $1 AND b.is_published = TRUE"
        );
        sqlx::query_as::<_, Blog>(&sql)
            .bind(slug)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch blog post '{}': {:?}", slug, err);
                RepositoryError::from(err)
            })
    }

    async fn create(&self, blog: &NewBlog) -> Result<Blog, RepositoryError> {
        let sql = format!(
            "WITH b AS ( \
                INSERT INTO blogs (id, title, slug, content, excerpt, featured_image_url, author_id, is_published) \
                VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE) RETURNING * \
             ) {BLOG_SELECT} FROM b LEFT JOIN authors a ON a.id = b.author_id"
        );
        let created = sqlx::query_as::<_, Blog>(&sql)
            .bind(Uuid::now_v7())
            .bind(&blog.title)
            .bind(blog.slug.as_str())
            .bind(&blog.content)
            .bind(&blog.excerpt)
            .bind(&blog.featured_image_url)
            .bind(&blog.author_id)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to publish blog post '{}': {:?}", blog.slug.as_str(), err);
                RepositoryError::from(err)
            })?;

        info!("📰 Published blog post {} '{}'", created.id, created.slug);
        Ok(created)
    }
}
