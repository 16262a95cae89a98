//! Blog reading and publishing.

use crate::auth::AuthUser;
use crate::domain::aggregates::{Blog, NewBlog, PendingFile};
use crate::domain::events::{BlogEvent, DomainEvent};
use crate::errors::{RepositoryError, ServiceError};
use crate::publisher::EventPublisher;
use crate::repository::DynBlogRepository;
use crate::storage::DynObjectStorage;
use chrono::Utc;
use tracing::info;

pub const FEATURED_IMAGE_PREFIX: &str = "blog-";

#[derive(Clone)]
pub struct BlogService {
    blogs: DynBlogRepository,
    storage: DynObjectStorage,
    publisher: EventPublisher,
}

impl BlogService {
    pub fn new(blogs: DynBlogRepository, storage: DynObjectStorage, publisher: EventPublisher) -> Self {
        Self { blogs, storage, publisher }
    }

    pub async fn published(&self) -> Result<Vec<Blog>, ServiceError> {
        Ok(self.blogs.list_published().await?)
    }

    pub async fn by_slug(&self, slug: &str) -> Result<Blog, ServiceError> {
        self.blogs
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Blog post not found".into()))
    }

    /// Uploads the optional featured image, then inserts the post as
    /// published under the signed-in author.
    pub async fn publish(&self, author: &AuthUser, mut post: NewBlog, image: Option<PendingFile>) -> Result<Blog, ServiceError> {
        if let Some(image) = image {
            let object_name = image.object_name(FEATURED_IMAGE_PREFIX, Utc::now());
            let path = self.storage.upload(&object_name, image.bytes, image.content_type.as_deref()).await?;
            info!("🖼️ Stored featured image {}", path);
            post.featured_image_url = Some(self.storage.public_url(&path));
        }
        post.author_id = Some(author.id.clone());

        let blog = match self.blogs.create(&post).await {
            Ok(blog) => blog,
            Err(RepositoryError::Conflict(_)) => {
                return Err(ServiceError::Repo(RepositoryError::Conflict(format!(
                    "A post with slug '{}' already exists",
                    post.slug
                ))))
            }
            Err(e) => return Err(e.into()),
        };

        self.publisher
            .publish(DomainEvent::Blog(BlogEvent::Published { blog_id: blog.id, slug: blog.slug.clone() }))
            .await;
        Ok(blog)
    }
}
