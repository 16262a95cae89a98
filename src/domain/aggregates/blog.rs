//! Blog posts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::value_objects::{Slug, SlugError};

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image_url: Option<String>,
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Blog {
    pub fn excerpt_or_default(&self) -> &str {
        self.excerpt.as_deref().filter(|e| !e.trim().is_empty()).unwrap_or("No excerpt available.")
    }
}

#[derive(Clone, Debug)]
pub struct NewBlog {
    pub title: String,
    pub slug: Slug,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image_url: Option<String>,
    pub author_id: Option<String>,
}

impl NewBlog {
    /// Title and content are required. An empty slug is derived from the title.
    pub fn new(title: &str, slug: &str, content: &str, excerpt: &str) -> Result<Self, BlogError> {
        let title = title.trim();
        if title.is_empty() || content.trim().is_empty() { return Err(BlogError::MissingFields); }
        let slug = if slug.trim().is_empty() { Slug::from_title(title) } else { Slug::new(slug) }
            .map_err(BlogError::InvalidSlug)?;
        let excerpt = Some(excerpt.trim().to_string()).filter(|e| !e.is_empty());
        Ok(Self {
            title: title.to_string(), slug, content: content.to_string(), excerpt,
            featured_image_url: None, author_id: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum BlogError { MissingFields, InvalidSlug(SlugError) }
impl std::error::Error for BlogError {}
impl std::fmt::Display for BlogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Please fill in all required fields."),
            Self::InvalidSlug(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_slug_derived_from_title() {
        let blog = NewBlog::new("Winter Layering Guide", "", "# Layers", " ").unwrap();
        assert_eq!(blog.slug.as_str(), "winter-layering-guide");
        assert_eq!(blog.excerpt, None);
    }
    #[test]
    fn test_required_fields() {
        assert_eq!(NewBlog::new("", "x", "body", "").unwrap_err(), BlogError::MissingFields);
        assert_eq!(NewBlog::new("T", "x", "  ", "").unwrap_err(), BlogError::MissingFields);
        assert!(matches!(NewBlog::new("T", "Not A Slug", "body", ""), Err(BlogError::InvalidSlug(_))));
    }
}
