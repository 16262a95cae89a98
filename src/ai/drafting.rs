use super::{GenerationError, TextGenerator};
use crate::domain::aggregates::FieldErrors;
use crate::domain::value_objects::is_url_slug;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use validator::{Validate, ValidationError};

pub const CHAT_SYSTEM_PROMPT: &str = "You are an expert technical writer for the brand 'ENTITIES'. \
Write a full, structured blog post in Markdown based on the user's prompt. \
Use H2 headers, bullet points, and bold text for emphasis.";

pub const BLOG_POST_SCHEMA_NAME: &str = "BlogPost";

/// Request body for structured generation.
#[derive(Debug, Deserialize, Validate)]
pub struct BlogTopic {
    #[validate(length(min = 3, message = "Topic must be at least 3 characters"))]
    pub topic: String,
}

/// Structured generation output, checked before it is handed back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BlogDraft {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(custom(function = "validate_slug", message = "Slug must be lowercase words separated by dashes"))]
    pub slug: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(length(min = 1))]
    pub excerpt: String,
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if is_url_slug(slug) { Ok(()) } else { Err(ValidationError::new("slug")) }
}

fn blog_post_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "slug": { "type": "string" },
            "content": { "type": "string" },
            "excerpt": { "type": "string" }
        },
        "required": ["title", "slug", "content", "excerpt"]
    })
}

fn blog_post_prompt(topic: &str) -> String {
    format!(
        r#"Generate a blog post object for the topic: "{topic}".

Rules:
- "title": engaging, under 80 characters.
- "slug": url-safe, lowercase, words separated by dashes.
- "content": markdown-friendly long form article (800-1200 words).
- "excerpt": 1-3 sentence summary of the article.
Return ONLY the JSON fields that match the schema."#
    )
}

pub async fn draft_blog_post<G>(generator: &G, topic: &BlogTopic) -> Result<BlogDraft, GenerationError>
where
    G: TextGenerator + ?Sized,
{
    topic.validate().map_err(|e| GenerationError::InvalidInput(FieldErrors::from(&e).to_string()))?;

    let raw = generator.generate_json(&blog_post_prompt(topic.topic.trim()), &blog_post_schema()).await?;
    let draft: BlogDraft = serde_json::from_value(raw)
        .map_err(|e| GenerationError::InvalidOutput(format!("{BLOG_POST_SCHEMA_NAME}: {e}")))?;
    draft
        .validate()
        .map_err(|e| GenerationError::InvalidOutput(FieldErrors::from(&e).to_string()))?;

    info!("📝 Drafted blog post '{}' ({} chars)", draft.slug, draft.content.len());
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{TextStream, Transcript};
    use async_trait::async_trait;

    struct Canned(serde_json::Value);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn stream_chat(&self, _: &str, _: &Transcript) -> Result<TextStream, GenerationError> {
            Err(GenerationError::Config("unused".into()))
        }
        async fn generate_json(&self, prompt: &str, schema: &serde_json::Value) -> Result<serde_json::Value, GenerationError> {
            assert!(prompt.contains("\"winter layering\""));
            assert_eq!(schema["required"].as_array().unwrap().len(), 4);
            Ok(self.0.clone())
        }
    }

    fn topic(t: &str) -> BlogTopic { BlogTopic { topic: t.into() } }

    #[tokio::test]
    async fn test_valid_draft() {
        let g = Canned(json!({"title": "Layer Up", "slug": "layer-up", "content": "## Why", "excerpt": "Stay warm."}));
        let draft = draft_blog_post(&g, &topic("winter layering")).await.unwrap();
        assert_eq!(draft.slug, "layer-up");
    }

    #[tokio::test]
    async fn test_rejects_bad_slug() {
        let g = Canned(json!({"title": "Layer Up", "slug": "Layer Up!", "content": "## Why", "excerpt": "Stay warm."}));
        let err = draft_blog_post(&g, &topic("winter layering")).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidOutput(msg) if msg.contains("slug")));
    }

    #[tokio::test]
    async fn test_rejects_missing_field() {
        let g = Canned(json!({"title": "Layer Up", "slug": "layer-up", "content": "## Why"}));
        assert!(matches!(draft_blog_post(&g, &topic("winter layering")).await, Err(GenerationError::InvalidOutput(_))));
    }

    #[tokio::test]
    async fn test_short_topic_never_calls_service() {
        let g = Canned(json!({}));
        assert!(matches!(draft_blog_post(&g, &topic("ab")).await, Err(GenerationError::InvalidInput(_))));
    }
}
