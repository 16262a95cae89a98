//! AI drafting assist: a conversational draft writer and a one-shot
//! structured blog-post generator, both backed by a hosted model.

mod drafting;
mod gemini;

pub use drafting::{draft_blog_post, BlogDraft, BlogTopic, BLOG_POST_SCHEMA_NAME, CHAT_SYSTEM_PROMPT};
pub use gemini::{GeminiClient, SseDecoder, DEFAULT_BASE_URL};

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Generation service returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Generation request failed: {0}")]
    Transport(String),

    #[error("Generated output did not match the expected shape: {0}")]
    InvalidOutput(String),

    #[error("Invalid generation configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Transport(err.to_string())
    }
}

/// One turn of the drafting conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    User(String),
    Assistant(String),
}

impl Message {
    pub fn text(&self) -> &str {
        match self { Message::User(t) | Message::Assistant(t) => t }
    }
}

/// Conversation kept by the caller; nothing here is persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new(messages: Vec<Message>) -> Self { Self(messages) }
    pub fn messages(&self) -> &[Message] { &self.0 }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn push(&mut self, message: Message) { self.0.push(message); }

    /// Text of the final turn when the assistant spoke last: the draft an
    /// editor copies into the blog content field.
    pub fn latest_draft(&self) -> Option<&str> {
        match self.0.last() {
            Some(Message::Assistant(text)) => Some(text),
            _ => None,
        }
    }

    /// The request must end with a user turn for the model to answer.
    pub fn ensure_awaiting_reply(&self) -> Result<(), GenerationError> {
        match self.0.last() {
            Some(Message::User(text)) if !text.trim().is_empty() => Ok(()),
            Some(Message::User(_)) => Err(GenerationError::InvalidInput("Prompt is empty".into())),
            _ => Err(GenerationError::InvalidInput("Transcript must end with a user message".into())),
        }
    }
}

pub type TextStream = BoxStream<'static, Result<String, GenerationError>>;

pub type DynTextGenerator = Arc<dyn TextGenerator + Send + Sync>;

#[async_trait]
pub trait TextGenerator {
    /// Streams the assistant's reply to the transcript as text chunks.
    async fn stream_chat(&self, system: &str, transcript: &Transcript) -> Result<TextStream, GenerationError>;

    /// Asks for a JSON object conforming to `schema`.
    async fn generate_json(&self, prompt: &str, schema: &serde_json::Value) -> Result<serde_json::Value, GenerationError>;
}
