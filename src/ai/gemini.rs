use super::{GenerationError, Message, TextGenerator, TextStream, Transcript};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Gemini `generateContent` family of endpoints.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    blog_model: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self { role: role.map(str::to_string), parts: vec![Part { text: Some(text.to_string()) }] }
    }

    fn from_message(message: &Message) -> Self {
        match message {
            Message::User(text) => Self::text(Some("user"), text),
            Message::Assistant(text) => Self::text(Some("model"), text),
        }
    }
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        chat_model: impl Into<String>,
        blog_model: impl Into<String>,
        max_duration: Duration,
    ) -> Result<Self, GenerationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerationError::Config("GEMINI_API_KEY is empty".into()));
        }
        let client = Client::builder()
            .timeout(max_duration)
            .build()
            .map_err(|e| GenerationError::Config(format!("failed to construct generation client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            chat_model: chat_model.into(),
            blog_model: blog_model.into(),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, GenerationError> {
        let response = request.header("x-goog-api-key", &self.api_key).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        error!("❌ Generation request rejected: {} {}", status, message);
        Err(GenerationError::Upstream { status, message })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn stream_chat(&self, system: &str, transcript: &Transcript) -> Result<TextStream, GenerationError> {
        transcript.ensure_awaiting_reply()?;
        let contents: Vec<Content> = transcript.messages().iter().map(Content::from_message).collect();
        let body = json!({
            "systemInstruction": Content::text(None, system),
            "contents": contents,
        });

        let request = self
            .client
            .post(self.endpoint(&self.chat_model, "streamGenerateContent"))
            .query(&[("alt", "sse")])
            .json(&body);
        let response = self.send(request).await?;
        info!("💬 Streaming draft from {} ({} turns)", self.chat_model, contents.len());

        Ok(decode_event_stream(response.bytes_stream().map(|chunk| chunk.map(|b| b.to_vec())).boxed()))
    }

    async fn generate_json(&self, prompt: &str, schema: &serde_json::Value) -> Result<serde_json::Value, GenerationError> {
        let body = json!({
            "contents": [Content::text(Some("user"), prompt)],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });
        let request = self.client.post(self.endpoint(&self.blog_model, "generateContent")).json(&body);
        let response: GenerateResponse = self.send(request).await?.json().await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(GenerationError::InvalidOutput("empty response".into()));
        }
        serde_json::from_str(&text).map_err(|e| GenerationError::InvalidOutput(e.to_string()))
    }
}

struct DecodeState {
    body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    decoder: SseDecoder,
    ready: VecDeque<String>,
    done: bool,
}

/// Turns an SSE response body into text chunks. The stream ends after the
/// first error.
fn decode_event_stream(body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>) -> TextStream {
    let state = DecodeState { body, decoder: SseDecoder::default(), ready: VecDeque::new(), done: false };
    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(text) = state.ready.pop_front() {
                return Some((Ok(text), state));
            }
            if state.done {
                return None;
            }
            let decoded = match state.body.next().await {
                Some(Ok(bytes)) => state.decoder.push(&bytes),
                Some(Err(e)) => Err(e.into()),
                None => {
                    state.done = true;
                    state.decoder.finish()
                }
            };
            match decoded {
                Ok(texts) => state.ready.extend(texts),
                Err(e) => {
                    state.done = true;
                    state.ready.clear();
                    return Some((Err(e), state));
                }
            }
        }
    })
    .boxed()
}

/// Incremental decoder for `data:` lines of a server-sent event stream.
/// Bytes are buffered until a full line arrives, so chunks may split a line
/// or a multi-byte character anywhere.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feeds a chunk and returns the text carried by every completed event line.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, GenerationError> {
        self.buffer.extend_from_slice(chunk);
        let mut texts = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(text) = Self::decode_line(&line)? {
                texts.push(text);
            }
        }
        Ok(texts)
    }

    /// Flushes a final line that was not newline-terminated.
    pub fn finish(&mut self) -> Result<Vec<String>, GenerationError> {
        let line = std::mem::take(&mut self.buffer);
        Ok(Self::decode_line(&line)?.into_iter().collect())
    }

    fn decode_line(line: &[u8]) -> Result<Option<String>, GenerationError> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim();
        let Some(data) = line.strip_prefix("data:") else { return Ok(None) };
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            return Ok(None);
        }
        let response: GenerateResponse =
            serde_json::from_str(data).map_err(|e| GenerationError::InvalidOutput(e.to_string()))?;
        let text = response.text();
        Ok(Some(text).filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event(text: &str) -> String {
        format!("data: {}\r\n\r\n", json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]}))
    }

    #[test]
    fn test_decoder_handles_split_chunks() {
        let raw = format!("{}{}", event("## Why "), event("hoodies ✨"));
        let bytes = raw.as_bytes();
        let mut decoder = SseDecoder::default();
        let mut out = Vec::new();
        for chunk in bytes.chunks(7) {
            out.extend(decoder.push(chunk).unwrap());
        }
        out.extend(decoder.finish().unwrap());
        assert_eq!(out, vec!["## Why ".to_string(), "hoodies ✨".to_string()]);
    }

    #[test]
    fn test_decoder_ignores_non_data_lines() {
        let mut decoder = SseDecoder::default();
        let out = decoder.push(b": keep-alive\nevent: message\ndata: [DONE]\n").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_decoder_flushes_unterminated_line() {
        let mut decoder = SseDecoder::default();
        let raw = event("tail");
        assert!(decoder.push(raw.trim_end().as_bytes()).unwrap().is_empty());
        assert_eq!(decoder.finish().unwrap(), vec!["tail".to_string()]);
    }

    #[test]
    fn test_decoder_rejects_garbage() {
        let mut decoder = SseDecoder::default();
        assert!(matches!(decoder.push(b"data: {not json\n"), Err(GenerationError::InvalidOutput(_))));
    }

    #[tokio::test]
    async fn test_stream_stops_after_error() {
        let body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>> = stream::iter(vec![
            Ok(event("one").into_bytes()),
            Ok(b"data: nope\n".to_vec()),
            Ok(event("never").into_bytes()),
        ])
        .boxed();
        let items: Vec<_> = decode_event_stream(body).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "one");
        assert!(items[1].is_err());
    }

    #[test]
    fn test_requires_api_key() {
        let err = GeminiClient::new(DEFAULT_BASE_URL, " ", "chat", "blog", Duration::from_secs(30)).unwrap_err();
        assert!(matches!(err, GenerationError::Config(_)));
    }

    #[test]
    fn test_role_mapping() {
        let c = Content::from_message(&Message::Assistant("draft".into()));
        assert_eq!(c.role.as_deref(), Some("model"));
    }

    fn client(base: &str) -> GeminiClient {
        GeminiClient::new(base, "test-key", "chat-model", "blog-model", Duration::from_secs(5)).unwrap()
    }

    async fn request_body(server: &MockServer) -> serde_json::Value {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        serde_json::from_slice(&requests[0].body).unwrap()
    }

    #[tokio::test]
    async fn test_generate_json_sends_schema_and_parses_reply() {
        let server = MockServer::start().await;
        let draft = json!({"title": "Layer Up", "slug": "layer-up", "content": "## Why", "excerpt": "Stay warm."});
        Mock::given(method("POST"))
            .and(path("/v1beta/models/blog-model:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": draft.to_string()}]}}]
            })))
            .mount(&server)
            .await;

        let schema = json!({"type": "object", "required": ["title"]});
        let value = client(&server.uri()).generate_json("winter layering", &schema).await.unwrap();
        assert_eq!(value, draft);

        let sent = request_body(&server).await;
        assert_eq!(sent["contents"][0]["role"], "user");
        assert_eq!(sent["contents"][0]["parts"][0]["text"], "winter layering");
        assert_eq!(sent["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(sent["generationConfig"]["responseSchema"], schema);
    }

    #[tokio::test]
    async fn test_generate_json_maps_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).generate_json("topic", &json!({})).await.unwrap_err();
        assert!(matches!(err, GenerationError::Upstream { status: 429, message } if message == "quota exceeded"));
    }

    #[tokio::test]
    async fn test_generate_json_rejects_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client(&server.uri()).generate_json("topic", &json!({})).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidOutput(_)));
    }

    #[tokio::test]
    async fn test_stream_chat_decodes_event_stream() {
        let server = MockServer::start().await;
        let body = format!("{}{}data: [DONE]\n\n", event("## Layer up"), event("\n\nStart with a tee."));
        Mock::given(method("POST"))
            .and(path("/v1beta/models/chat-model:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let transcript = Transcript::new(vec![
            Message::User("Write about layering".into()),
            Message::Assistant("Sure".into()),
            Message::User("Shorter".into()),
        ]);
        let stream = client(&server.uri()).stream_chat("Be brief.", &transcript).await.unwrap();
        let chunks: Vec<String> = stream.map(|chunk| chunk.unwrap()).collect().await;
        assert_eq!(chunks.concat(), "## Layer up\n\nStart with a tee.");

        let sent = request_body(&server).await;
        assert_eq!(sent["systemInstruction"]["parts"][0]["text"], "Be brief.");
        let roles: Vec<&str> = sent["contents"].as_array().unwrap().iter().filter_map(|c| c["role"].as_str()).collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
    }

    #[tokio::test]
    async fn test_stream_chat_rejection_surfaces_before_streaming() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let transcript = Transcript::new(vec![Message::User("hi".into())]);
        let err = client(&server.uri()).stream_chat("Be brief.", &transcript).await.err().unwrap();
        assert!(matches!(err, GenerationError::Upstream { status: 400, .. }));
    }
}
