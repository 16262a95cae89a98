use super::extract::{MaybeUser, ValidatedJson};
use crate::ai::{draft_blog_post, BlogDraft, BlogTopic, Transcript, CHAT_SYSTEM_PROMPT};
use crate::domain::aggregates::ShippingForm;
use crate::errors::{HttpError, ServiceError};
use crate::services::{CheckoutReceipt, CheckoutRequest};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use serde::Deserialize;
use tracing::error;

pub async fn checkout(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutReceipt>), HttpError> {
    let receipt = state.checkout.place_order(user.as_ref(), &request).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn saved_address(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Result<Json<ShippingForm>, HttpError> {
    let user = user.ok_or_else(|| HttpError::Unauthorized("Please sign in to place an order".into()))?;
    Ok(Json(state.checkout.saved_address(&user).await?))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Transcript,
}

/// Streams the drafted reply as plain text chunks.
pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Result<Response, HttpError> {
    request.messages.ensure_awaiting_reply().map_err(|e| HttpError::BadRequest(e.to_string()))?;
    let chunks = state
        .generator
        .stream_chat(CHAT_SYSTEM_PROMPT, &request.messages)
        .await
        .map_err(ServiceError::from)?
        .inspect_err(|e| error!("❌ Draft stream interrupted: {}", e));

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8"), (header::CACHE_CONTROL, "no-cache")],
        Body::from_stream(chunks),
    )
        .into_response())
}

pub async fn generate_blog(
    State(state): State<AppState>,
    ValidatedJson(topic): ValidatedJson<BlogTopic>,
) -> Result<Json<BlogDraft>, HttpError> {
    let draft = draft_blog_post(state.generator.as_ref(), &topic).await.map_err(ServiceError::from)?;
    Ok(Json(draft))
}
