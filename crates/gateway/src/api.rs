//! The `/api` handlers.
//!
//! - `POST /api/chat`           — forward a user message to the provider
//! - `POST /api/knowledge`      — replace one knowledge section
//! - `POST /api/knowledge/file` — upload a base64-encoded file
//! - `POST /api/sync`           — pull a Drive folder into the store

use axum::extract::State;
use axum::response::Json;
use base64::Engine;
use homie_core::error::Error;
use homie_core::message::Conversation;
use homie_core::provider::ProviderRequest;
use homie_drive::sync_folder;
use homie_knowledge::{compose, select, Category};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiJson};
use crate::SharedState;

// ── Chat ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    response: String,
}

/// Forward a user message to the completion provider.
///
/// The composed persona+knowledge text goes out as the system channel and
/// the raw message as the user channel; the provider's reply is relayed
/// verbatim.
pub async fn chat_handler(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::validation("Message is required"));
    }

    if !state.provider_configured {
        return Err(ApiError::configuration());
    }

    info!(message_len = payload.message.len(), "Chat message received");

    let fragments = state.store.snapshot().await;
    let knowledge = select(&payload.message, &fragments);
    let system = compose(&state.persona.instructions, &knowledge);

    let conversation = Conversation::single_turn(system, &payload.message);
    let request = ProviderRequest {
        model: state.model.clone(),
        messages: conversation.messages,
        temperature: state.temperature,
        max_tokens: Some(state.max_tokens),
    };

    let response = state
        .provider
        .complete(request)
        .await
        .map_err(|e| ApiError::from(Error::Provider(e)))?;

    Ok(Json(ChatResponse {
        response: response.message.content,
    }))
}

// ── Knowledge upload ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct KnowledgeRequest {
    #[serde(default)]
    content: String,
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Serialize)]
pub struct KnowledgeResponse {
    success: bool,
    #[serde(rename = "type")]
    kind: String,
    section: String,
    #[serde(rename = "contentLength")]
    content_length: usize,
}

/// Replace one knowledge section from pasted text.
pub async fn upload_knowledge_handler(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<KnowledgeRequest>,
) -> Result<Json<KnowledgeResponse>, ApiError> {
    if payload.content.trim().is_empty() || payload.kind.is_empty() {
        return Err(ApiError::validation("Content and type are required"));
    }

    let category =
        Category::from_key(&payload.kind).map_err(|e| ApiError::from(Error::Knowledge(e)))?;

    state
        .store
        .replace(category, &payload.content)
        .await
        .map_err(|e| ApiError::from(Error::Knowledge(e)))?;

    info!(section = %category, content_len = payload.content.len(), "Knowledge section updated");

    Ok(Json(KnowledgeResponse {
        success: true,
        kind: payload.kind,
        section: category.key().to_string(),
        content_length: payload.content.len(),
    }))
}

// ── File upload ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadRequest {
    #[serde(default)]
    file_data: String,
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    file_type: String,
    #[serde(default)]
    content_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
}

/// Upload a base64-encoded file into a knowledge section.
///
/// Only plain-text payloads are decoded and stored; other formats get a
/// pointer to the text upload path rather than an error status.
pub async fn upload_file_handler(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<FileUploadRequest>,
) -> Result<Json<FileUploadResponse>, ApiError> {
    if payload.file_data.is_empty() || payload.file_name.is_empty() || payload.content_type.is_empty()
    {
        return Err(ApiError::validation(
            "File data, name, and content type are required",
        ));
    }

    if payload.file_type != "text/plain" {
        return Ok(Json(FileUploadResponse {
            success: false,
            message: "File type not yet supported for direct upload.".into(),
            file_name: None,
            content_length: None,
            suggestion: Some(
                "Please use the text upload option and copy-paste the content from your file."
                    .into(),
            ),
        }));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&payload.file_data)
        .map_err(|_| ApiError::validation("File data is not valid base64"))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| ApiError::validation("File data is not valid UTF-8 text"))?;

    let category = Category::from_key(&payload.content_type)
        .map_err(|e| ApiError::from(Error::Knowledge(e)))?;

    let content_length = text.len();
    state
        .store
        .replace(category, &text)
        .await
        .map_err(|e| ApiError::from(Error::Knowledge(e)))?;

    info!(file = %payload.file_name, section = %category, "Text file processed");

    Ok(Json(FileUploadResponse {
        success: true,
        message: "Text file processed successfully!".into(),
        file_name: Some(payload.file_name),
        content_length: Some(content_length),
        suggestion: None,
    }))
}

// ── Drive sync ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    folder_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    success: bool,
    processed_files: usize,
    total_files: usize,
    errors: Vec<String>,
    folder_id: String,
}

/// Sync a Drive folder into the knowledge store.
pub async fn sync_handler(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<SyncRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    if payload.folder_id.trim().is_empty() {
        return Err(ApiError::validation("Drive folder ID is required"));
    }

    let Some(drive) = &state.drive else {
        return Err(ApiError::configuration());
    };

    let report = sync_folder(drive.as_ref(), &state.store, &payload.folder_id)
        .await
        .map_err(|e| ApiError::from(Error::Drive(e)))?;

    info!(
        folder_id = %payload.folder_id,
        processed = report.processed_files,
        total = report.total_files,
        failed = report.errors.len(),
        "Drive sync completed"
    );

    Ok(Json(SyncResponse {
        success: true,
        processed_files: report.processed_files,
        total_files: report.total_files,
        errors: report.errors,
        folder_id: payload.folder_id,
    }))
}
