// Message Handlers untuk Chat Service
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{CursorQuery, PageQuery};
use crate::{
    config::AppState,
    domain::{MessageCursorResponse, MessageListResponse, MessageRecord, SendMessageRequest},
    error::AppError,
};

// Query parameters untuk messages sebelum timestamp
#[derive(Debug, Deserialize, IntoParams)]
pub struct BeforeQuery {
    /// Batas eksklusif (RFC 3339): hanya message dengan created_at < nilai ini
    pub before_timestamp: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn list_response(page: shared::Page<MessageRecord>) -> MessageListResponse {
    MessageListResponse {
        messages: page.items,
        page: page.page,
        limit: page.limit,
        total: page.total,
    }
}

// Kirim message baru: fan-out ke semua table
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message tersimpan di semua table", body = MessageRecord),
        (status = 400, description = "Request tidak valid"),
        (status = 500, description = "Fan-out gagal; retry dengan message_id yang sama"),
        (status = 503, description = "Store tidak tersedia"),
        (status = 504, description = "Store timeout")
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageRecord>), AppError> {
    let message = state.chat.writer.send_message(&request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

// Ambil satu message berdasarkan id
#[utoipa::path(
    get,
    path = "/api/messages/{message_id}",
    tag = "messages",
    params(("message_id" = String, Path, description = "Message UUID")),
    responses(
        (status = 200, description = "Message ditemukan", body = MessageRecord),
        (status = 400, description = "Id tidak valid"),
        (status = 404, description = "Message tidak ditemukan")
    )
)]
pub async fn get_message_by_id(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<Json<MessageRecord>, AppError> {
    let message = state.chat.queries.get_message(&message_id).await?;
    Ok(Json(message))
}

// Messages dalam conversation, newest first
#[utoipa::path(
    get,
    path = "/api/messages/conversation/{conversation_id}",
    tag = "messages",
    params(
        ("conversation_id" = String, Path, description = "Conversation UUID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Halaman messages", body = MessageListResponse),
        (status = 400, description = "Parameter tidak valid")
    )
)]
pub async fn get_conversation_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MessageListResponse>, AppError> {
    let (page, limit) = query.resolve(&state);
    let result = state
        .chat
        .queries
        .get_conversation_messages(&conversation_id, page, limit)
        .await?;

    Ok(Json(list_response(result)))
}

// Messages sebelum timestamp tertentu (infinite scroll ke atas)
#[utoipa::path(
    get,
    path = "/api/messages/conversation/{conversation_id}/before",
    tag = "messages",
    params(
        ("conversation_id" = String, Path, description = "Conversation UUID"),
        BeforeQuery
    ),
    responses(
        (status = 200, description = "Halaman messages sebelum timestamp", body = MessageListResponse),
        (status = 400, description = "Parameter tidak valid")
    )
)]
pub async fn get_messages_before(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<BeforeQuery>,
) -> Result<Json<MessageListResponse>, AppError> {
    let before = query
        .before_timestamp
        .ok_or_else(|| AppError::invalid_argument("before_timestamp harus diisi"))?;
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(state.config.default_page_limit as i64);

    let result = state
        .chat
        .queries
        .get_messages_before(&conversation_id, before, page, limit)
        .await?;

    Ok(Json(list_response(result)))
}

// Messages setelah cursor
#[utoipa::path(
    get,
    path = "/api/messages/conversation/{conversation_id}/cursor",
    tag = "messages",
    params(
        ("conversation_id" = String, Path, description = "Conversation UUID"),
        CursorQuery
    ),
    responses(
        (status = 200, description = "Halaman messages dengan next_cursor", body = MessageCursorResponse),
        (status = 400, description = "Cursor atau limit tidak valid")
    )
)]
pub async fn get_messages_after_cursor(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<CursorQuery>,
) -> Result<Json<MessageCursorResponse>, AppError> {
    let limit = query.limit(&state);
    let result = state
        .chat
        .queries
        .get_conversation_messages_after_cursor(&conversation_id, query.cursor.as_deref(), limit)
        .await?;

    Ok(Json(MessageCursorResponse {
        messages: result.items,
        limit: result.limit,
        next_cursor: result.next_cursor,
    }))
}
