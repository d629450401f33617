// Conversation Handlers untuk Chat Service
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use super::{CursorQuery, PageQuery};
use crate::{
    config::{AppState, HealthCheckResponse},
    domain::{ConversationCursorResponse, ConversationListResponse, ConversationSummary},
    error::AppError,
};

// Conversations milik user, most recent first
#[utoipa::path(
    get,
    path = "/api/conversations/user/{user_id}",
    tag = "conversations",
    params(
        ("user_id" = String, Path, description = "User UUID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Halaman conversations", body = ConversationListResponse),
        (status = 400, description = "Parameter tidak valid"),
        (status = 503, description = "Store tidak tersedia")
    )
)]
pub async fn get_user_conversations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ConversationListResponse>, AppError> {
    let (page, limit) = query.resolve(&state);
    let result = state
        .chat
        .queries
        .get_user_conversations(&user_id, page, limit)
        .await?;

    Ok(Json(ConversationListResponse {
        conversations: result.items,
        page: result.page,
        limit: result.limit,
        total: result.total,
    }))
}

// Conversations milik user setelah cursor
#[utoipa::path(
    get,
    path = "/api/conversations/user/{user_id}/cursor",
    tag = "conversations",
    params(
        ("user_id" = String, Path, description = "User UUID"),
        CursorQuery
    ),
    responses(
        (status = 200, description = "Halaman conversations dengan next_cursor", body = ConversationCursorResponse),
        (status = 400, description = "Cursor atau limit tidak valid")
    )
)]
pub async fn get_user_conversations_cursor(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<CursorQuery>,
) -> Result<Json<ConversationCursorResponse>, AppError> {
    let limit = query.limit(&state);
    let result = state
        .chat
        .queries
        .get_user_conversations_after_cursor(&user_id, query.cursor.as_deref(), limit)
        .await?;

    Ok(Json(ConversationCursorResponse {
        conversations: result.items,
        limit: result.limit,
        next_cursor: result.next_cursor,
    }))
}

// Detail conversation berdasarkan id
#[utoipa::path(
    get,
    path = "/api/conversations/{conversation_id}",
    tag = "conversations",
    params(("conversation_id" = String, Path, description = "Conversation UUID")),
    responses(
        (status = 200, description = "Conversation ditemukan", body = ConversationSummary),
        (status = 400, description = "Id tidak valid"),
        (status = 404, description = "Conversation tidak ditemukan")
    )
)]
pub async fn get_conversation_by_id(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ConversationSummary>, AppError> {
    let conversation = state.chat.queries.get_conversation(&conversation_id).await?;
    Ok(Json(conversation))
}

// Health check: ping store
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service sehat", body = HealthCheckResponse),
        (status = 503, description = "Store tidak bisa dihubungi", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthCheckResponse>) {
    let (status, store) = match state.chat.ping().await {
        Ok(()) => (StatusCode::OK, "connected"),
        Err(err) => {
            tracing::warn!("Health check gagal: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, "disconnected")
        }
    };

    let response = HealthCheckResponse {
        service: "chat-service".to_string(),
        status: if status == StatusCode::OK { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store.to_string(),
        backend: state.config.store_backend.to_string(),
        checked_at: chrono::Utc::now().to_rfc3339(),
    };

    (status, Json(response))
}
