// API Routes untuk Chat Service

use crate::config::AppState;
use crate::handlers::{conversations, messages};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

// OpenAPI Documentation untuk Chat Service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chat Service API",
        version = "1.0.0",
        description = "Two-party messaging service di atas denormalized wide-column tables.\n\n## Features\n\n- Write fan-out ke messages_by_conversation, messages_by_id, conversations_by_user, conversations_by_id\n- Deterministic conversation id untuk setiap pasangan user\n- Page-number dan cursor pagination\n- Idempotent send dengan message_id",
    ),
    paths(
        messages::send_message,
        messages::get_message_by_id,
        messages::get_conversation_messages,
        messages::get_messages_before,
        messages::get_messages_after_cursor,
        conversations::get_user_conversations,
        conversations::get_user_conversations_cursor,
        conversations::get_conversation_by_id,
        conversations::health_check,
    ),
    components(
        schemas(
            crate::domain::MessageRecord,
            crate::domain::SendMessageRequest,
            crate::domain::MessageListResponse,
            crate::domain::MessageCursorResponse,
            crate::domain::ConversationSummary,
            crate::domain::ConversationListResponse,
            crate::domain::ConversationCursorResponse,
            crate::config::HealthCheckResponse,
        )
    ),
    tags(
        (name = "messages", description = "Kirim dan baca messages"),
        (name = "conversations", description = "Daftar dan detail conversations"),
        (name = "health", description = "Status service dan store")
    )
)]
pub struct ApiDoc;

// CORS: satu origin dari FRONTEND_URL, atau any origin kalau tidak diset
fn cors_layer(state: &AppState) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match state.config.frontend_url.as_deref() {
        Some(url) => match url.parse::<HeaderValue>() {
            Ok(origin) => cors.allow_origin(origin),
            Err(_) => {
                tracing::warn!("FRONTEND_URL tidak valid, CORS mengizinkan semua origin");
                cors.allow_origin(Any)
            }
        },
        None => cors.allow_origin(Any),
    }
}

// Buat router lengkap: docs, health, dan /api
pub fn create_router(state: AppState) -> Router {
    if state.config.is_production() {
        tracing::warn!("Chat Service running in PRODUCTION mode");
    } else {
        tracing::info!("Chat Service running in DEVELOPMENT mode");
    }

    let cors = cors_layer(&state);
    let openapi = ApiDoc::openapi();

    let public_routes = Router::new()
        .route("/health", get(conversations::health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi.clone()))
        .merge(Redoc::with_url("/redoc", openapi))
        .with_state(state.clone());

    public_routes.nest("/api", build_api_routes(state)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}

fn build_api_routes(state: AppState) -> Router {
    Router::new()
        // ===== Message Operations =====
        .route("/messages", post(messages::send_message))
        .route("/messages/{message_id}", get(messages::get_message_by_id))
        .route("/messages/conversation/{conversation_id}", get(messages::get_conversation_messages))
        .route("/messages/conversation/{conversation_id}/before", get(messages::get_messages_before))
        .route("/messages/conversation/{conversation_id}/cursor", get(messages::get_messages_after_cursor))

        // ===== Conversation Operations =====
        .route("/conversations/user/{user_id}", get(conversations::get_user_conversations))
        .route("/conversations/user/{user_id}/cursor", get(conversations::get_user_conversations_cursor))
        .route("/conversations/{conversation_id}", get(conversations::get_conversation_by_id))

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::domain::derive_conversation_id;
    use crate::repositories::{InMemoryChatStore, MockChatStore, StoreError};

    const U1: &str = "0b7e3c52-1f0a-4d8e-9c61-5a2f7d9e4b10";
    const U2: &str = "9d4f1a20-6c3b-4e7a-8b59-2e1c0f8d7a36";

    fn app() -> Router {
        create_router(AppState::with_store(
            AppConfig::default(),
            Arc::new(InMemoryChatStore::new()),
        ))
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_message(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/messages")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_send_then_read_over_http() {
        let app = app();

        let (status, sent) = call(
            &app,
            post_message(json!({ "sender_id": U1, "receiver_id": U2, "content": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(sent["content"], "hi");

        let conversation_id = derive_conversation_id(U1, U2).unwrap();
        assert_eq!(sent["conversation_id"], conversation_id.to_string());

        let (status, page) = call(
            &app,
            get(&format!("/api/messages/conversation/{conversation_id}?page=1&limit=10")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["messages"].as_array().unwrap().len(), 1);
        assert_eq!(page["page"], 1);
        assert_eq!(page["limit"], 10);

        let (status, found) = call(&app, get(&format!("/api/messages/{}", sent["id"].as_str().unwrap()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found, sent);

        let (status, conversations) = call(&app, get(&format!("/api/conversations/user/{U2}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(conversations["conversations"][0]["user_b_id"], U1);
        // default limit dari config
        assert_eq!(conversations["limit"], 20);

        let (status, conversation) = call(&app, get(&format!("/api/conversations/{conversation_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(conversation["last_message_at"], sent["created_at"]);
    }

    #[tokio::test]
    async fn test_invalid_input_maps_to_bad_request() {
        let app = app();

        let (status, body) = call(
            &app,
            post_message(json!({ "sender_id": U1, "receiver_id": U1, "content": "self" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_argument");

        let (status, _) = call(&app, get(&format!("/api/conversations/user/{U1}?page=0"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let conversation_id = derive_conversation_id(U1, U2).unwrap();
        let (status, body) = call(
            &app,
            get(&format!("/api/messages/conversation/{conversation_id}/before")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_argument");

        let (status, _) = call(
            &app,
            get(&format!("/api/messages/conversation/{conversation_id}/cursor?cursor=garbage")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_entities_are_not_found() {
        let app = app();
        let missing = uuid::Uuid::new_v4();

        let (status, body) = call(&app, get(&format!("/api/messages/{missing}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        let (status, _) = call(&app, get(&format!("/api/conversations/{missing}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // list read tetap kosong, bukan error
        let (status, body) = call(&app, get(&format!("/api/conversations/user/{missing}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["conversations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cursor_endpoint_walks_pages() {
        let app = app();
        for i in 0..3 {
            call(
                &app,
                post_message(json!({ "sender_id": U1, "receiver_id": U2, "content": format!("m{i}") })),
            )
            .await;
        }
        let conversation_id = derive_conversation_id(U1, U2).unwrap();

        let (status, first) = call(
            &app,
            get(&format!("/api/messages/conversation/{conversation_id}/cursor?limit=2")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["messages"][0]["content"], "m2");
        let cursor = first["next_cursor"].as_str().unwrap().to_string();

        let (_, second) = call(
            &app,
            get(&format!("/api/messages/conversation/{conversation_id}/cursor?limit=2&cursor={cursor}")),
        )
        .await;
        assert_eq!(second["messages"].as_array().unwrap().len(), 1);
        assert_eq!(second["messages"][0]["content"], "m0");
        assert!(second["next_cursor"].is_null());
    }

    #[tokio::test]
    async fn test_health_reflects_store_ping() {
        let (status, body) = call(&app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "memory");

        let mut store = MockChatStore::new();
        store
            .expect_ping()
            .returning(|| Err(StoreError::Unavailable("connection refused".into())));
        let degraded = create_router(AppState::with_store(AppConfig::default(), Arc::new(store)));

        let (status, body) = call(&degraded, get("/health")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["store"], "disconnected");
    }

    #[tokio::test]
    async fn test_store_outage_maps_to_unavailable() {
        let mut store = MockChatStore::new();
        store
            .expect_fetch_user_conversations()
            .returning(|_, _, _| Err(StoreError::Unavailable("connection refused".into())));
        let app = create_router(AppState::with_store(AppConfig::default(), Arc::new(store)));

        let (status, body) = call(&app, get(&format!("/api/conversations/user/{U1}"))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "store_unavailable");
    }
}
