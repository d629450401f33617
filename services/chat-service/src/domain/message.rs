// Domain model untuk Message
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Message immutable; satu row di messages_by_conversation dan messages_by_id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MessageRecord {
    #[sqlx(rename = "message_id")]
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    /// Mint message baru: id time-ordered (v7) dan timestamp wall-clock.
    ///
    /// Timestamp dipotong ke microsecond supaya round trip lewat store
    /// (TIMESTAMPTZ) menghasilkan clustering key yang identik.
    pub fn mint(
        conversation_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
    ) -> Self {
        Self::with_id(Uuid::now_v7(), conversation_id, sender_id, receiver_id, content)
    }

    // Mint dengan message id dari caller (retry idempotent)
    pub fn with_id(
        id: Uuid,
        conversation_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            receiver_id,
            content,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    // Apakah record ini hasil dari request yang sama (untuk retry)
    pub fn same_payload(&self, sender_id: Uuid, receiver_id: Uuid, content: &str) -> bool {
        self.sender_id == sender_id && self.receiver_id == receiver_id && self.content == content
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    /// Idempotency key. Kirim ulang id yang sama saat retry supaya
    /// fan-out converge ke row yang sama, bukan membuat duplikat.
    #[serde(default)]
    pub message_id: Option<String>,
}

// Response untuk message list (page-number)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageListResponse {
    pub messages: Vec<MessageRecord>,
    pub page: u32,
    pub limit: u32,
    /// Jumlah row di window fetch saat ini, lower bound dan bukan total global
    pub total: usize,
}

// Response untuk message list (cursor)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageCursorResponse {
    pub messages: Vec<MessageRecord>,
    pub limit: u32,
    pub next_cursor: Option<String>,
}
