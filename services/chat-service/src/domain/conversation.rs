// Domain model untuk Conversation
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::identity::ordered_pair;
use super::message::MessageRecord;

// Summary conversation yang dikembalikan ke caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ConversationSummary {
    #[sqlx(rename = "conversation_id")]
    pub id: Uuid,
    pub user_a_id: Uuid,
    pub user_b_id: Uuid,
    pub last_message_at: DateTime<Utc>,
}

impl ConversationSummary {
    // Row conversations_by_id untuk message ini (pasangan user terurut)
    pub fn from_message(message: &MessageRecord) -> Self {
        let (user_a_id, user_b_id) = ordered_pair(message.sender_id, message.receiver_id);
        Self {
            id: message.conversation_id,
            user_a_id,
            user_b_id,
            last_message_at: message.created_at,
        }
    }
}

// Row conversations_by_user: satu per (user, conversation)
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserConversationRow {
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub other_user_id: Uuid,
    pub last_message_at: DateTime<Utc>,
}

impl UserConversationRow {
    /// Dua row untuk satu message, dari sudut pandang sender dan receiver.
    pub fn pair_for(message: &MessageRecord) -> [Self; 2] {
        [
            Self {
                user_id: message.sender_id,
                conversation_id: message.conversation_id,
                other_user_id: message.receiver_id,
                last_message_at: message.created_at,
            },
            Self {
                user_id: message.receiver_id,
                conversation_id: message.conversation_id,
                other_user_id: message.sender_id,
                last_message_at: message.created_at,
            },
        ]
    }

    // user_a = pemilik partition, user_b = lawan bicara
    pub fn into_summary(self) -> ConversationSummary {
        ConversationSummary {
            id: self.conversation_id,
            user_a_id: self.user_id,
            user_b_id: self.other_user_id,
            last_message_at: self.last_message_at,
        }
    }
}

// Response untuk conversation list (page-number)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationSummary>,
    pub page: u32,
    pub limit: u32,
    /// Jumlah row di window fetch saat ini, lower bound dan bukan total global
    pub total: usize,
}

// Response untuk conversation list (cursor)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationCursorResponse {
    pub conversations: Vec<ConversationSummary>,
    pub limit: u32,
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation_id_for;

    fn message() -> MessageRecord {
        let sender = Uuid::parse_str("9d4f1a20-6c3b-4e7a-8b59-2e1c0f8d7a36").unwrap();
        let receiver = Uuid::parse_str("0b7e3c52-1f0a-4d8e-9c61-5a2f7d9e4b10").unwrap();
        let conversation = conversation_id_for(sender, receiver).unwrap();
        MessageRecord::mint(conversation, sender, receiver, "hi".into())
    }

    #[test]
    fn test_pair_rows_mirror_each_other() {
        let message = message();
        let [sender_row, receiver_row] = UserConversationRow::pair_for(&message);

        assert_eq!(sender_row.user_id, message.sender_id);
        assert_eq!(sender_row.other_user_id, message.receiver_id);
        assert_eq!(receiver_row.user_id, message.receiver_id);
        assert_eq!(receiver_row.other_user_id, message.sender_id);
        assert_eq!(sender_row.last_message_at, receiver_row.last_message_at);
        assert_eq!(sender_row.conversation_id, receiver_row.conversation_id);
    }

    #[test]
    fn test_summary_pair_is_sorted() {
        let message = message();
        let summary = ConversationSummary::from_message(&message);

        // receiver memiliki UUID lebih kecil
        assert_eq!(summary.user_a_id, message.receiver_id);
        assert_eq!(summary.user_b_id, message.sender_id);
    }

    #[test]
    fn test_user_row_summary_is_viewer_first() {
        let message = message();
        let [_, receiver_row] = UserConversationRow::pair_for(&message);
        let summary = receiver_row.into_summary();

        assert_eq!(summary.id, message.conversation_id);
        assert_eq!(summary.user_a_id, message.receiver_id);
        assert_eq!(summary.user_b_id, message.sender_id);
    }
}
