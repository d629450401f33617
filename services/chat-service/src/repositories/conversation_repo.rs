// Repository untuk conversations_by_user dan conversations_by_id
use sqlx::PgPool;
use uuid::Uuid;

use super::{sql_limit, ConversationKey, StoreError};
use crate::domain::{ConversationSummary, UserConversationRow};

// Repository untuk conversation tables
#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    // membuat new conversation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Upsert row milik satu participant; GREATEST menjaga recency monotonic
    pub async fn upsert_for_user(&self, row: &UserConversationRow) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO conversations_by_user (user_id, conversation_id, other_user_id, last_message_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, conversation_id)
            DO UPDATE SET
                other_user_id = EXCLUDED.other_user_id,
                last_message_at = GREATEST(conversations_by_user.last_message_at, EXCLUDED.last_message_at)
            "#,
        )
        .bind(row.user_id)
        .bind(row.conversation_id)
        .bind(row.other_user_id)
        .bind(row.last_message_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Upsert row conversations_by_id
    pub async fn upsert_by_id(&self, conversation: &ConversationSummary) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO conversations_by_id (conversation_id, user_a_id, user_b_id, last_message_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (conversation_id)
            DO UPDATE SET
                last_message_at = GREATEST(conversations_by_id.last_message_at, EXCLUDED.last_message_at)
            "#,
        )
        .bind(conversation.id)
        .bind(conversation.user_a_id)
        .bind(conversation.user_b_id)
        .bind(conversation.last_message_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Get conversations for user, most recent first
    pub async fn fetch_for_user(
        &self,
        user_id: Uuid,
        after: Option<ConversationKey>,
        limit: usize,
    ) -> Result<Vec<UserConversationRow>, StoreError> {
        let rows = match after {
            None => {
                sqlx::query_as::<_, UserConversationRow>(
                    "SELECT user_id, conversation_id, other_user_id, last_message_at
                     FROM conversations_by_user WHERE user_id = $1
                     ORDER BY last_message_at DESC, conversation_id DESC LIMIT $2",
                )
                .bind(user_id)
                .bind(sql_limit(limit))
                .fetch_all(&self.pool)
                .await?
            }
            Some(key) => {
                sqlx::query_as::<_, UserConversationRow>(
                    "SELECT user_id, conversation_id, other_user_id, last_message_at
                     FROM conversations_by_user
                     WHERE user_id = $1 AND (last_message_at, conversation_id) < ($2, $3)
                     ORDER BY last_message_at DESC, conversation_id DESC LIMIT $4",
                )
                .bind(user_id)
                .bind(key.last_message_at)
                .bind(key.conversation_id)
                .bind(sql_limit(limit))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    // Get conversation by ID
    pub async fn find_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<ConversationSummary>, StoreError> {
        let row = sqlx::query_as::<_, ConversationSummary>(
            "SELECT conversation_id, user_a_id, user_b_id, last_message_at
             FROM conversations_by_id WHERE conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
