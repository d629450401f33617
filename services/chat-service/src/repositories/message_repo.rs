// Repository untuk messages_by_conversation dan messages_by_id
use sqlx::PgPool;
use uuid::Uuid;

use super::{sql_limit, MessageBound, StoreError};
use crate::domain::MessageRecord;

const SELECT_BY_CONVERSATION: &str = "SELECT message_id, conversation_id, sender_id, receiver_id, content, created_at
     FROM messages_by_conversation WHERE conversation_id = $1";

const NEWEST_FIRST: &str = "ORDER BY created_at DESC, message_id DESC";

// Repository untuk message tables
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    // Create new message repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Insert ke partition conversation; message immutable jadi replay = no-op
    pub async fn insert_by_conversation(&self, message: &MessageRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO messages_by_conversation (
                conversation_id, created_at, message_id, sender_id, receiver_id, content
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (conversation_id, created_at, message_id) DO NOTHING
            "#,
        )
        .bind(message.conversation_id)
        .bind(message.created_at)
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.content)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // Insert ke messages_by_id; kalau id sudah ada, kembalikan row yang menang
    pub async fn insert_by_id(&self, message: &MessageRecord) -> Result<MessageRecord, StoreError> {
        let inserted = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages_by_id (
                message_id, conversation_id, sender_id, receiver_id, content, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (message_id) DO NOTHING
            RETURNING message_id, conversation_id, sender_id, receiver_id, content, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.content)
        .bind(message.created_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row);
        }

        // Conflict: row milik writer lain sudah ada
        self.find_by_id(message.id).await?.ok_or_else(|| {
            StoreError::Unavailable(format!(
                "message {} conflicted on insert but could not be read back",
                message.id
            ))
        })
    }

    // Range scan satu partition, newest first, dengan optional upper bound
    pub async fn fetch_by_conversation(
        &self,
        conversation_id: Uuid,
        bound: Option<MessageBound>,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, StoreError> {
        let rows = match bound {
            None => {
                let sql = format!("{SELECT_BY_CONVERSATION} {NEWEST_FIRST} LIMIT $2");
                sqlx::query_as::<_, MessageRecord>(&sql)
                    .bind(conversation_id)
                    .bind(sql_limit(limit))
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(MessageBound::CreatedBefore(before)) => {
                let sql = format!(
                    "{SELECT_BY_CONVERSATION} AND created_at < $2 {NEWEST_FIRST} LIMIT $3"
                );
                sqlx::query_as::<_, MessageRecord>(&sql)
                    .bind(conversation_id)
                    .bind(before)
                    .bind(sql_limit(limit))
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(MessageBound::OlderThan(key)) => {
                let sql = format!(
                    "{SELECT_BY_CONVERSATION} AND (created_at, message_id) < ($2, $3) {NEWEST_FIRST} LIMIT $4"
                );
                sqlx::query_as::<_, MessageRecord>(&sql)
                    .bind(conversation_id)
                    .bind(key.created_at)
                    .bind(key.message_id)
                    .bind(sql_limit(limit))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows)
    }

    // Get message by ID
    pub async fn find_by_id(&self, message_id: Uuid) -> Result<Option<MessageRecord>, StoreError> {
        let row = sqlx::query_as::<_, MessageRecord>(
            "SELECT message_id, conversation_id, sender_id, receiver_id, content, created_at
             FROM messages_by_id WHERE message_id = $1",
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
