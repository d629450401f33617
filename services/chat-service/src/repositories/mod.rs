//! Store access layer.
//!
//! `ChatStore` adalah seam antara service layer dan wide-column store.
//! Setiap method adalah satu operasi pada satu partition dari satu table;
//! tidak ada transaksi lintas table. Implementasi: PostgreSQL
//! (`PgChatStore`) dan ordered in-memory (`InMemoryChatStore`).

pub mod conversation_repo;
pub mod memory_store;
pub mod message_repo;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{ConversationSummary, MessageRecord, UserConversationRow};

pub use conversation_repo::ConversationRepository;
pub use memory_store::InMemoryChatStore;
pub use message_repo::MessageRepository;

// Physical tables, dipakai untuk error reporting fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    MessagesByConversation,
    MessagesById,
    ConversationsByUser,
    ConversationsById,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::MessagesByConversation => "messages_by_conversation",
            Table::MessagesById => "messages_by_id",
            Table::ConversationsByUser => "conversations_by_user",
            Table::ConversationsById => "conversations_by_id",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clustering key messages_by_conversation: `created_at DESC, message_id DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageKey {
    pub created_at: DateTime<Utc>,
    pub message_id: Uuid,
}

impl From<&MessageRecord> for MessageKey {
    fn from(message: &MessageRecord) -> Self {
        Self {
            created_at: message.created_at,
            message_id: message.id,
        }
    }
}

/// Clustering key conversations_by_user: `last_message_at DESC, conversation_id DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConversationKey {
    pub last_message_at: DateTime<Utc>,
    pub conversation_id: Uuid,
}

impl From<&UserConversationRow> for ConversationKey {
    fn from(row: &UserConversationRow) -> Self {
        Self {
            last_message_at: row.last_message_at,
            conversation_id: row.conversation_id,
        }
    }
}

// Upper bound pada clustering key (native order descending)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageBound {
    /// `created_at < ts`
    CreatedBefore(DateTime<Utc>),
    /// `(created_at, message_id) < key`, lanjutan dari cursor
    OlderThan(MessageKey),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation timed out: {0}")]
    Timeout(String),

    #[error("store schema mismatch: {0}")]
    Schema(String),
}

// Klasifikasi error driver ke kategori store
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout("connection pool acquire".to_string()),
            sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::Decode(_) => StoreError::Schema(err.to_string()),
            sqlx::Error::Database(ref db_err)
                // undefined_table, undefined_column
                if matches!(db_err.code().as_deref(), Some("42P01") | Some("42703")) =>
            {
                StoreError::Schema(err.to_string())
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn insert_message_by_conversation(&self, message: &MessageRecord) -> Result<(), StoreError>;

    /// Insert bila id belum ada. Mengembalikan row yang benar-benar
    /// tersimpan, yang bisa milik writer lain dengan `message_id` sama.
    async fn insert_message_by_id(&self, message: &MessageRecord) -> Result<MessageRecord, StoreError>;

    /// Upsert; `last_message_at` tidak pernah mundur.
    async fn upsert_user_conversation(&self, row: &UserConversationRow) -> Result<(), StoreError>;

    /// Upsert; `last_message_at` tidak pernah mundur.
    async fn upsert_conversation(&self, conversation: &ConversationSummary) -> Result<(), StoreError>;

    /// Maksimal `limit` message dari satu partition, newest first.
    async fn fetch_conversation_messages(
        &self,
        conversation_id: Uuid,
        bound: Option<MessageBound>,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, StoreError>;

    /// Maksimal `limit` conversation milik user, most recent first,
    /// mulai setelah `after` bila ada.
    async fn fetch_user_conversations(
        &self,
        user_id: Uuid,
        after: Option<ConversationKey>,
        limit: usize,
    ) -> Result<Vec<UserConversationRow>, StoreError>;

    async fn find_message(&self, message_id: Uuid) -> Result<Option<MessageRecord>, StoreError>;

    async fn find_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<ConversationSummary>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Tutup resource store saat shutdown.
    async fn close(&self);
}

// Store PostgreSQL: gabungan message dan conversation repository
#[derive(Clone)]
pub struct PgChatStore {
    pool: PgPool,
    messages: MessageRepository,
    conversations: ConversationRepository,
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            messages: MessageRepository::new(pool.clone()),
            conversations: ConversationRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn insert_message_by_conversation(&self, message: &MessageRecord) -> Result<(), StoreError> {
        self.messages.insert_by_conversation(message).await
    }

    async fn insert_message_by_id(&self, message: &MessageRecord) -> Result<MessageRecord, StoreError> {
        self.messages.insert_by_id(message).await
    }

    async fn upsert_user_conversation(&self, row: &UserConversationRow) -> Result<(), StoreError> {
        self.conversations.upsert_for_user(row).await
    }

    async fn upsert_conversation(&self, conversation: &ConversationSummary) -> Result<(), StoreError> {
        self.conversations.upsert_by_id(conversation).await
    }

    async fn fetch_conversation_messages(
        &self,
        conversation_id: Uuid,
        bound: Option<MessageBound>,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, StoreError> {
        self.messages.fetch_by_conversation(conversation_id, bound, limit).await
    }

    async fn fetch_user_conversations(
        &self,
        user_id: Uuid,
        after: Option<ConversationKey>,
        limit: usize,
    ) -> Result<Vec<UserConversationRow>, StoreError> {
        self.conversations.fetch_for_user(user_id, after, limit).await
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Option<MessageRecord>, StoreError> {
        self.messages.find_by_id(message_id).await
    }

    async fn find_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<ConversationSummary>, StoreError> {
        self.conversations.find_by_id(conversation_id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

// LIMIT untuk query SQL
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(Table::MessagesByConversation.to_string(), "messages_by_conversation");
        assert_eq!(Table::ConversationsByUser.as_str(), "conversations_by_user");
    }

    #[test]
    fn test_sqlx_error_classification() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Timeout(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::ColumnNotFound("content".into())),
            StoreError::Schema(_)
        ));
    }

    #[test]
    fn test_message_key_order_matches_clustering() {
        let ts = Utc::now();
        let older = MessageKey { created_at: ts - chrono::Duration::seconds(1), message_id: Uuid::max() };
        let tie_low = MessageKey { created_at: ts, message_id: Uuid::nil() };
        let tie_high = MessageKey { created_at: ts, message_id: Uuid::max() };

        // timestamp dulu, lalu message id sebagai tiebreak
        assert!(older < tie_low);
        assert!(tie_low < tie_high);
    }
}
