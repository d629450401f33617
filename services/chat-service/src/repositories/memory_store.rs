// In-memory wide-column store: partition = HashMap key, clustering = BTreeMap
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChatStore, ConversationKey, MessageBound, MessageKey, StoreError};
use crate::domain::{ConversationSummary, MessageRecord, UserConversationRow};

// Partition conversations_by_user untuk satu user.
// Clustering key berisi last_message_at, jadi update recency = hapus row lama
// lalu tulis row baru (seperti di Cassandra); `latest` menunjuk row aktif.
#[derive(Default)]
struct UserPartition {
    by_recency: BTreeMap<ConversationKey, Uuid>,
    latest: HashMap<Uuid, DateTime<Utc>>,
}

impl UserPartition {
    fn upsert(&mut self, row: &UserConversationRow) {
        let conversation_id = row.conversation_id;

        if let Some(&previous) = self.latest.get(&conversation_id) {
            if previous >= row.last_message_at {
                // recency tidak boleh mundur; cukup refresh other_user_id
                let key = ConversationKey {
                    last_message_at: previous,
                    conversation_id,
                };
                self.by_recency.insert(key, row.other_user_id);
                return;
            }
            self.by_recency.remove(&ConversationKey {
                last_message_at: previous,
                conversation_id,
            });
        }

        self.by_recency.insert(ConversationKey::from(row), row.other_user_id);
        self.latest.insert(conversation_id, row.last_message_at);
    }
}

#[derive(Default)]
struct Tables {
    messages_by_conversation: HashMap<Uuid, BTreeMap<MessageKey, MessageRecord>>,
    messages_by_id: HashMap<Uuid, MessageRecord>,
    conversations_by_user: HashMap<Uuid, UserPartition>,
    conversations_by_id: HashMap<Uuid, ConversationSummary>,
}

/// Ordered in-memory store. Dipakai untuk development (`STORE_BACKEND=memory`)
/// dan sebagai store double di test.
#[derive(Default)]
pub struct InMemoryChatStore {
    tables: RwLock<Tables>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn insert_message_by_conversation(&self, message: &MessageRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .messages_by_conversation
            .entry(message.conversation_id)
            .or_default()
            .entry(MessageKey::from(message))
            .or_insert_with(|| message.clone());
        Ok(())
    }

    async fn insert_message_by_id(&self, message: &MessageRecord) -> Result<MessageRecord, StoreError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .messages_by_id
            .entry(message.id)
            .or_insert_with(|| message.clone());
        Ok(stored.clone())
    }

    async fn upsert_user_conversation(&self, row: &UserConversationRow) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .conversations_by_user
            .entry(row.user_id)
            .or_default()
            .upsert(row);
        Ok(())
    }

    async fn upsert_conversation(&self, conversation: &ConversationSummary) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .conversations_by_id
            .entry(conversation.id)
            .and_modify(|existing| {
                if conversation.last_message_at > existing.last_message_at {
                    existing.last_message_at = conversation.last_message_at;
                }
            })
            .or_insert_with(|| conversation.clone());
        Ok(())
    }

    async fn fetch_conversation_messages(
        &self,
        conversation_id: Uuid,
        bound: Option<MessageBound>,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, StoreError> {
        let tables = self.tables.read().await;
        let Some(partition) = tables.messages_by_conversation.get(&conversation_id) else {
            return Ok(Vec::new());
        };

        let upper = match bound {
            None => None,
            // nil adalah UUID terkecil, jadi semua row dengan created_at == ts ikut terpotong
            Some(MessageBound::CreatedBefore(before)) => Some(MessageKey {
                created_at: before,
                message_id: Uuid::nil(),
            }),
            Some(MessageBound::OlderThan(key)) => Some(key),
        };

        let rows = match upper {
            None => partition.values().rev().take(limit).cloned().collect(),
            Some(upper) => partition
                .range(..upper)
                .rev()
                .take(limit)
                .map(|(_, message)| message.clone())
                .collect(),
        };

        Ok(rows)
    }

    async fn fetch_user_conversations(
        &self,
        user_id: Uuid,
        after: Option<ConversationKey>,
        limit: usize,
    ) -> Result<Vec<UserConversationRow>, StoreError> {
        let tables = self.tables.read().await;
        let Some(partition) = tables.conversations_by_user.get(&user_id) else {
            return Ok(Vec::new());
        };

        let to_row = |(key, other_user_id): (&ConversationKey, &Uuid)| UserConversationRow {
            user_id,
            conversation_id: key.conversation_id,
            other_user_id: *other_user_id,
            last_message_at: key.last_message_at,
        };

        let rows = match after {
            None => partition.by_recency.iter().rev().take(limit).map(to_row).collect(),
            Some(after) => partition
                .by_recency
                .range(..after)
                .rev()
                .take(limit)
                .map(to_row)
                .collect(),
        };

        Ok(rows)
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Option<MessageRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.messages_by_id.get(&message_id).cloned())
    }

    async fn find_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<ConversationSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.conversations_by_id.get(&conversation_id).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}
}
