//! Query router: setiap read pattern dilayani satu partition dari satu table.
//!
//! | read                         | table                      | partition         |
//! |------------------------------|----------------------------|-------------------|
//! | conversations milik user     | `conversations_by_user`    | `user_id`         |
//! | messages dalam conversation  | `messages_by_conversation` | `conversation_id` |
//! | messages sebelum timestamp   | `messages_by_conversation` | `conversation_id` |
//! | conversation by id           | `conversations_by_id`      | `conversation_id` |
//! | message by id                | `messages_by_id`           | `message_id`      |
//!
//! Partition yang kosong dan partition yang tidak ada tidak dibedakan: list
//! read mengembalikan halaman kosong, bukan error.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use shared::utils::validation::parse_identifier;
use shared::{Page, PageRequest};

use super::pagination::{cursor_limit, decode_cursor, into_cursor_page, CursorPage};
use super::{timed, ChatSettings};
use crate::domain::{ConversationSummary, MessageRecord, UserConversationRow};
use crate::error::AppError;
use crate::repositories::{ChatStore, ConversationKey, MessageBound, MessageKey, StoreError};

#[derive(Clone)]
pub struct QueryRouter {
    store: Arc<dyn ChatStore>,
    settings: ChatSettings,
}

impl QueryRouter {
    pub fn new(store: Arc<dyn ChatStore>, settings: ChatSettings) -> Self {
        Self { store, settings }
    }

    // Read gagal secara utuh: tidak ada partial page
    async fn read<T, F>(&self, operation: &'static str, future: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        timed(self.settings.store_timeout, operation, future)
            .await
            .map_err(|err| {
                tracing::warn!(operation, error = %err, "Store read failed");
                AppError::from(err)
            })
    }

    fn page_request(&self, page: i64, limit: i64) -> Result<PageRequest, AppError> {
        Ok(PageRequest::new(page, limit, self.settings.max_page_limit)?)
    }

    /// Conversations milik user, most recent first.
    pub async fn get_user_conversations(
        &self,
        user_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<Page<ConversationSummary>, AppError> {
        let user_id = parse_identifier("user_id", user_id)?;
        let request = self.page_request(page, limit)?;

        let rows = self
            .read(
                "fetch_user_conversations",
                self.store.fetch_user_conversations(user_id, None, request.window()),
            )
            .await?;

        Ok(request.slice(rows).map(UserConversationRow::into_summary))
    }

    /// Messages dalam conversation, newest first.
    pub async fn get_conversation_messages(
        &self,
        conversation_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<Page<MessageRecord>, AppError> {
        let conversation_id = parse_identifier("conversation_id", conversation_id)?;
        let request = self.page_request(page, limit)?;

        let rows = self
            .read(
                "fetch_conversation_messages",
                self.store
                    .fetch_conversation_messages(conversation_id, None, request.window()),
            )
            .await?;

        Ok(request.slice(rows))
    }

    /// Messages dengan `created_at < before`, newest first. Bound diterapkan
    /// di store sebelum slicing halaman.
    ///
    /// `before` dipotong ke microsecond, presisi yang sama dengan
    /// `created_at` yang tersimpan, supaya semua backend membandingkan nilai
    /// yang sama.
    pub async fn get_messages_before(
        &self,
        conversation_id: &str,
        before: DateTime<Utc>,
        page: i64,
        limit: i64,
    ) -> Result<Page<MessageRecord>, AppError> {
        let conversation_id = parse_identifier("conversation_id", conversation_id)?;
        let request = self.page_request(page, limit)?;
        let before = before.trunc_subsecs(6);

        let rows = self
            .read(
                "fetch_conversation_messages",
                self.store.fetch_conversation_messages(
                    conversation_id,
                    Some(MessageBound::CreatedBefore(before)),
                    request.window(),
                ),
            )
            .await?;

        Ok(request.slice(rows))
    }

    /// Messages setelah cursor (lebih lama dari row terakhir yang dilihat).
    pub async fn get_conversation_messages_after_cursor(
        &self,
        conversation_id: &str,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<CursorPage<MessageRecord>, AppError> {
        let conversation_id = parse_identifier("conversation_id", conversation_id)?;
        let limit = cursor_limit(limit, self.settings.max_page_limit)?;
        let after = decode_cursor::<MessageKey>(cursor)?;

        let rows = self
            .read(
                "fetch_conversation_messages",
                self.store.fetch_conversation_messages(
                    conversation_id,
                    after.map(MessageBound::OlderThan),
                    limit as usize + 1,
                ),
            )
            .await?;

        Ok(into_cursor_page(rows, limit, |message| MessageKey::from(message)))
    }

    /// Conversations milik user setelah cursor.
    pub async fn get_user_conversations_after_cursor(
        &self,
        user_id: &str,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<CursorPage<ConversationSummary>, AppError> {
        let user_id = parse_identifier("user_id", user_id)?;
        let limit = cursor_limit(limit, self.settings.max_page_limit)?;
        let after = decode_cursor::<ConversationKey>(cursor)?;

        let rows = self
            .read(
                "fetch_user_conversations",
                self.store.fetch_user_conversations(user_id, after, limit as usize + 1),
            )
            .await?;

        Ok(into_cursor_page(rows, limit, |row| ConversationKey::from(row))
            .map(UserConversationRow::into_summary))
    }

    pub async fn get_conversation(&self, conversation_id: &str) -> Result<ConversationSummary, AppError> {
        let conversation_id = parse_identifier("conversation_id", conversation_id)?;

        self.read(
            "find_conversation",
            self.store.find_conversation(conversation_id),
        )
        .await?
        .ok_or_else(|| AppError::not_found(format!("conversation {conversation_id} not found")))
    }

    pub async fn get_message(&self, message_id: &str) -> Result<MessageRecord, AppError> {
        let message_id = parse_identifier("message_id", message_id)?;

        self.read("find_message", self.store.find_message(message_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("message {message_id} not found")))
    }
}
