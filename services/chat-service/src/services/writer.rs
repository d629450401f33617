//! Write fan-out.
//!
//! Satu message ditulis ke setiap denormalized table yang dibutuhkan read
//! path. Store tidak punya transaksi lintas table, jadi urutannya:
//!
//! 1. `messages_by_id`
//! 2. `messages_by_conversation`
//! 3. dua row `conversations_by_user` + `conversations_by_id`, paralel
//!
//! Setelah langkah 2 message dianggap terkirim. Kegagalan di langkah 3
//! meninggalkan window inkonsistensi yang terbatas (daftar conversation
//! user belum mencerminkan message terbaru), dilaporkan sebagai
//! `AppError::FanOut { durable: true }` dan tidak di-rollback.
//! `messages_by_id` ditulis pertama supaya retry dengan `message_id` yang
//! sama selalu menemukan `created_at` asli dan tidak membuat row duplikat
//! di partition conversation. Dua request dengan id sama yang berjalan
//! bersamaan bisa sama-sama lolos `find_message`; insert ke
//! `messages_by_id` mengembalikan row pemenang dan sisa fan-out memakai
//! row itu.

use std::sync::Arc;

use shared::utils::validation::{parse_identifier, validate_content};
use uuid::Uuid;

use super::{timed, ChatSettings};
use crate::domain::{
    conversation_id_for, ConversationSummary, MessageRecord, SendMessageRequest,
    UserConversationRow,
};
use crate::error::AppError;
use crate::repositories::{ChatStore, StoreError, Table};

#[derive(Clone)]
pub struct MessageWriter {
    store: Arc<dyn ChatStore>,
    settings: ChatSettings,
}

impl MessageWriter {
    pub fn new(store: Arc<dyn ChatStore>, settings: ChatSettings) -> Self {
        Self { store, settings }
    }

    /// Kirim message dari sender ke receiver.
    ///
    /// Semua validasi terjadi sebelum store disentuh. Conversation tidak
    /// perlu dibuat terlebih dulu: id-nya diturunkan dari pasangan user dan
    /// row conversation di-upsert oleh fan-out.
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<MessageRecord, AppError> {
        let sender_id = parse_identifier("sender_id", &request.sender_id)?;
        let receiver_id = parse_identifier("receiver_id", &request.receiver_id)?;
        let conversation_id = conversation_id_for(sender_id, receiver_id)?;
        validate_content(&request.content, self.settings.max_message_length)?;
        let requested_id = request
            .message_id
            .as_deref()
            .map(|raw| parse_identifier("message_id", raw))
            .transpose()?;

        let message = match requested_id {
            Some(message_id) => {
                self.resolve_retry(message_id, conversation_id, sender_id, receiver_id, &request.content)
                    .await?
            }
            None => MessageRecord::mint(conversation_id, sender_id, receiver_id, request.content.clone()),
        };

        let message = self.fan_out(message).await?;

        tracing::info!(
            message_id = %message.id,
            conversation_id = %message.conversation_id,
            sender_id = %message.sender_id,
            "Message sent"
        );

        Ok(message)
    }

    // Message id dari caller: pakai record lama bila sudah ada, supaya
    // fan-out di-replay sebagai upsert ke row yang sama
    async fn resolve_retry(
        &self,
        message_id: Uuid,
        conversation_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
    ) -> Result<MessageRecord, AppError> {
        let existing = timed(
            self.settings.store_timeout,
            "find_message",
            self.store.find_message(message_id),
        )
        .await?;

        match existing {
            Some(existing) if existing.same_payload(sender_id, receiver_id, content) => {
                tracing::info!(message_id = %message_id, "Replaying fan-out for retried message");
                Ok(existing)
            }
            Some(_) => Err(AppError::invalid_argument(format!(
                "message_id {message_id} already belongs to a different message"
            ))),
            None => Ok(MessageRecord::with_id(
                message_id,
                conversation_id,
                sender_id,
                receiver_id,
                content.to_string(),
            )),
        }
    }

    // Mengembalikan record yang tersimpan di messages_by_id; langkah
    // berikutnya selalu memakai record itu
    async fn fan_out(&self, candidate: MessageRecord) -> Result<MessageRecord, AppError> {
        let limit = self.settings.store_timeout;

        let stored = timed(
            limit,
            Table::MessagesById.as_str(),
            self.store.insert_message_by_id(&candidate),
        )
        .await
        .map_err(|err| fan_out_error(Table::MessagesById, &candidate, false, err))?;

        // Writer lain dengan message_id yang sama menang lebih dulu
        let record = if stored == candidate {
            candidate
        } else if stored.same_payload(candidate.sender_id, candidate.receiver_id, &candidate.content) {
            tracing::info!(message_id = %stored.id, "Concurrent retry; continuing with stored record");
            stored
        } else {
            return Err(AppError::invalid_argument(format!(
                "message_id {} already belongs to a different message",
                stored.id
            )));
        };
        let message = &record;

        timed(
            limit,
            Table::MessagesByConversation.as_str(),
            self.store.insert_message_by_conversation(message),
        )
        .await
        .map_err(|err| fan_out_error(Table::MessagesByConversation, message, false, err))?;

        let [sender_row, receiver_row] = UserConversationRow::pair_for(message);
        let conversation = ConversationSummary::from_message(message);

        // Semua row conversation dicoba, walaupun salah satunya gagal
        let (sender_result, receiver_result, conversation_result) = tokio::join!(
            timed(
                limit,
                Table::ConversationsByUser.as_str(),
                self.store.upsert_user_conversation(&sender_row),
            ),
            timed(
                limit,
                Table::ConversationsByUser.as_str(),
                self.store.upsert_user_conversation(&receiver_row),
            ),
            timed(
                limit,
                Table::ConversationsById.as_str(),
                self.store.upsert_conversation(&conversation),
            ),
        );

        let mut first_failure = None;
        for (table, result) in [
            (Table::ConversationsByUser, sender_result),
            (Table::ConversationsByUser, receiver_result),
            (Table::ConversationsById, conversation_result),
        ] {
            if let Err(err) = result {
                let err = fan_out_error(table, message, true, err);
                first_failure.get_or_insert(err);
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(record),
        }
    }
}

// Partial fan-out harus terlihat di log, tidak boleh tertelan
fn fan_out_error(table: Table, message: &MessageRecord, durable: bool, err: StoreError) -> AppError {
    tracing::error!(
        table = %table,
        message_id = %message.id,
        conversation_id = %message.conversation_id,
        durable,
        error = %err,
        "Fan-out write failed"
    );

    AppError::FanOut {
        table,
        message_id: message.id,
        durable,
        reason: err.to_string(),
    }
}
