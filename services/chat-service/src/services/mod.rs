// Service layer: write fan-out, pagination, query routing
pub mod pagination;
pub mod query;
pub mod writer;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::repositories::{ChatStore, StoreError};

pub use query::QueryRouter;
pub use writer::MessageWriter;

// Batasan operasional yang berasal dari AppConfig
#[derive(Debug, Clone, Copy)]
pub struct ChatSettings {
    pub store_timeout: Duration,
    pub max_message_length: usize,
    pub max_page_limit: u32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(2),
            max_message_length: 2000,
            max_page_limit: 100,
        }
    }
}

/// Writer dan query router yang berbagi satu store handle.
#[derive(Clone)]
pub struct ChatService {
    pub writer: MessageWriter,
    pub queries: QueryRouter,
    store: Arc<dyn ChatStore>,
    settings: ChatSettings,
}

impl ChatService {
    pub fn new(store: Arc<dyn ChatStore>, settings: ChatSettings) -> Self {
        Self {
            writer: MessageWriter::new(store.clone(), settings),
            queries: QueryRouter::new(store.clone(), settings),
            store,
            settings,
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        timed(self.settings.store_timeout, "ping", self.store.ping()).await
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}

/// Jalankan satu operasi store dengan timeout.
pub(crate) async fn timed<T, F>(limit: Duration, operation: &'static str, future: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(format!(
            "{operation} after {}ms",
            limit.as_millis()
        ))),
    }
}
