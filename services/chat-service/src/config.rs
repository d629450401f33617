// Konfigurasi Chat Service dari environment variables
use serde::Serialize;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::repositories::{ChatStore, InMemoryChatStore, PgChatStore};
use crate::services::{ChatService, ChatSettings};

// Health check response structure
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthCheckResponse {
    pub service: String,
    pub status: String,
    pub version: String,
    pub store: String,
    pub backend: String,
    pub checked_at: String,
}

// Backend penyimpanan untuk ChatStore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("STORE_BACKEND tidak dikenal: {other} (postgres | memory)")),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Postgres => write!(f, "postgres"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

// Application configuration yang di-load dari environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub store_backend: StoreBackend,
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub store_timeout_ms: u64,
    pub max_message_length: usize,
    pub default_page_limit: u32,
    pub max_page_limit: u32,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub run_migrations: bool,
    pub frontend_url: Option<String>,
}

// Parse env var opsional; nilai yang tidak valid menggagalkan startup
fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| format!("{key} tidak valid: {raw}")),
        _ => Ok(default),
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl AppConfig {
    // Load semua konfigurasi dari environment variables dengan validasi
    pub fn from_env() -> Result<Self, String> {
        let store_backend: StoreBackend = match optional_var("STORE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StoreBackend::Postgres,
        };

        let database_url = optional_var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err("DATABASE_URL harus diset untuk STORE_BACKEND=postgres".to_string());
        }

        let config = AppConfig {
            database_url,
            store_backend,
            server_host: optional_var("CHAT_SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_var("CHAT_SERVICE_PORT", 3006)?,
            environment: optional_var("RUST_ENV").unwrap_or_else(|| "development".to_string()),
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS", 2000)?,
            max_message_length: parse_var("MAX_MESSAGE_LENGTH", 2000)?,
            default_page_limit: parse_var("DEFAULT_PAGE_LIMIT", 20)?,
            max_page_limit: parse_var("MAX_PAGE_LIMIT", 100)?,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
            db_min_connections: parse_var("DB_MIN_CONNECTIONS", 2)?,
            run_migrations: parse_var("RUN_MIGRATIONS", true)?,
            frontend_url: optional_var("FRONTEND_URL"),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.store_timeout_ms == 0 {
            return Err("STORE_TIMEOUT_MS harus lebih dari 0".to_string());
        }
        if self.max_message_length == 0 {
            return Err("MAX_MESSAGE_LENGTH harus lebih dari 0".to_string());
        }
        if self.max_page_limit == 0 {
            return Err("MAX_PAGE_LIMIT harus lebih dari 0".to_string());
        }
        if self.default_page_limit == 0 || self.default_page_limit > self.max_page_limit {
            return Err(format!(
                "DEFAULT_PAGE_LIMIT harus di antara 1 dan MAX_PAGE_LIMIT ({})",
                self.max_page_limit
            ));
        }
        if self.db_min_connections > self.db_max_connections {
            return Err("DB_MIN_CONNECTIONS tidak boleh lebih besar dari DB_MAX_CONNECTIONS".to_string());
        }
        if let Some(url) = &self.frontend_url {
            axum::http::HeaderValue::from_str(url)
                .map_err(|_| format!("FRONTEND_URL harus valid origin: {url}"))?;
        }
        Ok(())
    }

    // Helper cek production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            max_message_length: self.max_message_length,
            max_page_limit: self.max_page_limit,
        }
    }
}

impl Default for AppConfig {
    // Konfigurasi lokal: in-memory store, tanpa database
    fn default() -> Self {
        let settings = ChatSettings::default();
        Self {
            database_url: None,
            store_backend: StoreBackend::Memory,
            server_host: "0.0.0.0".to_string(),
            server_port: 3006,
            environment: "development".to_string(),
            store_timeout_ms: settings.store_timeout.as_millis() as u64,
            max_message_length: settings.max_message_length,
            default_page_limit: 20,
            max_page_limit: settings.max_page_limit,
            db_max_connections: 10,
            db_min_connections: 2,
            run_migrations: false,
            frontend_url: None,
        }
    }
}

// Inisialisasi database connection pool
pub async fn init_db_pool(config: &AppConfig, database_url: &str) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Initializing chat store connection pool...");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_millis(config.store_timeout_ms))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    tracing::info!("Chat store pool initialized (max {} connections)", config.db_max_connections);
    Ok(pool)
}

// Application state yang di-share ke semua handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub chat: ChatService,
}

impl AppState {
    // Bangun store sesuai backend lalu rakit ChatService di atasnya
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ChatStore> = match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL harus diset untuk STORE_BACKEND=postgres"))?;
                let pool = init_db_pool(&config, database_url).await?;

                if config.run_migrations {
                    tracing::info!("Running chat store migrations...");
                    sqlx::migrate!("./migrations").run(&pool).await?;
                }

                Arc::new(PgChatStore::new(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory chat store; data hilang saat restart");
                Arc::new(InMemoryChatStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn ChatStore>) -> Self {
        let chat = ChatService::new(store, config.chat_settings());
        Self {
            config: Arc::new(config),
            chat,
        }
    }
}
