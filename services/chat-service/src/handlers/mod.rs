// HTTP handlers: tipis, semua logika ada di services
pub mod conversations;
pub mod messages;

use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::AppState;

// Query parameters untuk page-number pagination
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Nomor halaman, mulai dari 1
    pub page: Option<i64>,
    /// Jumlah item per halaman
    pub limit: Option<i64>,
}

// Query parameters untuk cursor pagination
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CursorQuery {
    /// Token `next_cursor` dari halaman sebelumnya; kosong untuk halaman pertama
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

impl PageQuery {
    // Default page 1 dan DEFAULT_PAGE_LIMIT; validasi tetap di service
    pub fn resolve(&self, state: &AppState) -> (i64, i64) {
        (
            self.page.unwrap_or(1),
            self.limit.unwrap_or(state.config.default_page_limit as i64),
        )
    }
}

impl CursorQuery {
    pub fn limit(&self, state: &AppState) -> i64 {
        self.limit.unwrap_or(state.config.default_page_limit as i64)
    }
}
