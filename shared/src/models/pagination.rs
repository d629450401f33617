//! Page-number pagination di atas store yang tidak punya OFFSET.
//!
//! Caller meminta `(page, limit)`; store diminta `page * limit` baris pertama
//! dalam clustering order-nya, lalu slicing `skip (page-1)*limit, take limit`
//! dilakukan di sini. Ini hanya compatibility shim: biayanya tumbuh linear
//! terhadap nomor halaman. Read path yang scalable memakai cursor (clustering
//! key terakhir yang dilihat) sehingga store cukup membaca `limit` baris.

use serde::Serialize;

use crate::utils::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    // Validasi page/limit mentah dari caller
    pub fn new(page: i64, limit: i64, max_limit: u32) -> Result<Self, ValidationError> {
        if page < 1 {
            return Err(ValidationError::InvalidPage(page));
        }
        if limit < 1 {
            return Err(ValidationError::InvalidLimit(limit));
        }
        if limit > i64::from(max_limit) {
            return Err(ValidationError::LimitTooLarge {
                max: max_limit,
                actual: limit,
            });
        }

        let page = u32::try_from(page).map_err(|_| ValidationError::WindowOverflow)?;
        let limit = limit as u32;

        (page as usize)
            .checked_mul(limit as usize)
            .ok_or(ValidationError::WindowOverflow)?;

        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Jumlah baris yang dilewati sebelum halaman ini.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }

    /// Jumlah baris yang harus diambil dari store agar halaman ini lengkap.
    pub fn window(&self) -> usize {
        self.page as usize * self.limit as usize
    }

    /// Slice hasil fetch (sudah dalam native order) menjadi satu halaman.
    ///
    /// `total` adalah jumlah baris yang benar-benar terambil di window ini,
    /// bukan jumlah global partition. Anggap sebagai lower bound.
    pub fn slice<T>(&self, rows: Vec<T>) -> Page<T> {
        let total = rows.len();
        let items = rows
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect();

        Page {
            items,
            page: self.page,
            limit: self.limit,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }
}
