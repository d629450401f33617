//! Cursor pagination.
//!
//! Cursor adalah clustering key terakhir yang dilihat caller, di-encode
//! sebagai token opaque. Halaman berikutnya = "row setelah cursor dalam
//! native order, limit N", jadi store tidak pernah membaca ulang halaman
//! sebelumnya. Page-number pagination (`shared::PageRequest`) hanya shim
//! kompatibilitas di atas fetch-and-slice.

use chrono::{DateTime, Utc};
use shared::{PageRequest, ValidationError};
use uuid::Uuid;

use crate::repositories::{ConversationKey, MessageKey};

const TOKEN_SEPARATOR: char = '.';

// Clustering key yang bisa dijadikan cursor token
pub trait CursorKey: Sized {
    fn encode(&self) -> String;
    fn decode(token: &str) -> Result<Self, ValidationError>;
}

fn encode_parts(at: DateTime<Utc>, id: Uuid) -> String {
    format!("{}{}{}", at.timestamp_micros(), TOKEN_SEPARATOR, id.simple())
}

fn decode_parts(token: &str) -> Result<(DateTime<Utc>, Uuid), ValidationError> {
    let invalid = || ValidationError::InvalidCursor(token.to_string());

    let (micros, id) = token.trim().split_once(TOKEN_SEPARATOR).ok_or_else(invalid)?;
    let micros: i64 = micros.parse().map_err(|_| invalid())?;
    let at = DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(invalid)?;
    let id = Uuid::parse_str(id).map_err(|_| invalid())?;

    Ok((at, id))
}

impl CursorKey for MessageKey {
    fn encode(&self) -> String {
        encode_parts(self.created_at, self.message_id)
    }

    fn decode(token: &str) -> Result<Self, ValidationError> {
        let (created_at, message_id) = decode_parts(token)?;
        Ok(Self {
            created_at,
            message_id,
        })
    }
}

impl CursorKey for ConversationKey {
    fn encode(&self) -> String {
        encode_parts(self.last_message_at, self.conversation_id)
    }

    fn decode(token: &str) -> Result<Self, ValidationError> {
        let (last_message_at, conversation_id) = decode_parts(token)?;
        Ok(Self {
            last_message_at,
            conversation_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub limit: u32,
    pub next_cursor: Option<String>,
}

impl<T> CursorPage<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> CursorPage<U> {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            limit: self.limit,
            next_cursor: self.next_cursor,
        }
    }
}

// Validasi limit cursor read dengan aturan yang sama seperti page read
pub fn cursor_limit(limit: i64, max_limit: u32) -> Result<u32, ValidationError> {
    PageRequest::new(1, limit, max_limit).map(|request| request.limit())
}

// Decode optional cursor; string kosong diperlakukan sebagai halaman pertama
pub fn decode_cursor<K: CursorKey>(token: Option<&str>) -> Result<Option<K>, ValidationError> {
    match token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => K::decode(token).map(Some),
        None => Ok(None),
    }
}

/// Bentuk halaman dari hasil fetch `limit + 1` row.
/// Row ekstra hanya penanda ada halaman berikutnya.
pub fn into_cursor_page<T, K: CursorKey>(
    mut rows: Vec<T>,
    limit: u32,
    key: impl Fn(&T) -> K,
) -> CursorPage<T> {
    let has_more = rows.len() > limit as usize;
    rows.truncate(limit as usize);

    let next_cursor = if has_more {
        rows.last().map(|row| key(row).encode())
    } else {
        None
    };

    CursorPage {
        items: rows,
        limit,
        next_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    #[test]
    fn test_message_cursor_token() {
        let key = MessageKey {
            created_at: Utc::now().trunc_subsecs(6),
            message_id: Uuid::now_v7(),
        };
        let token = key.encode();
        assert!(!token.contains('-'));
        assert_eq!(MessageKey::decode(&token).unwrap(), key);
    }

    #[test]
    fn test_conversation_cursor_token() {
        let key = ConversationKey {
            last_message_at: Utc::now().trunc_subsecs(6),
            conversation_id: Uuid::new_v4(),
        };
        assert_eq!(ConversationKey::decode(&key.encode()).unwrap(), key);
    }

    #[test]
    fn test_malformed_cursor_rejected() {
        for token in ["", "abc", "123", "x.0b7e3c521f0a4d8e9c615a2f7d9e4b10", "123.nope"] {
            assert!(
                matches!(MessageKey::decode(token), Err(ValidationError::InvalidCursor(_))),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_optional_cursor() {
        assert_eq!(decode_cursor::<MessageKey>(None).unwrap(), None);
        assert_eq!(decode_cursor::<MessageKey>(Some("  ")).unwrap(), None);
        assert!(decode_cursor::<MessageKey>(Some("bad")).is_err());
    }

    #[test]
    fn test_cursor_limit_rules() {
        assert_eq!(cursor_limit(20, 100).unwrap(), 20);
        assert_eq!(cursor_limit(0, 100), Err(ValidationError::InvalidLimit(0)));
        assert!(cursor_limit(500, 100).is_err());
    }

    #[test]
    fn test_into_cursor_page() {
        let base = Utc::now().trunc_subsecs(6);
        let keys: Vec<MessageKey> = (0..3)
            .map(|i| MessageKey {
                created_at: base - chrono::Duration::seconds(i),
                message_id: Uuid::now_v7(),
            })
            .collect();

        let page = into_cursor_page(keys.clone(), 2, |k| *k);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor, Some(keys[1].encode()));

        let last = into_cursor_page(keys[..2].to_vec(), 2, |k| *k);
        assert_eq!(last.items.len(), 2);
        assert_eq!(last.next_cursor, None);
    }
}
