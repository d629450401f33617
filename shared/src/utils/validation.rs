use thiserror::Error;
use uuid::Uuid;

// Error validasi input sebelum menyentuh store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is not a valid identifier: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("a conversation needs two different participants")]
    SameParticipant,

    #[error("message content must not be empty")]
    EmptyContent,

    #[error("message content is {actual} characters, maximum is {max}")]
    ContentTooLong { max: usize, actual: usize },

    #[error("page must be >= 1, got {0}")]
    InvalidPage(i64),

    #[error("limit must be >= 1, got {0}")]
    InvalidLimit(i64),

    #[error("limit {actual} exceeds maximum page size {max}")]
    LimitTooLarge { max: u32, actual: i64 },

    #[error("page window is too deep, use cursor pagination")]
    WindowOverflow,

    #[error("malformed cursor: {0}")]
    InvalidCursor(String),
}

/// Parse identifier literal (UUID canonical atau simple form).
/// Nil UUID ditolak karena tidak pernah dipakai sebagai user id.
pub fn parse_identifier(field: &'static str, value: &str) -> Result<Uuid, ValidationError> {
    let invalid = || ValidationError::InvalidIdentifier {
        field,
        value: value.to_string(),
    };

    let id = Uuid::parse_str(value.trim()).map_err(|_| invalid())?;
    if id.is_nil() {
        return Err(invalid());
    }

    Ok(id)
}

// Validate isi message: tidak kosong dan tidak melebihi batas karakter
pub fn validate_content(content: &str, max_chars: usize) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }

    let actual = content.chars().count();
    if actual > max_chars {
        return Err(ValidationError::ContentTooLong {
            max: max_chars,
            actual,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_parsing() {
        let id = parse_identifier("user_id", "6f1c2a4e-8d5b-4c1e-9a0f-3b2d1e4c5a6b").unwrap();
        assert_eq!(id.to_string(), "6f1c2a4e-8d5b-4c1e-9a0f-3b2d1e4c5a6b");

        // simple form dan whitespace tetap diterima
        assert!(parse_identifier("user_id", "6f1c2a4e8d5b4c1e9a0f3b2d1e4c5a6b").is_ok());
        assert!(parse_identifier("user_id", " 6f1c2a4e-8d5b-4c1e-9a0f-3b2d1e4c5a6b ").is_ok());

        assert!(parse_identifier("user_id", "u1").is_err());
        assert!(parse_identifier("user_id", "").is_err());
        assert!(parse_identifier("user_id", "00000000-0000-0000-0000-000000000000").is_err());
    }

    #[test]
    fn test_identifier_error_names_field() {
        let err = parse_identifier("receiver_id", "nope").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidIdentifier {
                field: "receiver_id",
                value: "nope".to_string()
            }
        );
        assert!(err.to_string().contains("receiver_id"));
    }

    #[test]
    fn test_content_validation() {
        assert!(validate_content("hi", 10).is_ok());
        assert!(validate_content("ééééé", 5).is_ok());
        assert_eq!(validate_content("   ", 10), Err(ValidationError::EmptyContent));
        assert_eq!(validate_content("", 10), Err(ValidationError::EmptyContent));
        assert_eq!(
            validate_content("abcdef", 5),
            Err(ValidationError::ContentTooLong { max: 5, actual: 6 })
        );
    }
}
