//! Conversation identity derivation.
//!
//! A conversation has no create step. Its id is a name-based UUID (v5) over
//! the sorted participant pair, so both participants resolve the same id
//! without any store lookup.

use shared::utils::validation::{parse_identifier, ValidationError};
use uuid::Uuid;

const PAIR_SEPARATOR: char = '-';

// Urutkan pasangan user; byte order UUID sama dengan urutan lexical
// canonical string (lowercase hex, hyphenated)
pub fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Derive conversation id dari dua user id yang sudah di-parse.
pub fn conversation_id_for(user_a: Uuid, user_b: Uuid) -> Result<Uuid, ValidationError> {
    if user_a == user_b {
        return Err(ValidationError::SameParticipant);
    }

    let (low, high) = ordered_pair(user_a, user_b);
    let name = format!("{}{}{}", low.hyphenated(), PAIR_SEPARATOR, high.hyphenated());

    Ok(Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes()))
}

/// Derive conversation id dari identifier literal mentah.
pub fn derive_conversation_id(user_a: &str, user_b: &str) -> Result<Uuid, ValidationError> {
    let a = parse_identifier("user_a_id", user_a)?;
    let b = parse_identifier("user_b_id", user_b)?;
    conversation_id_for(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "0b7e3c52-1f0a-4d8e-9c61-5a2f7d9e4b10";
    const BOB: &str = "9d4f1a20-6c3b-4e7a-8b59-2e1c0f8d7a36";
    const CAROL: &str = "5e2a9c71-3d4b-4f80-a1c6-7b8e9f0d1c23";

    #[test]
    fn test_order_independent() {
        let ab = derive_conversation_id(ALICE, BOB).unwrap();
        let ba = derive_conversation_id(BOB, ALICE).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_stable_name_based_id() {
        let expected = Uuid::new_v5(&Uuid::NAMESPACE_DNS, format!("{ALICE}-{BOB}").as_bytes());
        assert_eq!(derive_conversation_id(BOB, ALICE).unwrap(), expected);
        assert_eq!(expected.get_version_num(), 5);
    }

    #[test]
    fn test_different_pairs_differ() {
        let ab = derive_conversation_id(ALICE, BOB).unwrap();
        let ac = derive_conversation_id(ALICE, CAROL).unwrap();
        let bc = derive_conversation_id(BOB, CAROL).unwrap();
        assert_ne!(ab, ac);
        assert_ne!(ab, bc);
        assert_ne!(ac, bc);
    }

    #[test]
    fn test_literal_form_does_not_matter() {
        let upper = ALICE.to_uppercase();
        let simple = BOB.replace('-', "");
        assert_eq!(
            derive_conversation_id(&upper, &simple).unwrap(),
            derive_conversation_id(ALICE, BOB).unwrap()
        );
    }

    #[test]
    fn test_self_conversation_rejected() {
        assert_eq!(
            derive_conversation_id(ALICE, ALICE),
            Err(ValidationError::SameParticipant)
        );
        assert_eq!(
            derive_conversation_id(ALICE, &ALICE.to_uppercase()),
            Err(ValidationError::SameParticipant)
        );
    }

    #[test]
    fn test_invalid_literal_rejected() {
        assert!(matches!(
            derive_conversation_id("u1", BOB),
            Err(ValidationError::InvalidIdentifier { field: "user_a_id", .. })
        ));
        assert!(matches!(
            derive_conversation_id(ALICE, "not-a-uuid"),
            Err(ValidationError::InvalidIdentifier { field: "user_b_id", .. })
        ));
    }

    #[test]
    fn test_ordered_pair() {
        let a = Uuid::parse_str(ALICE).unwrap();
        let b = Uuid::parse_str(BOB).unwrap();
        assert_eq!(ordered_pair(a, b), (a, b));
        assert_eq!(ordered_pair(b, a), (a, b));
    }
}
