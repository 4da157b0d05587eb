//! Pure helpers for the deterministic identifiers the protocol relies on.

const MAX_DOCUMENT_ID_LEN: usize = 128;

/// Composite membership id. Used identically at create time and for any
/// later existence check, so one (apartment, user) pair maps to one row.
pub fn membership_key(apartment_id: &str, user_id: &str) -> String {
    format!("{apartment_id}_{user_id}")
}

/// Invite codes are looked up by their trimmed, upper-cased form.
pub fn normalize_invite_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Ids accepted in a document path: ASCII alphanumerics, `_` and `-`.
pub fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_DOCUMENT_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
