//! Field-level predicates shared by every request path.
//!
//! All of these are pure `&str -> bool` checks. The charsets deliberately
//! exclude quotes, semicolons, angle brackets, control bytes and non-ASCII,
//! so no accepted value can carry structural characters into a store query.

/// Region codes accepted for the `state` field.
pub const REGION_CODES: [&str; 8] = ["NSW", "VIC", "QLD", "SA", "WA", "TAS", "NT", "ACT"];

/// User identifiers: 1-128 characters from `[A-Za-z0-9_-]`.
pub fn is_valid_user_id(value: &str) -> bool {
    (1..=128).contains(&value.len())
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Address identifiers: canonical 8-4-4-4-12 UUID layout, version 1-5,
/// variant nibble 8/9/a/b (case-insensitive).
pub fn is_valid_address_id(value: &str) -> bool {
    const GROUP_LENS: [usize; 5] = [8, 4, 4, 4, 12];

    let groups: Vec<&str> = value.split('-').collect();
    if groups.len() != GROUP_LENS.len() {
        return false;
    }
    for (group, expected_len) in groups.iter().zip(GROUP_LENS) {
        if group.len() != expected_len || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
            return false;
        }
    }

    let version = groups[2].as_bytes()[0];
    let variant = groups[3].as_bytes()[0].to_ascii_lowercase();
    matches!(version, b'1'..=b'5') && matches!(variant, b'8' | b'9' | b'a' | b'b')
}

/// Street addresses: non-empty after trim; letters, digits, spaces and `- ' . , #`.
pub fn is_valid_street_address(value: &str) -> bool {
    !value.trim().is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '\'' | '.' | ',' | '#'))
}

/// Suburbs: non-empty after trim; letters, digits, spaces and `- ' .`.
pub fn is_valid_suburb(value: &str) -> bool {
    !value.trim().is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '\'' | '.'))
}

/// States: case-insensitive membership in [`REGION_CODES`].
pub fn is_valid_state(value: &str) -> bool {
    let value = value.trim();
    REGION_CODES.iter().any(|code| code.eq_ignore_ascii_case(value))
}

/// Countries: non-empty after trim; letters, digits, spaces and `- '`.
pub fn is_valid_country(value: &str) -> bool {
    !value.trim().is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '\''))
}

/// Postcodes: exactly 4 decimal digits.
pub fn is_valid_postcode(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}
