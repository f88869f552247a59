use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// SHA-256 hex digest of a UTF-8 string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare two hex digests in constant time.
pub fn digests_match(expected: &str, supplied: &str) -> bool {
    let expected_bytes = expected.as_bytes();
    let supplied_bytes = supplied.as_bytes();

    if expected_bytes.len() != supplied_bytes.len() {
        return false;
    }

    expected_bytes.ct_eq(supplied_bytes).into()
}
