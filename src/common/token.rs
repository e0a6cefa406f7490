// src/common/token.rs

use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

/// Length of a session bearer token.
pub const SESSION_TOKEN_LEN: usize = 32;

/// Length of a public repair-tracking token. Short on purpose: it is an
/// access-obscurity lookup key for a public page, not a security boundary.
pub const TRACKING_TOKEN_LEN: usize = 10;

/// Mint a random alphanumeric token and return it together with its hash.
/// The raw value is handed out exactly once; only the hash is persisted.
pub fn generate_token(len: usize) -> (String, String) {
    let token = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>();

    let hash = hash_token(&token);
    (token, hash)
}

/// One-way hash used for both session and tracking tokens (hex Sha256).
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_has_requested_length_and_charset() {
        let (raw, _) = generate_token(TRACKING_TOKEN_LEN);
        assert_eq!(raw.len(), TRACKING_TOKEN_LEN);
        assert!(raw.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn hash_is_deterministic_and_matches_issuance() {
        let (raw, hash) = generate_token(SESSION_TOKEN_LEN);
        assert_eq!(hash_token(&raw), hash);
        assert_eq!(hash.len(), 64); // hex sha-256
    }

    #[test]
    fn different_tokens_hash_differently() {
        assert_ne!(hash_token("aaaaaaaaaa"), hash_token("aaaaaaaaab"));
    }
}
