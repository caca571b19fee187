// ============================
// scribe-backend-lib/src/auth/token.rs
// ============================
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
/** Secure token generation and one-way hashing for authentication.
Session tokens are unguessable secrets handed to the client; only their
SHA-256 digest (the session key) is ever persisted. */
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Session token size in bytes (18 bytes = 144 bits of entropy)
const SESSION_TOKEN_BYTES: usize = 18;

/// User ID size in bytes (15 bytes = 120 bits of entropy)
const USER_ID_BYTES: usize = 15;

/// RFC 4648 base32 alphabet, lowercased
const BASE32_LOWER: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/** Generate a cryptographically secure session token.
This uses OS-provided entropy; the result is never persisted directly.
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_session_token() -> String {
    let mut buffer = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/** Derive the session key stored in the database from a session token.
Deterministic one-way hash: possession of the raw token is required to
look up the row, and the store can never reveal tokens from keys.
# Returns
The lowercase hex encoding of the SHA-256 digest (64 chars) */
pub fn hash_session_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    encode_hex_lower(&digest)
}

/** Generate a random user identifier (120 bits of entropy).
# Returns
A lowercase base32 encoded string without padding (24 chars) */
pub fn generate_user_id() -> String {
    let mut buffer = [0u8; USER_ID_BYTES];
    OsRng.fill_bytes(&mut buffer);
    encode_base32_lower(&buffer)
}

/// Generate an unpadded URL-safe random value of `bytes` length.
///
/// Used for the OAuth state parameter and PKCE code verifier.
pub fn generate_urlsafe_secret(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

fn encode_hex_lower(bytes: &[u8]) -> String {
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        },
    )
}

fn encode_base32_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(5) * 8);
    let mut buffer: u64 = 0;
    let mut bits: u32 = 0;

    for &b in bytes {
        buffer = (buffer << 8) | u64::from(b);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_LOWER[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_LOWER[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_generation() {
        let token1 = generate_session_token();
        let token2 = generate_session_token();

        assert_ne!(token1, token2);

        // 18 bytes of entropy in unpadded base64 is exactly 24 chars
        assert_eq!(token1.len(), 24);
        assert!(!token1.contains('='));
    }

    #[test]
    fn test_token_hash_is_deterministic_hex() {
        let token = generate_session_token();
        let key1 = hash_session_token(&token);
        let key2 = hash_session_token(&token);

        assert_eq!(key1, key2);
        assert_eq!(key1.len(), 64);
        assert!(key1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));

        // A different token must not map to the same key
        assert_ne!(key1, hash_session_token(&generate_session_token()));
    }

    #[test]
    fn test_token_hashes_never_collide_across_many_samples() {
        let mut keys = HashSet::new();
        for _ in 0..10_000 {
            assert!(keys.insert(hash_session_token(&generate_session_token())));
        }
    }

    #[test]
    fn test_user_id_shape() {
        let id = generate_user_id();

        // 15 bytes of entropy in unpadded base32 is exactly 24 chars
        assert_eq!(id.len(), 24);
        assert!(id.bytes().all(|b| BASE32_LOWER.contains(&b)));
        assert_ne!(id, generate_user_id());
    }

    #[test]
    fn test_base32_known_vectors() {
        assert_eq!(encode_base32_lower(b""), "");
        assert_eq!(encode_base32_lower(b"f"), "my");
        assert_eq!(encode_base32_lower(b"fo"), "mzxq");
        assert_eq!(encode_base32_lower(b"foo"), "mzxw6");
        assert_eq!(encode_base32_lower(b"foobar"), "mzxw6ytboi");
    }

    #[test]
    fn test_urlsafe_secret_length() {
        // 32 bytes of entropy in unpadded base64 is 43 chars, the canonical
        // PKCE verifier length
        assert_eq!(generate_urlsafe_secret(32).len(), 43);
    }
}
