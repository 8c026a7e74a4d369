//! Password hash encoding and verification.
//!
//! Passwords in the config file are stored as base64-encoded bcrypt hashes
//! (the output of `slircd-config genpasswd`). Loading decodes them to the raw
//! hash bytes; verification runs bcrypt against those bytes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Errors from the password-hash codec.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hash is empty")]
    Empty,
    #[error("password hash is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to hash password: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// Decode an encoded password hash into the raw hash bytes.
pub fn decode_password_hash(encoded: &str) -> Result<Vec<u8>, PasswordError> {
    if encoded.is_empty() {
        return Err(PasswordError::Empty);
    }
    Ok(STANDARD.decode(encoded)?)
}

/// Hash a plaintext password with bcrypt and encode it for the config file.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let hash = bcrypt::hash(password, cost)?;
    Ok(STANDARD.encode(hash))
}

/// Check a plaintext attempt against decoded hash bytes.
pub fn verify_password(decoded: &[u8], attempt: &str) -> bool {
    match std::str::from_utf8(decoded) {
        Ok(hash) => bcrypt::verify(attempt, hash).unwrap_or(false),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's minimum cost keeps the tests fast
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify() {
        let encoded = hash_password("hunter2", TEST_COST).unwrap();
        let decoded = decode_password_hash(&encoded).unwrap();
        assert!(decoded.starts_with(b"$2"));
        assert!(verify_password(&decoded, "hunter2"));
        assert!(!verify_password(&decoded, "hunter3"));
    }

    #[test]
    fn empty_hash_is_rejected() {
        assert!(matches!(decode_password_hash(""), Err(PasswordError::Empty)));
    }

    #[test]
    fn bad_base64_is_rejected() {
        assert!(matches!(
            decode_password_hash("not base64!!"),
            Err(PasswordError::Base64(_))
        ));
    }

    #[test]
    fn garbage_bytes_never_verify() {
        assert!(!verify_password(&[0xff, 0xfe, 0x00], "anything"));
        assert!(!verify_password(b"plaintext", "plaintext"));
    }
}
