//! Password and credential hashing
//!
//! Argon2id hashing with random salts. Used for admin passwords and for the
//! stored refresh-token hashes, so a leaked database row can be used to
//! forge neither.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a secret using Argon2id with secure defaults.
///
/// Returns the hash in PHC string format (algorithm, parameters, salt, and
/// hash).
pub fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash secret: {}", e))
        .context("Secret hashing failed")?;

    Ok(hash.to_string())
}

/// Verify a secret against a stored PHC-format hash.
///
/// Returns `false` on mismatch, an error only when the stored hash itself is
/// malformed.
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))
        .context("Failed to parse stored hash")?;

    let argon2 = Argon2::default();

    match argon2.verify_password(secret.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Verification failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_produces_argon2id() {
        let hash = hash_secret("test_password_123").expect("Failed to hash");
        assert!(hash.starts_with("$argon2id$"), "Hash should use Argon2id");
    }

    #[test]
    fn test_same_secret_different_hashes() {
        let hash1 = hash_secret("same_password").unwrap();
        let hash2 = hash_secret("same_password").unwrap();
        assert_ne!(hash1, hash2, "Random salt should vary the hash");
    }

    #[test]
    fn test_verify_correct_secret() {
        let hash = hash_secret("correct_password").unwrap();
        assert!(verify_secret("correct_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_wrong_secret() {
        let hash = hash_secret("correct_password").unwrap();
        assert!(!verify_secret("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash_errors() {
        assert!(verify_secret("password", "not_a_phc_hash").is_err());
    }

    #[test]
    fn test_unicode_secret() {
        let secret = "contraseña-🔐";
        let hash = hash_secret(secret).unwrap();
        assert!(verify_secret(secret, &hash).unwrap());
    }
}
