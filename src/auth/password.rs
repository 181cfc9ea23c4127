use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::warn;

use crate::auth::error::{field_error, AuthError};

/// Upper bound on plaintext length fed to the hasher. Anything longer is
/// rejected before it reaches argon2.
const MAX_PASSWORD_BYTES: usize = 512;

pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    if plain.is_empty() {
        return Err(AuthError::Validation(field_error(
            "password",
            "Password must not be empty",
        )));
    }
    if plain.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::Validation(field_error(
            "password",
            "Password is too long",
        )));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 hash_password error: {e}"))?
        .to_string();
    Ok(hash)
}

/// Verifies a plaintext against the stored hash. A missing hash is a normal
/// state (pre-provisioned account) and always verifies false; it must not be
/// distinguishable from a wrong password by the caller. A malformed stored
/// hash is logged and also treated as a mismatch.
pub fn verify_password(plain: &str, hash: Option<&str>) -> bool {
    let Some(hash) = hash else {
        return false;
    };
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash failed to parse");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, Some(&hash)));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", Some(&hash)));
    }

    #[test]
    fn verify_is_false_for_missing_hash() {
        assert!(!verify_password("anything", None));
    }

    #[test]
    fn verify_is_false_for_malformed_hash() {
        assert!(!verify_password("anything", Some("not-a-valid-hash")));
    }

    #[test]
    fn hash_rejects_empty_input() {
        let err = hash_password("").unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[test]
    fn hash_rejects_oversized_input() {
        let long = "x".repeat(MAX_PASSWORD_BYTES + 1);
        let err = hash_password(&long).unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("Secret123").unwrap();
        let b = hash_password("Secret123").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("Secret123", Some(&a)));
        assert!(verify_password("Secret123", Some(&b)));
    }
}
