use rand::{rngs::OsRng, RngCore};
use std::fmt::Write;
use time::{Duration, OffsetDateTime};

/// 32 random bytes, 256 bits of entropy. Collisions are out of model at this
/// size; nothing downstream handles them defensively.
const RESET_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Mints a fresh unguessable reset token valid for `validity` from now.
pub fn issue(validity: Duration) -> IssuedToken {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let mut token = String::with_capacity(RESET_TOKEN_BYTES * 2);
    for byte in bytes {
        // infallible for String
        let _ = write!(token, "{:02x}", byte);
    }
    IssuedToken {
        token,
        expires_at: OffsetDateTime::now_utc() + validity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_hex_of_expected_length() {
        let issued = issue(Duration::hours(1));
        assert_eq!(issued.token.len(), RESET_TOKEN_BYTES * 2);
        assert!(issued.token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(issued.token, issued.token.to_lowercase());
    }

    #[test]
    fn expiry_tracks_validity_window() {
        let before = OffsetDateTime::now_utc();
        let issued = issue(Duration::hours(1));
        let after = OffsetDateTime::now_utc();
        assert!(issued.expires_at >= before + Duration::hours(1));
        assert!(issued.expires_at <= after + Duration::hours(1));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(issue(Duration::minutes(1)).token));
        }
    }
}
