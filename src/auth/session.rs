use std::time::Duration;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::repo_types::{Currency, DefaultHome, ThemePreference, User};
use crate::config::JwtConfig;
use crate::state::AppState;

/// Session payload: identity plus a snapshot of the user's preferences at
/// issuance. Preference changes made elsewhere do not flow into an
/// already-issued session; the holder sees the stale snapshot until they
/// authenticate again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    pub currency: Currency,
    pub default_home: DefaultHome,
    pub theme: ThemePreference,
    pub email_notifications: bool,
}

/// Signing and verification keys for stateless session tokens. There is no
/// server-side session store and no revocation list; logout is the client
/// dropping its token.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl SessionKeys {
    pub fn from_config(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: Duration::from_secs((config.session_ttl_minutes as u64) * 60),
        }
    }

    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = SessionClaims {
            sub: user.id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            currency: user.preferred_currency,
            default_home: user.default_home,
            theme: user.theme_preference,
            email_notifications: user.email_notifications,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, "session signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "session verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        SessionKeys::from_config(&state.config.jwt)
    }
}

/// Landing path for the post-login redirect, resolved from the user's stored
/// default-home preference.
pub fn default_home_path(default_home: DefaultHome) -> &'static str {
    match default_home {
        DefaultHome::Dashboard => "/dashboard",
        DefaultHome::Transactions => "/transactions",
        DefaultHome::Settings => "/settings",
    }
}

/// Extracts and validates the bearer session, returning the user ID.
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or((
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header".to_string(),
        ))?;

        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(_) => {
                warn!("invalid or expired session");
                Err((
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired session".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn make_keys() -> SessionKeys {
        SessionKeys::from_ref(&AppState::fake())
    }

    fn make_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "alice@example.com".into(),
            name: "Alice".into(),
            password_hash: None,
            preferred_currency: Currency::Usd,
            default_home: DefaultHome::Transactions,
            theme_preference: ThemePreference::Dark,
            email_notifications: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip_keeps_preference_snapshot() {
        let keys = make_keys();
        let user = make_user();
        let token = keys.sign(&user).expect("sign session");
        let claims = keys.verify(&token).expect("verify session");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.currency, Currency::Usd);
        assert_eq!(claims.default_home, DefaultHome::Transactions);
        assert_eq!(claims.theme, ThemePreference::Dark);
        assert!(!claims.email_notifications);
    }

    #[tokio::test]
    async fn snapshot_is_fixed_at_issuance() {
        let keys = make_keys();
        let mut user = make_user();
        let token = keys.sign(&user).expect("sign session");
        // Preference change after issuance; the old token keeps the old view.
        user.preferred_currency = Currency::Brl;
        let claims = keys.verify(&token).expect("verify session");
        assert_eq!(claims.currency, Currency::Usd);
    }

    #[tokio::test]
    async fn verify_rejects_foreign_issuer() {
        let keys = make_keys();
        let mut other_config = AppState::fake().config.jwt.clone();
        other_config.issuer = "someone-else".into();
        let other = SessionKeys::from_config(&other_config);
        let token = other.sign(&make_user()).expect("sign session");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_garbage() {
        let keys = make_keys();
        assert!(keys.verify("not-a-jwt").is_err());
    }

    #[test]
    fn landing_paths() {
        assert_eq!(default_home_path(DefaultHome::Dashboard), "/dashboard");
        assert_eq!(
            default_home_path(DefaultHome::Transactions),
            "/transactions"
        );
        assert_eq!(default_home_path(DefaultHome::Settings), "/settings");
    }
}
