use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Currency the user prefers for amounts across the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "currency", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Brl,
    Usd,
}

/// Page the user lands on after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "default_home", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DefaultHome {
    Dashboard,
    Transactions,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "theme_preference", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ThemePreference {
    Light,
    Dark,
    System,
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Brl
    }
}

impl Default for DefaultHome {
    fn default() -> Self {
        DefaultHome::Dashboard
    }
}

impl Default for ThemePreference {
    fn default() -> Self {
        ThemePreference::System
    }
}

/// User record in the database. `password_hash` is nullable: pre-provisioned
/// accounts exist without a usable password and can only get one through the
/// reset flow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub preferred_currency: Currency,
    pub default_home: DefaultHome,
    pub theme_preference: ThemePreference,
    pub email_notifications: bool,
    pub created_at: OffsetDateTime,
}

/// Fields needed to create a user; preferences start at their defaults.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
}

/// Profile and preference fields a user may change after registration.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub preferred_currency: Currency,
    pub default_home: DefaultHome,
    pub theme_preference: ThemePreference,
    pub email_notifications: bool,
}

/// One outstanding password-reset grant. The token value itself is the lookup
/// key; consumption deletes the row, so presence implies not-yet-used.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

impl PasswordResetToken {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "alice@example.com".into(),
            name: "Alice".into(),
            password_hash: Some("$argon2id$v=19$m=19456,t=2,p=1$abc$def".into()),
            preferred_currency: Currency::default(),
            default_home: DefaultHome::default(),
            theme_preference: ThemePreference::default(),
            email_notifications: true,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn token_expiry_is_strict() {
        let now = OffsetDateTime::now_utc();
        let token = PasswordResetToken {
            token: "a".repeat(64),
            user_id: Uuid::new_v4(),
            expires_at: now,
            created_at: now - Duration::hours(1),
        };
        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::seconds(1)));
    }

    #[test]
    fn preference_enums_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::Brl).unwrap(), r#""BRL""#);
        assert_eq!(
            serde_json::to_string(&DefaultHome::Transactions).unwrap(),
            r#""TRANSACTIONS""#
        );
        assert_eq!(
            serde_json::to_string(&ThemePreference::System).unwrap(),
            r#""SYSTEM""#
        );
    }
}
