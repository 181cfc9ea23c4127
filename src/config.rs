use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub session_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub reset_token_ttl_minutes: i64,
    pub max_login_attempts: u32,
    pub lockout_minutes: i64,
    /// Echo the reset token in the forgot-password response. Development only;
    /// must stay off in any production deployment.
    pub expose_reset_token: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fintrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fintrack-users".into()),
            session_ttl_minutes: env_parse("SESSION_TTL_MINUTES", 60 * 24),
        };
        let auth = AuthConfig {
            reset_token_ttl_minutes: env_parse("RESET_TOKEN_TTL_MINUTES", 60),
            max_login_attempts: env_parse("MAX_LOGIN_ATTEMPTS", 5),
            lockout_minutes: env_parse("LOGIN_LOCKOUT_MINUTES", 5),
            expose_reset_token: env_parse("EXPOSE_RESET_TOKEN", false),
        };
        Ok(Self {
            database_url,
            jwt,
            auth,
        })
    }
}
