use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use crate::auth::dto::UpdateProfileRequest;
use crate::auth::error::AuthError;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::rate_limit::LoginRateLimiter;
use crate::auth::repo::AuthRepo;
use crate::auth::repo_types::{NewUser, ProfileUpdate, User};
use crate::auth::session::{default_home_path, SessionKeys};
use crate::auth::token;
use crate::auth::validate;
use crate::notify::Notifier;

/// Successful register/login outcome: the signed session, the user it was
/// minted for and the landing path resolved from their default-home
/// preference. The HTTP layer turns this into the response body; it never
/// performs the cookie write itself.
#[derive(Debug)]
pub struct SessionGrant {
    pub token: String,
    pub user: User,
    pub redirect_to: String,
}

/// Outcome of the forgot-password flow. `reset_token` is populated only when
/// the dev-only echo flag is set; callers must render the same generic
/// message either way.
#[derive(Debug)]
pub struct ResetRequested {
    pub reset_token: Option<String>,
}

/// Orchestrates every credential-affecting operation. Identity is always an
/// explicit parameter; nothing here caches a current user across requests.
#[derive(Clone)]
pub struct CredentialService {
    repo: Arc<dyn AuthRepo>,
    limiter: Arc<LoginRateLimiter>,
    notifier: Arc<dyn Notifier>,
    sessions: SessionKeys,
    reset_token_ttl: Duration,
    expose_reset_token: bool,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl CredentialService {
    pub fn new(
        repo: Arc<dyn AuthRepo>,
        limiter: Arc<LoginRateLimiter>,
        notifier: Arc<dyn Notifier>,
        sessions: SessionKeys,
        reset_token_ttl: Duration,
        expose_reset_token: bool,
    ) -> Self {
        Self {
            repo,
            limiter,
            notifier,
            sessions,
            reset_token_ttl,
            expose_reset_token,
        }
    }

    pub fn repo(&self) -> &dyn AuthRepo {
        self.repo.as_ref()
    }

    fn grant(&self, user: User) -> Result<SessionGrant, AuthError> {
        let token = self.sessions.sign(&user)?;
        let redirect_to = default_home_path(user.default_home).to_string();
        Ok(SessionGrant {
            token,
            user,
            redirect_to,
        })
    }

    /// Creates the account and immediately establishes a session for it.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionGrant, AuthError> {
        let email = normalize_email(email);
        validate::validate_register(name, &email, password).map_err(AuthError::Validation)?;

        if self.repo.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .repo
            .create_user(&NewUser {
                email,
                name: name.trim().to_string(),
                password_hash: Some(password_hash),
            })
            .await?;
        self.grant(user)
    }

    /// The three failure causes (unknown email, account without a password,
    /// wrong password) all collapse into `InvalidCredentials`; only the rate
    /// limiter produces a different failure, and it fires before the
    /// repository is ever consulted.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionGrant, AuthError> {
        let email = normalize_email(email);
        validate::validate_login(&email, password).map_err(AuthError::Validation)?;

        if !self.limiter.check(&email) {
            return Err(AuthError::RateLimited);
        }

        let user = self
            .repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, user.password_hash.as_deref()) {
            return Err(AuthError::InvalidCredentials);
        }
        self.grant(user)
    }

    /// Always succeeds with the same outward shape. For a real account it
    /// replaces any outstanding token with a fresh one and hands it to the
    /// notifier; for an unknown email it does nothing, indistinguishably.
    pub async fn forgot_password(&self, email: &str) -> Result<ResetRequested, AuthError> {
        let email = normalize_email(email);
        validate::validate_forgot_password(&email).map_err(AuthError::Validation)?;

        let Some(user) = self.repo.find_user_by_email(&email).await? else {
            return Ok(ResetRequested { reset_token: None });
        };

        // At most one live token per user: clear before issuing.
        self.repo.delete_reset_tokens_for_user(user.id).await?;
        let issued = token::issue(self.reset_token_ttl);
        self.repo
            .create_reset_token(user.id, &issued.token, issued.expires_at)
            .await?;

        if let Err(e) = self
            .notifier
            .notify_password_reset(&user.email, &issued.token)
            .await
        {
            warn!(error = %e, "password reset notification failed");
        }

        Ok(ResetRequested {
            reset_token: self.expose_reset_token.then_some(issued.token),
        })
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        validate::validate_reset_password(token, new_password).map_err(AuthError::Validation)?;

        let record = self
            .repo
            .find_reset_token(token)
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;
        if record.is_expired(OffsetDateTime::now_utc()) {
            return Err(AuthError::InvalidOrExpiredToken);
        }

        let password_hash = hash_password(new_password)?;
        self.repo
            .apply_password_reset(record.user_id, token, &password_hash)
            .await?;
        Ok(())
    }

    /// Changing a password requires knowing the current one; accounts without
    /// a password go through the reset flow instead. Other outstanding
    /// sessions stay valid after the change.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        validate::validate_change_password(current_password, new_password, confirm_password)
            .map_err(AuthError::Validation)?;

        let user = self
            .repo
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;
        if user.password_hash.is_none() {
            return Err(AuthError::NotFound);
        }
        if !verify_password(current_password, user.password_hash.as_deref()) {
            return Err(AuthError::IncorrectPassword);
        }

        let password_hash = hash_password(new_password)?;
        self.repo
            .update_user_password(user_id, &password_hash)
            .await?;
        Ok(())
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: &UpdateProfileRequest,
    ) -> Result<User, AuthError> {
        let email = normalize_email(&request.email);
        validate::validate_profile_update(&request.name, &email).map_err(AuthError::Validation)?;

        if self.repo.find_user_by_id(user_id).await?.is_none() {
            return Err(AuthError::NotFound);
        }
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            if existing.id != user_id {
                return Err(AuthError::DuplicateEmail);
            }
        }

        let user = self
            .repo
            .update_user_profile(
                user_id,
                &ProfileUpdate {
                    name: request.name.trim().to_string(),
                    email,
                    preferred_currency: request.preferred_currency,
                    default_home: request.default_home,
                    theme_preference: request.theme_preference,
                    email_notifications: request.email_notifications,
                },
            )
            .await?;
        Ok(user)
    }
}
