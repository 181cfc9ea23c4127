use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, PasswordResetToken, ProfileUpdate, User};

const USER_COLUMNS: &str = "id, email, name, password_hash, preferred_currency, \
     default_home, theme_preference, email_notifications, created_at";

/// Persistence boundary for the credential service. Backed by Postgres in
/// production; tests swap in an in-memory fake.
#[async_trait]
pub trait AuthRepo: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn create_user(&self, new_user: &NewUser) -> anyhow::Result<User>;
    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()>;
    async fn update_user_profile(&self, id: Uuid, update: &ProfileUpdate) -> anyhow::Result<User>;

    async fn create_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()>;
    async fn find_reset_token(&self, token: &str) -> anyhow::Result<Option<PasswordResetToken>>;
    async fn delete_reset_tokens_for_user(&self, user_id: Uuid) -> anyhow::Result<()>;

    /// Sets the user's password hash and consumes the token in one atomic
    /// step. A token must never survive a successful password update, and a
    /// password must never change while the token survives.
    async fn apply_password_reset(
        &self,
        user_id: Uuid,
        token: &str,
        password_hash: &str,
    ) -> anyhow::Result<()>;
}

pub struct PgAuthRepo {
    db: PgPool,
}

impl PgAuthRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthRepo for PgAuthRepo {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, new_user: &NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn update_user_profile(&self, id: Uuid, update: &ProfileUpdate) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = $2, email = $3, preferred_currency = $4, default_home = $5,
                 theme_preference = $6, email_notifications = $7
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(update.preferred_currency)
        .bind(update.default_home)
        .bind(update.theme_preference)
        .bind(update.email_notifications)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO password_reset_tokens (token, user_id, expires_at)
             VALUES ($1, $2, $3)",
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_reset_token(&self, token: &str) -> anyhow::Result<Option<PasswordResetToken>> {
        let record = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT token, user_id, expires_at, created_at
             FROM password_reset_tokens
             WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?;
        Ok(record)
    }

    async fn delete_reset_tokens_for_user(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn apply_password_reset(
        &self,
        user_id: Uuid,
        token: &str,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await?;
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM password_reset_tokens WHERE token = $1")
            .bind(token)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            // Raced with another consumer; roll everything back so the
            // password does not change under an already-spent token.
            tx.rollback().await?;
            anyhow::bail!("reset token already consumed");
        }
        tx.commit().await?;
        Ok(())
    }
}
