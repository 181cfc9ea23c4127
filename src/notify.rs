use axum::async_trait;
use tracing::{debug, info};

/// Delivery boundary for credential notifications. Actual email transport
/// lives outside this service; the credential service treats delivery as
/// fire-and-forget and never surfaces a delivery failure to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_password_reset(&self, email: &str, token: &str) -> anyhow::Result<()>;
}

/// Default collaborator: records the handoff in the log and leaves delivery
/// to whatever tails it. The token itself only appears at debug level.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_password_reset(&self, email: &str, token: &str) -> anyhow::Result<()> {
        info!(email = %email, "password reset requested, handing token to notifier");
        debug!(email = %email, token = %token, "reset token issued");
        Ok(())
    }
}
