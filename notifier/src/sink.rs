use async_trait::async_trait;

use market::types::Notification;

use crate::error::NotifyError;

/// Delivery endpoint for admitted notifications.
///
/// Implementations perform one network call per delivery. Failures are
/// surfaced to the caller for logging only; nothing at this layer retries.
#[async_trait]
pub trait NotifySink: Send + Sync + 'static {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}
