//! Alert delivery seam.

use async_trait::async_trait;
use tracing::warn;
use watcher_api::{ApiError, TelegramNotifier};

/// Result of a single delivery attempt. Never fatal to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Message accepted by the messaging service
    Delivered,
    /// Notifier not configured; nothing was sent
    Skipped,
    /// Delivery attempted and failed
    Failed(String),
}

/// Delivers a formatted alert about an owner.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str, owner: &str) -> NotifyOutcome;
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str, owner: &str) -> NotifyOutcome {
        match self.send_alert(message, owner).await {
            Ok(()) => NotifyOutcome::Delivered,
            Err(ApiError::MissingCredentials) => {
                warn!(owner = %owner, "Missing Telegram credentials, alert not sent");
                NotifyOutcome::Skipped
            }
            Err(e) => {
                warn!(owner = %owner, error = %e, "Telegram delivery failed");
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_is_skipped() {
        let notifier = TelegramNotifier::new(None, Some("42".to_string()));
        assert_eq!(notifier.notify("msg", "A").await, NotifyOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_failed() {
        // Port 9 (discard) on localhost is not listening for HTTP
        let notifier = TelegramNotifier::new(Some("tok".to_string()), Some("42".to_string()))
            .with_api_base("http://127.0.0.1:9")
            .with_timeout(std::time::Duration::from_secs(2));
        assert!(matches!(
            notifier.notify("msg", "A").await,
            NotifyOutcome::Failed(_)
        ));
    }
}
