//! Telegram Bot API client for alert delivery.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{ApiError, ApiResult};

/// Telegram Bot API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Block explorer account page; the owner address is appended.
pub const DEFAULT_EXPLORER_ACCOUNT_URL: &str = "https://solscan.io/account/";

/// Protocol homepage linked from every alert.
pub const DEFAULT_PROTOCOL_URL: &str = "https://solend.fi";

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "TELEGRAM_TOKEN";

/// Environment variable holding the destination chat id.
pub const CHAT_ID_ENV: &str = "CHAT_ID";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram notifier sending Markdown messages with two link buttons.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
    explorer_account_url: String,
    protocol_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TelegramNotifier {
    /// Create a notifier. Empty strings count as missing.
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.filter(|t| !t.trim().is_empty()),
            chat_id: chat_id.filter(|c| !c.trim().is_empty()),
            api_base: DEFAULT_API_BASE.to_string(),
            explorer_account_url: DEFAULT_EXPLORER_ACCOUNT_URL.to_string(),
            protocol_url: DEFAULT_PROTOCOL_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Read credentials from `TELEGRAM_TOKEN` and `CHAT_ID`.
    pub fn from_env() -> Self {
        Self::new(std::env::var(TOKEN_ENV).ok(), std::env::var(CHAT_ID_ENV).ok())
    }

    /// Override the Bot API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the explorer account URL prefix.
    pub fn with_explorer_account_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_account_url = url.into();
        self
    }

    /// Override the protocol homepage link.
    pub fn with_protocol_url(mut self, url: impl Into<String>) -> Self {
        self.protocol_url = url.into();
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether both token and chat id are set.
    pub fn has_credentials(&self) -> bool {
        self.token.is_some() && self.chat_id.is_some()
    }

    /// Send an alert about `owner`. Single attempt, no retry.
    #[instrument(skip(self, text), fields(owner = %owner))]
    pub async fn send_alert(&self, text: &str, owner: &str) -> ApiResult<()> {
        let (Some(token), Some(chat_id)) = (&self.token, &self.chat_id) else {
            return Err(ApiError::MissingCredentials);
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let payload = self.build_payload(chat_id, text, owner);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Telegram message delivered");
        Ok(())
    }

    fn build_payload<'a>(&'a self, chat_id: &'a str, text: &'a str, owner: &str) -> SendMessage<'a> {
        SendMessage {
            chat_id,
            text,
            parse_mode: "Markdown",
            reply_markup: InlineKeyboard {
                inline_keyboard: vec![vec![
                    InlineButton {
                        text: "🔎 View on Solscan",
                        url: format!("{}{}", self.explorer_account_url, owner),
                    },
                    InlineButton {
                        text: "📊 View Solend",
                        url: self.protocol_url.clone(),
                    },
                ]],
            },
        }
    }
}

/// `sendMessage` request body.
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    reply_markup: InlineKeyboard,
}

#[derive(Debug, Serialize)]
struct InlineKeyboard {
    inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Serialize)]
struct InlineButton {
    text: &'static str,
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_empty_credentials_are_missing() {
        let notifier = TelegramNotifier::new(Some("".to_string()), Some("123".to_string()));
        assert!(!notifier.has_credentials());

        let notifier = TelegramNotifier::new(Some("tok".to_string()), None);
        assert!(!notifier.has_credentials());

        let notifier = TelegramNotifier::new(Some("tok".to_string()), Some("123".to_string()));
        assert!(notifier.has_credentials());
    }

    #[test]
    fn test_debug_redacts_token() {
        let notifier = TelegramNotifier::new(Some("secret-token".to_string()), Some("1".to_string()));
        let debug = format!("{:?}", notifier);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_payload_shape() {
        let notifier = TelegramNotifier::new(Some("tok".to_string()), Some("42".to_string()));
        let payload = notifier.build_payload("42", "hello", "Owner1");
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["chat_id"], "42");
        assert_eq!(json["text"], "hello");
        assert_eq!(json["parse_mode"], "Markdown");

        let row = &json["reply_markup"]["inline_keyboard"][0];
        assert_eq!(row[0]["url"], "https://solscan.io/account/Owner1");
        assert_eq!(row[1]["url"], "https://solend.fi");
    }

    #[tokio::test]
    async fn test_missing_credentials_skips_network() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let notifier = TelegramNotifier::new(None, None).with_api_base(mock_server.uri());
        assert!(matches!(
            notifier.send_alert("hi", "A").await,
            Err(ApiError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_send_alert() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bottok/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": "42",
                "text": "alert",
                "parse_mode": "Markdown"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let notifier = TelegramNotifier::new(Some("tok".to_string()), Some("42".to_string()))
            .with_api_base(mock_server.uri());
        notifier.send_alert("alert", "A").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_alert_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("chat not found"))
            .mount(&mock_server)
            .await;

        let notifier = TelegramNotifier::new(Some("tok".to_string()), Some("42".to_string()))
            .with_api_base(mock_server.uri());
        match notifier.send_alert("alert", "A").await {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "chat not found");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }
}
