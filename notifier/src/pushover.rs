use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use market::types::Notification;

use crate::error::NotifyError;
use crate::sink::NotifySink;

pub const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Pushover messages API client. One form-encoded POST per notification.
#[derive(Clone)]
pub struct PushoverClient {
    http: Client,
    url: String,
    api_token: String,
    user_key: String,
}

impl PushoverClient {
    pub fn new(api_token: String, user_key: String) -> Result<Self, NotifyError> {
        Self::with_url(PUSHOVER_API_URL.to_string(), api_token, user_key)
    }

    pub fn with_url(
        url: String,
        api_token: String,
        user_key: String,
    ) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            http,
            url,
            api_token,
            user_key,
        })
    }
}

#[async_trait]
impl NotifySink for PushoverClient {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        let resp = self
            .http
            .post(&self.url)
            .form(&[
                ("token", self.api_token.as_str()),
                ("user", self.user_key.as_str()),
                ("message", notification.body.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }

        debug!(instrument = %notification.instrument, "notification delivered");
        Ok(())
    }
}
