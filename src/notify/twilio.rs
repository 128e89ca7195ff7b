//! Twilio Messages API (SMS and WhatsApp).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::credentials::MessagingCredentials;
use crate::config::MessagingConfig;
use crate::notify::{AdapterError, MessageId, SmsSender};

const PROVIDER: &str = "twilio";

#[derive(Deserialize)]
struct MessageResponse {
    sid: String,
}

/// Sends messages through the Twilio REST API.
///
/// Numbers are passed through untouched, so `whatsapp:+1555…` works for
/// both sender and recipient.
pub struct TwilioSms {
    client: reqwest::Client,
    api_base: String,
    from: String,
    credentials: MessagingCredentials,
}

impl TwilioSms {
    pub fn new(config: &MessagingConfig, credentials: MessagingCredentials) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            from: config.from.clone(),
            credentials,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.credentials.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSms {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn send(&self, to: &str, body: &str) -> Result<MessageId, AdapterError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(&[("From", self.from.as_str()), ("To", to), ("Body", body)])
            .send()
            .await
            .map_err(|e| AdapterError::transport(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let message: MessageResponse = response.json().await.map_err(|e| AdapterError::InvalidResponse {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        tracing::info!(to = %to, sid = %message.sid, "Message sent");
        Ok(MessageId(message.sid))
    }
}
