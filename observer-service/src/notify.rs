//! Fan notifications via Threema Gateway.

use anyhow::anyhow;
use threema_gateway::{ApiBuilder, E2eApi, RecipientKey};
use tracing::{info, warn};

use crate::config::Threema;

pub struct Notifier {
    api: E2eApi,
    recipients: Vec<String>,
}

impl Notifier {
    pub fn new(config: &Threema) -> anyhow::Result<Self> {
        let api = ApiBuilder::new(config.gateway_id.as_str(), config.gateway_secret.as_str())
            .with_private_key_str(&config.private_key)
            .and_then(|builder| builder.into_e2e())
            .map_err(|e| anyhow!("Could not create Threema API: {:?}", e))?;
        Ok(Self {
            api,
            recipients: config.recipients.clone(),
        })
    }

    /// Send a text message to all recipients.
    ///
    /// Failures are logged, one unreachable recipient doesn't stop the others.
    pub async fn notify(&self, text: &str) {
        for recipient in &self.recipients {
            match self.send(recipient, text).await {
                Ok(message_id) => info!(%recipient, %message_id, "Notification sent"),
                Err(e) => warn!(%recipient, "Could not send notification: {:#}", e),
            }
        }
    }

    async fn send(&self, recipient: &str, text: &str) -> anyhow::Result<String> {
        let public_key = self
            .api
            .lookup_pubkey(recipient)
            .await
            .map_err(|e| anyhow!("Public key lookup failed: {:?}", e))?;
        let recipient_key: RecipientKey = public_key.into();
        let encrypted = self
            .api
            .encrypt_text_msg(text, &recipient_key);
        self.api
            .send(recipient, &encrypted, false)
            .await
            .map_err(|e| anyhow!("Sending failed: {:?}", e))
    }
}
