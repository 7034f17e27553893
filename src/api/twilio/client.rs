use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, info};

use super::models::{whatsapp_address, MessageResponse, OutgoingMessage};
use crate::api::{ApiError, Notifier};
use crate::config::TwilioCredentials;
use crate::utils::PipelineError;

/// Twilio REST client for the Messages resource
pub struct TwilioClient {
    http_client: HttpClient,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.twilio.com/2010-04-01";

    pub fn new(credentials: &TwilioCredentials) -> Self {
        Self::with_base_url(credentials, Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL (for testing)
    pub fn with_base_url(credentials: &TwilioCredentials, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            account_sid: credentials.account_sid.clone(),
            auth_token: credentials.auth_token.clone(),
            base_url,
        }
    }

    /// POST /Accounts/{account_sid}/Messages.json
    ///
    /// # Returns
    /// * `Ok(MessageResponse)` - the created message, carrying its `sid`
    /// * `Err(ApiError)` - transport error or non-2xx status
    pub async fn send_message(&self, message: &OutgoingMessage) -> Result<MessageResponse, ApiError> {
        let url = format!("{}/Accounts/{}/Messages.json", self.base_url, self.account_sid);
        debug!("Sending message to {} via {}", message.to, url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&message.form_fields())
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        response
            .json::<MessageResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}

/// Sends chart notifications over WhatsApp to one fixed recipient
pub struct WhatsAppNotifier {
    client: TwilioClient,
    from: String,
    to: String,
}

impl WhatsAppNotifier {
    pub fn new(client: TwilioClient, from: &str, to: &str) -> Self {
        Self {
            client,
            from: whatsapp_address(from),
            to: whatsapp_address(to),
        }
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    async fn notify(&self, body: &str, media_url: &str) -> Result<String, PipelineError> {
        let message = OutgoingMessage {
            from: self.from.clone(),
            to: self.to.clone(),
            body: body.to_string(),
            media_urls: vec![media_url.to_string()],
        };

        let sent = self
            .client
            .send_message(&message)
            .await
            .map_err(|e| PipelineError::Notify(e.to_string()))?;

        info!("💬 Message sent: {} ({})", sent.sid, sent.status.as_deref().unwrap_or("unknown"));

        Ok(sent.sid)
    }
}
