use serde::{Deserialize, Serialize};

const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Prefix a phone number with the WhatsApp channel unless it already has it
pub fn whatsapp_address(number: &str) -> String {
    let number = number.trim();
    if number.starts_with(WHATSAPP_PREFIX) {
        number.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, number)
    }
}

/// Outgoing message for the Messages resource
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub from: String,
    pub to: String,
    pub body: String,
    pub media_urls: Vec<String>,
}

impl OutgoingMessage {
    /// Form fields as the Messages endpoint expects them; `MediaUrl` repeats
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("From", self.from.clone()),
            ("To", self.to.clone()),
            ("Body", self.body.clone()),
        ];
        fields.extend(self.media_urls.iter().map(|url| ("MediaUrl", url.clone())));
        fields
    }
}

/// Message resource returned after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub sid: String,
    pub status: Option<String>,
}
