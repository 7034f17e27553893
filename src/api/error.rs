use thiserror::Error;
use tracing::warn;

/// Error type shared by the media host and messaging gateway clients
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Rate Limited: {0}")]
    RateLimited(String),
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
    #[error("IO Error: {0}")]
    Io(String),
}

/// Pull a human readable message out of a JSON error body
///
/// Understands `{"message": ".."}` (Twilio) and `{"error": {"message": ".."}}`
/// (Cloudinary); anything else is returned verbatim.
pub fn extract_error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    json.get("message")
        .and_then(|v| v.as_str())
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|v| v.as_str())
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

impl ApiError {
    /// Classify a non-success response by status code
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_error_message(body);

        match status {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            429 => {
                warn!("Rate limited by remote API: {}", message);
                ApiError::RateLimited(message)
            }
            500..=599 => {
                warn!("Server error {}: {}", status, message);
                ApiError::ServerError(status, message)
            }
            _ => ApiError::HttpError(status, message),
        }
    }

    /// Read the body of a failed response and classify it
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::from_status(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_twilio_message() {
        let body = r#"{"code": 21211, "message": "The 'To' number is not a valid phone number.", "status": 400}"#;
        assert_eq!(
            extract_error_message(body),
            "The 'To' number is not a valid phone number."
        );
    }

    #[test]
    fn test_extracts_cloudinary_message() {
        let body = r#"{"error": {"message": "Invalid Signature 3f2a. String to sign - 'public_id=energy_prices&timestamp=1'."}}"#;
        assert!(extract_error_message(body).starts_with("Invalid Signature"));
    }

    #[test]
    fn test_plain_body_passes_through() {
        assert_eq!(extract_error_message("upstream timeout"), "upstream timeout");
        assert_eq!(extract_error_message(r#"{"detail": "x"}"#), r#"{"detail": "x"}"#);
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(ApiError::from_status(401, "nope"), ApiError::Unauthorized(_)));
        assert!(matches!(ApiError::from_status(429, ""), ApiError::RateLimited(_)));
        assert!(matches!(ApiError::from_status(503, ""), ApiError::ServerError(503, _)));
        assert!(matches!(ApiError::from_status(418, ""), ApiError::HttpError(418, _)));
        assert_eq!(
            ApiError::from_status(404, r#"{"message": "missing"}"#).to_string(),
            "Not Found: missing"
        );
    }
}
