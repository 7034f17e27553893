use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use sha1::{Digest, Sha1};
use tracing::{debug, info};

use super::models::UploadResponse;
use crate::api::{ApiError, MediaPublisher};
use crate::config::CloudinaryCredentials;
use crate::models::{PublishedArtifact, RenderedChart};
use crate::utils::PipelineError;

/// Stable public id, so each run replaces the previous chart
pub const CHART_PUBLIC_ID: &str = "energy_prices";

/// Cloudinary upload API client
pub struct CloudinaryClient {
    http_client: HttpClient,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    base_url: String,
}

impl CloudinaryClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.cloudinary.com/v1_1";

    pub fn new(credentials: &CloudinaryCredentials) -> Self {
        Self::with_base_url(credentials, Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL (for testing)
    pub fn with_base_url(credentials: &CloudinaryCredentials, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            cloud_name: credentials.cloud_name.clone(),
            api_key: credentials.api_key.clone(),
            api_secret: credentials.api_secret.clone(),
            base_url,
        }
    }

    /// Signature over the sorted `key=value&...` string followed by the secret
    pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
        let to_sign = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha1::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// POST /{cloud_name}/image/upload
    ///
    /// Signed upload of a local PNG under a fixed public id.
    ///
    /// # Returns
    /// * `Ok(UploadResponse)` - hosted asset, including its `secure_url`
    /// * `Err(ApiError)` - unreadable file, transport error or non-2xx status
    pub async fn upload_image(
        &self,
        path: &Path,
        public_id: &str,
        overwrite: bool,
    ) -> Result<UploadResponse, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut params: BTreeMap<&'static str, String> = BTreeMap::new();
        params.insert("overwrite", overwrite.to_string());
        params.insert("public_id", public_id.to_string());
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());

        let signature = Self::sign(&params, &self.api_secret);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.png", public_id));
        let file_part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/png")
            .map_err(|e| ApiError::RequestError(format!("Invalid mime type: {}", e)))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let url = format!("{}/{}/image/upload", self.base_url, self.cloud_name);
        debug!("Uploading {} to {}", path.display(), url);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl MediaPublisher for CloudinaryClient {
    async fn publish(&self, chart: &RenderedChart) -> Result<PublishedArtifact, PipelineError> {
        let uploaded = self
            .upload_image(&chart.path, CHART_PUBLIC_ID, true)
            .await
            .map_err(|e| PipelineError::Publish(e.to_string()))?;

        info!(
            "☁️ Chart uploaded ({} bytes): {}",
            uploaded.bytes.unwrap_or_default(),
            uploaded.secure_url
        );

        Ok(PublishedArtifact {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }
}
