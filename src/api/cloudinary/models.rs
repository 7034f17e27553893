use serde::{Deserialize, Serialize};

/// Response from the image upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub public_id: String,
    pub secure_url: String,
    pub bytes: Option<u64>,
}
