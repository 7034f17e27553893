//! External collaborators of the chart pipeline
//!
//! Each collaborator sits behind a small trait so the pipeline can be driven
//! with real clients in production and with fakes in tests.

pub mod browser;
pub mod cloudinary;
pub mod error;
pub mod twilio;

use async_trait::async_trait;

use crate::models::{PublishedArtifact, RenderedChart};
use crate::utils::PipelineError;

pub use error::ApiError;

/// Logs into the target site and returns the fully rendered chart page
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn fetch_markup(&self) -> Result<String, PipelineError>;
}

/// Uploads a rendered chart and returns its public URL
#[async_trait]
pub trait MediaPublisher: Send + Sync {
    async fn publish(&self, chart: &RenderedChart) -> Result<PublishedArtifact, PipelineError>;
}

/// Sends a message with one media attachment; returns the gateway's message id
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, body: &str, media_url: &str) -> Result<String, PipelineError>;
}

#[cfg(test)]
pub mod test_support {
    use axum::Router;

    /// Serve `router` on an ephemeral local port and return its base URL
    pub async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        format!("http://{}", addr)
    }
}
