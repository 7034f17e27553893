//! Publish and notify models

/// An image hosted by the media service
#[derive(Debug, Clone)]
pub struct PublishedArtifact {
    pub public_id: String,
    pub url: String,
}

/// Terminal state of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The chart was published and the notification accepted by the gateway
    Delivered { message_id: String },
    /// The chart page had no bars; nothing was rendered or sent
    NoData,
}
