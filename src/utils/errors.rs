use thiserror::Error;

/// Failures that abort a pipeline run
///
/// An empty chart is not an error; see `PipelineOutcome::NoData`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Login or scrape failed: {0}")]
    Scrape(String),
    #[error("Malformed value '{value}' on chart bar {index}")]
    MalformedSample { index: usize, value: String },
    #[error("Insufficient samples for cubic interpolation: got {got}, need at least {needed}")]
    InsufficientSamples { got: usize, needed: usize },
    #[error("Interpolation failed: {0}")]
    Interpolation(String),
    #[error("Chart rendering failed: {0}")]
    Render(String),
    #[error("Chart upload failed: {0}")]
    Publish(String),
    #[error("Notification failed: {0}")]
    Notify(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_cause() {
        let err = PipelineError::Scrape("timed out waiting for #username".to_string());
        assert_eq!(err.to_string(), "Login or scrape failed: timed out waiting for #username");

        let err = PipelineError::InsufficientSamples { got: 3, needed: 4 };
        assert!(err.to_string().contains("got 3"));
        assert!(err.to_string().contains("at least 4"));
    }
}
