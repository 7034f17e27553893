//! Data models for the energy price pipeline
//!
//! Everything here lives for a single invocation; nothing is persisted.

pub mod chart;
pub mod publish;

// Re-export commonly used types for convenience
pub use chart::{PricePoint, RenderedChart, SampleSeries, SmoothedCurve};
pub use publish::{PipelineOutcome, PublishedArtifact};
