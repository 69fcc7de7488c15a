//! Video upload pipeline.

pub mod pipeline;
pub mod types;

pub use pipeline::{PipelineError, VideoUploadPipeline};
pub use types::{PipelineStage, VideoUpload};
