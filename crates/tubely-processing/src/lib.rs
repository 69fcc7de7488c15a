//! Tubely processing library
//!
//! The video upload pipeline: request guards, staging of uploaded bytes,
//! ffprobe inspection, aspect classification, ffmpeg fast-start remux, and
//! the orchestrator that sequences them.

pub mod staging;
pub mod traits;
pub mod upload;
pub mod validator;
pub mod video;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use staging::{StagedFile, StagingArea, StagingError};
pub use traits::{FastStartRemuxer, MediaProber, ProbeResult, ToolError};
pub use upload::{PipelineError, PipelineStage, VideoUpload, VideoUploadPipeline};
pub use validator::{normalize_mime_type, UploadValidator, ValidationError};
pub use video::{classify, FfmpegRemuxer, FfprobeProber};
