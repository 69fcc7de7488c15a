//! Types for the upload pipeline.

use std::fmt::{Display, Formatter, Result as FmtResult};
use tokio::io::AsyncRead;

/// The `video` part of an upload request, not yet read.
pub struct VideoUpload<R> {
    /// Content type declared on the multipart part
    pub content_type: Option<String>,
    pub body: R,
}

impl<R: AsyncRead + Unpin> VideoUpload<R> {
    pub fn new(content_type: Option<String>, body: R) -> Self {
        Self { content_type, body }
    }
}

/// Pipeline states, in order. Transitions only move forward; any state can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Validating,
    Staged,
    Probed,
    Classified,
    Remuxed,
    Uploaded,
    Persisted,
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            PipelineStage::Validating => "validating",
            PipelineStage::Staged => "staged",
            PipelineStage::Probed => "probed",
            PipelineStage::Classified => "classified",
            PipelineStage::Remuxed => "remuxed",
            PipelineStage::Uploaded => "uploaded",
            PipelineStage::Persisted => "persisted",
        };
        write!(f, "{}", name)
    }
}
