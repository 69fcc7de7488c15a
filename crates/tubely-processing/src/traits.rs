//! Capability traits for the external media tools.
//!
//! The orchestrator only sees these traits, so its logic can be exercised
//! with fakes when ffprobe/ffmpeg are not installed.

use async_trait::async_trait;
use std::path::Path;

/// Geometry of the first stream reported by the media inspection tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub width: u32,
    pub height: u32,
}

/// Errors from invoking an external media tool
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} did not finish within {timeout_secs}s")]
    Timeout { tool: String, timeout_secs: u64 },

    #[error("{tool} exited with {status}: {stderr}")]
    NonZeroExit {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Invalid tool output: {0}")]
    InvalidOutput(String),

    #[error("No streams found in media file")]
    NoStreams,
}

/// Read-only inspection of a staged media file.
#[async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<ProbeResult, ToolError>;
}

/// Stream-copy remux into a fast-start container.
///
/// The caller owns `output`: it picks the path and removes it afterwards,
/// including when the remux fails halfway through writing.
#[async_trait]
pub trait FastStartRemuxer: Send + Sync {
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}
