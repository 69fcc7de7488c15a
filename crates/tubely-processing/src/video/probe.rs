//! Media inspection via ffprobe.

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use super::command::run_tool;
use crate::traits::{MediaProber, ProbeResult, ToolError};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    // Audio and data streams carry no geometry
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

/// Parse `ffprobe -print_format json -show_streams` output, using the first stream.
pub fn parse_ffprobe_output(stdout: &[u8]) -> Result<ProbeResult, ToolError> {
    let parsed: FfprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ToolError::InvalidOutput(format!("ffprobe JSON: {}", e)))?;

    let first = parsed.streams.first().ok_or(ToolError::NoStreams)?;
    Ok(ProbeResult {
        width: first.width,
        height: first.height,
    })
}

/// `MediaProber` backed by the ffprobe binary
pub struct FfprobeProber {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            timeout,
        }
    }

    fn args(path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-v", "error", "-print_format", "json", "-show_streams"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(path.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> Result<ProbeResult, ToolError> {
        let output = run_tool(&self.ffprobe_path, &Self::args(path), self.timeout).await?;

        let result = parse_ffprobe_output(&output.stdout).inspect_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Unusable ffprobe output");
        })?;

        tracing::debug!(
            path = %path.display(),
            width = result.width,
            height = result.height,
            "Video probed"
        );
        Ok(result)
    }
}
