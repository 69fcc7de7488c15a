//! Fast-start remux via ffmpeg (stream copy, moov atom moved to the front).

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use super::command::run_tool;
use crate::traits::{FastStartRemuxer, ToolError};

/// `FastStartRemuxer` backed by the ffmpeg binary
pub struct FfmpegRemuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }

    fn args(input: &Path, output: &Path) -> Vec<OsString> {
        let mut args = vec![OsString::from("-i"), input.as_os_str().to_owned()];
        args.extend(
            ["-c", "copy", "-movflags", "faststart", "-f", "mp4"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl FastStartRemuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        run_tool(&self.ffmpeg_path, &Self::args(input, output), self.timeout).await?;

        let written = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(ToolError::InvalidOutput(format!(
                "ffmpeg produced no output at {}",
                output.display()
            )));
        }

        tracing::debug!(output = %output.display(), size_bytes = written, "Fast-start remux complete");
        Ok(())
    }
}
