//! Test doubles for the pipeline's external collaborators.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tubely_core::StorageBackend;
use tubely_storage::{s3_object_url, Storage, StorageError, StorageResult};

use crate::traits::{FastStartRemuxer, MediaProber, ProbeResult, ToolError};

#[derive(Clone, Copy)]
enum ProbeOutcome {
    Size(u32, u32),
    NoStreams,
    Exit,
}

/// `MediaProber` returning a fixed result. Fails if the staged file is missing.
#[derive(Clone)]
pub struct FakeProber {
    outcome: ProbeOutcome,
    calls: Arc<AtomicUsize>,
}

impl FakeProber {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with(ProbeOutcome::Size(width, height))
    }

    pub fn no_streams() -> Self {
        Self::with(ProbeOutcome::NoStreams)
    }

    pub fn failing() -> Self {
        Self::with(ProbeOutcome::Exit)
    }

    fn with(outcome: ProbeOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProber for FakeProber {
    async fn probe(&self, path: &Path) -> Result<ProbeResult, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !path.exists() {
            return Err(ToolError::InvalidOutput(format!(
                "{} does not exist",
                path.display()
            )));
        }
        match self.outcome {
            ProbeOutcome::Size(width, height) => Ok(ProbeResult { width, height }),
            ProbeOutcome::NoStreams => Err(ToolError::NoStreams),
            ProbeOutcome::Exit => Err(ToolError::NonZeroExit {
                tool: "ffprobe".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy)]
enum RemuxOutcome {
    Copy,
    PartialThenFail,
    Hang,
}

/// `FastStartRemuxer` that copies input to output, or simulates failures.
#[derive(Clone)]
pub struct FakeRemuxer {
    outcome: RemuxOutcome,
}

impl FakeRemuxer {
    pub fn new() -> Self {
        Self {
            outcome: RemuxOutcome::Copy,
        }
    }

    /// Writes part of the output, then fails like a crashed ffmpeg.
    pub fn failing_after_partial_write() -> Self {
        Self {
            outcome: RemuxOutcome::PartialThenFail,
        }
    }

    /// Writes part of the output, then never returns.
    pub fn hanging() -> Self {
        Self {
            outcome: RemuxOutcome::Hang,
        }
    }
}

impl Default for FakeRemuxer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FastStartRemuxer for FakeRemuxer {
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        match self.outcome {
            RemuxOutcome::Copy => {
                tokio::fs::copy(input, output)
                    .await
                    .map_err(|e| ToolError::InvalidOutput(e.to_string()))?;
                Ok(())
            }
            RemuxOutcome::PartialThenFail => {
                let _ = tokio::fs::write(output, b"partial").await;
                Err(ToolError::NonZeroExit {
                    tool: "ffmpeg".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "moov atom not found".to_string(),
                })
            }
            RemuxOutcome::Hang => {
                let _ = tokio::fs::write(output, b"partial").await;
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

/// One call to `RecordingStorage::upload_file`
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub key: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// `Storage` that keeps uploads in memory and builds AWS-style URLs.
#[derive(Clone)]
pub struct RecordingStorage {
    bucket: String,
    region: String,
    fail: bool,
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
}

impl RecordingStorage {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            fail: false,
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every upload fails like an S3 transport error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("tubely-test", "us-east-2")
        }
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads
            .lock()
            .map(|u| u.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload_file(
        &self,
        storage_key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        if self.fail {
            return Err(StorageError::UploadFailed(
                "dispatch failure: connection refused".to_string(),
            ));
        }
        let bytes = tokio::fs::read(path).await?;
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(RecordedUpload {
                key: storage_key.to_string(),
                content_type: content_type.to_string(),
                bytes,
            });
        }
        Ok(self.public_url(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let mut uploads = self
            .uploads
            .lock()
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        let before = uploads.len();
        uploads.retain(|u| u.key != storage_key);
        if uploads.len() == before {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.uploads().iter().any(|u| u.key == storage_key))
    }

    fn public_url(&self, storage_key: &str) -> String {
        s3_object_url(&self.bucket, &self.region, None, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
