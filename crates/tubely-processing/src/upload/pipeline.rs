//! Upload pipeline: validate → stage → probe → classify → remux → upload → persist.
//!
//! `VideoUploadPipeline` owns every temporary file it creates. Staged and
//! remuxed files are `TempPath` guards held on the stack of `process`, so they
//! are removed on success, on every error return, and when the request future
//! is dropped mid-flight.

use std::sync::Arc;
use tokio::io::AsyncRead;
use uuid::Uuid;

use tubely_core::{AppError, Video};
use tubely_db::VideoStore;
use tubely_storage::{generate_storage_key, Storage, StorageError};

use super::types::{PipelineStage, VideoUpload};
use crate::staging::{StagingArea, StagingError};
use crate::traits::{FastStartRemuxer, MediaProber, ToolError};
use crate::validator::{UploadValidator, ValidationError};
use crate::video::classify;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Video not found: {0}")]
    NotFound(Uuid),

    #[error("Failed to read upload body: {0}")]
    BodyRead(#[source] std::io::Error),

    #[error("Video lookup failed: {0}")]
    Lookup(#[source] AppError),

    #[error("Staging failed: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Probe failed: {0}")]
    ProbeFailed(#[source] ToolError),

    #[error("Remux failed: {0}")]
    RemuxFailed(#[source] ToolError),

    #[error("Upload failed: {0}")]
    UploadFailed(#[source] StorageError),

    #[error("Persist failed: {0}")]
    PersistFailed(#[source] AppError),
}

impl From<StagingError> for PipelineError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::Validation(e) => PipelineError::Validation(e),
            StagingError::Read(e) => PipelineError::BodyRead(e),
            StagingError::Io(e) => PipelineError::Staging(e),
        }
    }
}

/// Sequences one upload from request body to persisted URL.
#[derive(Clone)]
pub struct VideoUploadPipeline {
    validator: UploadValidator,
    staging: StagingArea,
    prober: Arc<dyn MediaProber>,
    remuxer: Arc<dyn FastStartRemuxer>,
    storage: Arc<dyn Storage>,
    videos: Arc<dyn VideoStore>,
}

impl VideoUploadPipeline {
    pub fn new(
        validator: UploadValidator,
        staging: StagingArea,
        prober: Arc<dyn MediaProber>,
        remuxer: Arc<dyn FastStartRemuxer>,
        storage: Arc<dyn Storage>,
        videos: Arc<dyn VideoStore>,
    ) -> Self {
        Self {
            validator,
            staging,
            prober,
            remuxer,
            storage,
            videos,
        }
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    /// Existence, then ownership. A record owned by someone else is
    /// `Unauthorized`, never `NotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn authorize(&self, video_id: Uuid, user_id: Uuid) -> Result<Video, PipelineError> {
        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(PipelineError::Lookup)?
            .ok_or(PipelineError::NotFound(video_id))?;

        if !video.is_owned_by(user_id) {
            return Err(PipelineError::Unauthorized(
                "You are not the owner of this video".to_string(),
            ));
        }

        Ok(video)
    }

    /// Run the pipeline for an already authorized `video`.
    #[tracing::instrument(skip_all, fields(video_id = %video.id, user_id = %video.user_id))]
    pub async fn process<R>(
        &self,
        video: Video,
        upload: VideoUpload<R>,
    ) -> Result<Video, PipelineError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = std::time::Instant::now();
        let mut stage = PipelineStage::Validating;

        match self.run_stages(video, upload, &mut stage).await {
            Ok(video) => {
                tracing::info!(
                    video_url = video.video_url.as_deref().unwrap_or_default(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Video upload persisted"
                );
                Ok(video)
            }
            Err(e) => {
                tracing::warn!(
                    last_stage = %stage,
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Video upload failed"
                );
                Err(e)
            }
        }
    }

    async fn run_stages<R>(
        &self,
        mut video: Video,
        upload: VideoUpload<R>,
        stage: &mut PipelineStage,
    ) -> Result<Video, PipelineError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let content_type = upload.content_type.unwrap_or_default();
        self.validator.validate_content_type(Some(&content_type))?;

        let staged = self
            .staging
            .stage(upload.body, self.validator.max_size())
            .await?;
        advance(stage, PipelineStage::Staged);

        let probe = self
            .prober
            .probe(staged.path())
            .await
            .map_err(PipelineError::ProbeFailed)?;
        advance(stage, PipelineStage::Probed);

        let bucket = classify(probe.width, probe.height);
        tracing::debug!(
            width = probe.width,
            height = probe.height,
            bucket = %bucket,
            "Aspect bucket chosen"
        );
        advance(stage, PipelineStage::Classified);

        // Guard exists before ffmpeg starts so a partial output is removed too
        let remuxed = staged.remux_output().map_err(PipelineError::Staging)?;
        self.remuxer
            .remux(staged.path(), &remuxed)
            .await
            .map_err(PipelineError::RemuxFailed)?;
        drop(staged);
        advance(stage, PipelineStage::Remuxed);

        let key = generate_storage_key(bucket);
        let url = self
            .storage
            .upload_file(&key, &remuxed, &content_type)
            .await
            .map_err(PipelineError::UploadFailed)?;
        drop(remuxed);
        advance(stage, PipelineStage::Uploaded);

        video.video_url = Some(url);
        let video = self
            .videos
            .update_video(&video)
            .await
            .map_err(PipelineError::PersistFailed)?;
        advance(stage, PipelineStage::Persisted);

        Ok(video)
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    debug_assert!(next > *stage);
    tracing::debug!(from = %stage, to = %next, "Pipeline stage transition");
    *stage = next;
}
