//! Wiring of repositories, media tools and the upload pipeline into `AppState`

use crate::auth::JwtService;
use crate::state::AppState;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::Config;
use tubely_db::{VideoRepository, VideoStore};
use tubely_processing::{
    FfmpegRemuxer, FfprobeProber, StagingArea, UploadValidator, VideoUploadPipeline,
};
use tubely_storage::Storage;

pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let videos: Arc<dyn VideoStore> = Arc::new(VideoRepository::new(pool));

    let staging_dir = config.staging_dir();
    tokio::fs::create_dir_all(&staging_dir)
        .await
        .with_context(|| format!("Failed to create staging dir {}", staging_dir.display()))?;

    let tool_timeout = Duration::from_secs(config.media_tool_timeout_secs());
    let pipeline = VideoUploadPipeline::new(
        UploadValidator::new(config.max_video_size_bytes()),
        StagingArea::new(&staging_dir),
        Arc::new(FfprobeProber::new(config.ffprobe_path(), tool_timeout)),
        Arc::new(FfmpegRemuxer::new(config.ffmpeg_path(), tool_timeout)),
        storage.clone(),
        videos.clone(),
    );

    tracing::info!(
        staging_dir = %staging_dir.display(),
        ffprobe = config.ffprobe_path(),
        ffmpeg = config.ffmpeg_path(),
        timeout_secs = config.media_tool_timeout_secs(),
        "Upload pipeline ready"
    );

    Ok(Arc::new(AppState {
        jwt: JwtService::new(config.jwt_secret(), config.jwt_expiry_hours()),
        videos,
        storage,
        pipeline,
    }))
}
