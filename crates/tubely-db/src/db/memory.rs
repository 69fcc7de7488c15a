use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tubely_core::{AppError, Video};
use uuid::Uuid;

use super::video::VideoStore;

/// In-memory `VideoStore` for tests. Counts updates so tests can assert
/// that a failed upload never touched the record.
#[derive(Clone, Default)]
pub struct InMemoryVideoStore {
    videos: Arc<Mutex<HashMap<Uuid, Video>>>,
    updates: Arc<AtomicUsize>,
    fail_updates: Arc<AtomicBool>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly.
    pub async fn insert(&self, video: Video) {
        self.videos.lock().await.insert(video.id, video);
    }

    pub async fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().await.get(&id).cloned()
    }

    /// Number of successful `update_video` calls
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Make every subsequent `update_video` fail with a database-style error.
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        self.videos.lock().await.insert(video.id, video.clone());
        Ok(video.clone())
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.lock().await.get(&id).cloned())
    }

    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("update rejected by test store".to_string()));
        }

        let mut videos = self.videos.lock().await;
        let Some(existing) = videos.get_mut(&video.id) else {
            return Err(AppError::NotFound(format!("Video {} not found", video.id)));
        };

        *existing = Video {
            updated_at: Utc::now(),
            ..video.clone()
        };
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(existing.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
