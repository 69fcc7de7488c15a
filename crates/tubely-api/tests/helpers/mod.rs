//! Test helpers: build AppState and router for integration tests.
//!
//! The router is the production one from `setup::routes`. The metadata store
//! is in memory and the media tools are fakes, so no Postgres, ffmpeg or S3
//! is needed.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtService;
use tubely_api::constants;
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_core::{BaseConfig, Config, StorageBackend, Video, VideoServiceConfig};
use tubely_db::InMemoryVideoStore;
use tubely_processing::test_helpers::{FakeProber, FakeRemuxer, RecordingStorage};
use tubely_processing::{StagingArea, UploadValidator, VideoUploadPipeline};
use tubely_storage::{LocalStorage, Storage};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_BUCKET: &str = "tubely-test";
pub const TEST_REGION: &str = "us-east-2";
pub const LOCAL_BASE_URL: &str = "http://localhost:8091/media";

/// API path prefix for tests
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn upload_path(video_id: impl std::fmt::Display) -> String {
    api_path(&format!("/videos/{}/upload", video_id))
}

/// Multipart form with one `video` part.
pub fn video_form(bytes: &[u8], mime: &str) -> MultipartForm {
    let part = Part::bytes(bytes.to_vec())
        .file_name("boots.mp4")
        .mime_type(mime);
    MultipartForm::new().add_part("video", part)
}

const CHUNKED_BOUNDARY: &str = "tubely-chunked-boundary";
const CHUNK_SIZE: usize = 16 * 1024;

/// One part of a hand-built multipart body: name, optional MIME, bytes.
pub struct RawPart<'a> {
    pub name: &'a str,
    pub mime: Option<&'a str>,
    pub bytes: Vec<u8>,
}

/// Upload request whose multipart body is streamed in chunks with no
/// `Content-Length`, so only the streamed size can be checked.
pub fn chunked_upload_request(uri: &str, bearer: &str, parts: Vec<RawPart<'_>>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", CHUNKED_BOUNDARY).as_bytes());
        match part.mime {
            Some(mime) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"boots.mp4\"\r\nContent-Type: {}\r\n\r\n",
                    part.name, mime
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                    .as_bytes(),
            ),
        }
        body.extend_from_slice(&part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", CHUNKED_BOUNDARY).as_bytes());

    let chunks: Vec<Vec<u8>> = body.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let stream = futures::stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, bearer)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", CHUNKED_BOUNDARY),
        )
        .body(Body::from_stream(stream))
        .expect("Failed to build chunked request")
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true)
}

/// Test application: server plus handles on every fake behind it.
pub struct TestApp {
    pub server: TestServer,
    pub router: Router,
    pub videos: InMemoryVideoStore,
    pub storage: RecordingStorage,
    pub prober: FakeProber,
    pub jwt: JwtService,
    pub staging_dir: TempDir,
    pub media_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.jwt.issue(user_id).expect("Failed to sign token")
    }

    pub fn bearer(&self, user_id: Uuid) -> String {
        format!("Bearer {}", self.token_for(user_id))
    }

    /// Insert a video record owned by `owner`.
    pub async fn seed_video(&self, owner: Uuid) -> Video {
        let video = Video::new(owner, "Boots", "Boots on the ground");
        self.videos.insert(video.clone()).await;
        video
    }
}

pub struct TestAppBuilder {
    prober: FakeProber,
    remuxer: FakeRemuxer,
    storage: RecordingStorage,
    local_storage: bool,
    max_video_size_bytes: u64,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            prober: FakeProber::new(1920, 1080),
            remuxer: FakeRemuxer::new(),
            storage: RecordingStorage::new(TEST_BUCKET, TEST_REGION),
            local_storage: false,
            max_video_size_bytes: 64 * 1024,
        }
    }
}

impl TestAppBuilder {
    pub fn prober(mut self, prober: FakeProber) -> Self {
        self.prober = prober;
        self
    }

    pub fn remuxer(mut self, remuxer: FakeRemuxer) -> Self {
        self.remuxer = remuxer;
        self
    }

    pub fn storage(mut self, storage: RecordingStorage) -> Self {
        self.storage = storage;
        self
    }

    /// Use `LocalStorage` in a temp dir instead of the recording fake.
    pub fn local_storage(mut self) -> Self {
        self.local_storage = true;
        self
    }

    pub fn max_video_size_bytes(mut self, max: u64) -> Self {
        self.max_video_size_bytes = max;
        self
    }

    pub async fn build(self) -> TestApp {
        let staging_dir = tempfile::tempdir().expect("Failed to create staging dir");
        let media_dir = tempfile::tempdir().expect("Failed to create media dir");

        let config = create_test_config(
            staging_dir.path(),
            media_dir.path(),
            self.local_storage,
            self.max_video_size_bytes,
        );

        let storage: Arc<dyn Storage> = if self.local_storage {
            Arc::new(
                LocalStorage::new(media_dir.path(), LOCAL_BASE_URL.to_string())
                    .await
                    .expect("Failed to create local storage"),
            )
        } else {
            Arc::new(self.storage.clone())
        };

        let videos = InMemoryVideoStore::new();
        let pipeline = VideoUploadPipeline::new(
            UploadValidator::new(self.max_video_size_bytes),
            StagingArea::new(staging_dir.path()),
            Arc::new(self.prober.clone()),
            Arc::new(self.remuxer),
            storage.clone(),
            Arc::new(videos.clone()),
        );

        let jwt = JwtService::new(TEST_JWT_SECRET, 1);
        let state = Arc::new(AppState {
            jwt: jwt.clone(),
            videos: Arc::new(videos.clone()),
            storage,
            pipeline,
        });

        let app = routes::setup_routes(&config, state).expect("Failed to build router");
        let server = TestServer::new(app.clone()).expect("Failed to create test server");

        TestApp {
            server,
            router: app,
            videos,
            storage: self.storage,
            prober: self.prober,
            jwt,
            staging_dir,
            media_dir,
        }
    }
}

/// Default test app: landscape prober, copying remuxer, recording storage.
pub async fn setup_test_app() -> TestApp {
    TestAppBuilder::default().build().await
}

pub fn create_test_config(
    staging_dir: &Path,
    media_dir: &Path,
    local_storage: bool,
    max_video_size_bytes: u64,
) -> Config {
    Config(Box::new(VideoServiceConfig {
        base: BaseConfig {
            server_port: 8091,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_expiry_hours: 1,
            environment: "test".to_string(),
        },
        database_url: "postgres://unused/tubely".to_string(),
        storage_backend: if local_storage {
            StorageBackend::Local
        } else {
            StorageBackend::S3
        },
        s3_bucket: Some(TEST_BUCKET.to_string()),
        s3_region: Some(TEST_REGION.to_string()),
        s3_endpoint: None,
        local_storage_path: media_dir.display().to_string(),
        local_storage_base_url: LOCAL_BASE_URL.to_string(),
        max_video_size_bytes,
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        media_tool_timeout_secs: 5,
        staging_dir: Some(staging_dir.to_path_buf()),
    }))
}
