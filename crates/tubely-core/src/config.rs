//! Configuration module
//!
//! Configuration structures for the video service: server, database,
//! authentication, storage and media tool settings. Values come from the
//! process environment after loading `.env`.

use std::env;
use std::path::PathBuf;

use crate::constants::{MAX_VIDEO_SIZE_BYTES, MEDIA_TOOL_TIMEOUT_SECS};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: String,
}

/// Video service configuration
#[derive(Clone, Debug)]
pub struct VideoServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO etc.)
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Media processing configuration
    pub max_video_size_bytes: u64,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub media_tool_timeout_secs: u64,
    /// Directory for staged uploads; system temp dir when unset
    pub staging_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<VideoServiceConfig>);

impl Config {
    fn as_video(&self) -> &VideoServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_video().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = VideoServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_video().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_video().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_video().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_video().base.environment
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_video().base.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.as_video().base.jwt_expiry_hours
    }

    pub fn database_url(&self) -> &str {
        &self.as_video().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_video().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_video().base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_video().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_video().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_video().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_video().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.as_video().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.as_video().local_storage_base_url
    }

    pub fn max_video_size_bytes(&self) -> u64 {
        self.as_video().max_video_size_bytes
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_video().ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_video().ffmpeg_path
    }

    pub fn media_tool_timeout_secs(&self) -> u64 {
        self.as_video().media_tool_timeout_secs
    }

    /// Staging directory, falling back to the system temp dir.
    pub fn staging_dir(&self) -> PathBuf {
        self.as_video()
            .staging_dir
            .clone()
            .unwrap_or_else(env::temp_dir)
    }
}

impl VideoServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse::<u16>()
            .unwrap_or(SERVER_PORT);

        let base = BaseConfig {
            server_port,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            environment,
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .parse::<StorageBackend>()?;

        let local_storage_base_url = env::var("LOCAL_STORAGE_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}/media", server_port));

        Ok(Self {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./storage".to_string()),
            local_storage_base_url,
            max_video_size_bytes: env::var("MAX_VIDEO_SIZE_BYTES")
                .unwrap_or_else(|_| MAX_VIDEO_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_VIDEO_SIZE_BYTES),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            media_tool_timeout_secs: env::var("MEDIA_TOOL_TIMEOUT_SECS")
                .unwrap_or_else(|_| MEDIA_TOOL_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(MEDIA_TOOL_TIMEOUT_SECS),
            staging_dir: env::var("STAGING_DIR").ok().map(PathBuf::from),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_BYTES must be greater than 0"));
        }

        if self.media_tool_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "MEDIA_TOOL_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.storage_backend == StorageBackend::S3
            && (self.s3_bucket.is_none() || self.s3_region.is_none())
        {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=s3 requires S3_BUCKET and S3_REGION to be set"
            ));
        }

        Ok(())
    }
}
