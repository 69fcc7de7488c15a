//! Tubely Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by the storage, database, processing and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, VideoServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AspectBucket, Video, VideoResponse};
pub use storage_types::StorageBackend;
