//! Tubely Storage Library
//!
//! Storage abstraction and implementations (S3 and local filesystem) for
//! uploaded videos.
//!
//! # Storage key format
//!
//! `{bucket_prefix}{64 hex chars}.mp4`, where the prefix is `landscape/`,
//! `portrait/` or `other/` depending on the video's aspect ratio. Key
//! generation lives in the `keys` module so all backends stay consistent.
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::{s3_object_url, S3Storage};
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
