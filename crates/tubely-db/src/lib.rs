//! Tubely database layer
//!
//! Repositories for the video metadata store. The upload pipeline talks to
//! the `VideoStore` trait; `VideoRepository` is the Postgres implementation.

pub mod db;

pub use db::{VideoRepository, VideoStore};
#[cfg(any(test, feature = "test-helpers"))]
pub use db::InMemoryVideoStore;
