//! Database repositories for data access layer
//
// Video metadata repository and store trait
pub mod video;
//
// In-memory store used by tests
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;

pub use video::{VideoRepository, VideoStore};
#[cfg(any(test, feature = "test-helpers"))]
pub use memory::InMemoryVideoStore;
