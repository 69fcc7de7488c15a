//! Tubely API Library
//!
//! HTTP surface of the video service: auth, the upload handler, health,
//! and application setup.

mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
mod middleware;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
