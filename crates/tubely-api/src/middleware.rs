//! Request guards applied ahead of authentication.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Size Guard on the declared `Content-Length`.
///
/// Rejects with 413 before the body is touched. Requests without the header
/// pass; staging enforces the ceiling on the streamed bytes.
pub async fn declared_size_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if let Err(e) = state.pipeline.validator().check_declared_size(declared) {
        return HttpAppError::from(e).into_response();
    }

    next.run(request).await
}
