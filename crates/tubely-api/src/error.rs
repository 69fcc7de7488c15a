//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors
//! from the pipeline, validator and storage convert into `HttpAppError` so
//! every failure renders the same JSON envelope.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tubely_core::{AppError, ErrorMetadata, LogLevel};
use tubely_processing::{PipelineError, ValidationError};
use tubely_storage::StorageError;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            error_type: None,
            code: code.into(),
            recoverable: false,
            suggested_action: None,
        }
    }
}

/// Wrapper so `IntoResponse` can be implemented for `AppError` from tubely-core.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Unable to parse form: {}",
            rejection.body_text()
        )))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return HttpAppError(body_limit_exceeded());
        }
        HttpAppError(AppError::InvalidInput(format!(
            "Unable to parse form: {}",
            err.body_text()
        )))
    }
}

fn body_limit_exceeded() -> AppError {
    AppError::PayloadTooLarge("Request body exceeds the upload size limit".to_string())
}

/// True when a part stream failed because the request body limit cut it off.
fn is_body_limit_error(err: &std::io::Error) -> bool {
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>())
        .is_some_and(|e| e.status() == StatusCode::PAYLOAD_TOO_LARGE)
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                details = %error.detailed_message(),
                error_type = error_type,
                "Error occurred"
            );
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let mut body = ErrorResponse {
            error: app_error.client_message(),
            details: None,
            error_type: None,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        };
        if !is_production_env() && !app_error.is_sensitive() {
            body.details = Some(app_error.detailed_message());
            body.error_type = Some(app_error.error_type().to_string());
        }

        (status, Json(body)).into_response()
    }
}

// Domain errors to HttpAppError (local type, so no orphan rule problem)

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match err {
            ValidationError::RequestTooLarge { size, max } => {
                AppError::PayloadTooLarge(format!("{} bytes exceeds max {} bytes", size, max))
            }
            ValidationError::BodyTooLarge { max } => {
                AppError::PayloadTooLarge(format!("Upload is larger than max {} bytes", max))
            }
            ValidationError::InvalidContentType {
                content_type,
                expected,
            } => AppError::InvalidInput(format!(
                "Invalid file type '{}', expected {}",
                content_type, expected
            )),
            ValidationError::MissingField(field) => {
                AppError::InvalidInput(format!("Unable to parse form file '{}'", field))
            }
            ValidationError::InvalidVideoId(_) => AppError::InvalidInput("Invalid ID".to_string()),
            ValidationError::EmptyFile => AppError::InvalidInput("File is empty".to_string()),
        };
        HttpAppError(app)
    }
}

impl From<PipelineError> for HttpAppError {
    fn from(err: PipelineError) -> Self {
        let app = match err {
            PipelineError::Validation(e) => return e.into(),
            PipelineError::Unauthorized(msg) => AppError::Unauthorized(msg),
            PipelineError::NotFound(_) => AppError::NotFound("Video not found".to_string()),
            PipelineError::BodyRead(e) if is_body_limit_error(&e) => body_limit_exceeded(),
            PipelineError::BodyRead(e) => {
                AppError::InvalidInput(format!("Failed to read upload body: {}", e))
            }
            PipelineError::Lookup(e) | PipelineError::PersistFailed(e) => e,
            PipelineError::Staging(e) => AppError::Internal(format!("Staging failed: {}", e)),
            e @ (PipelineError::ProbeFailed(_) | PipelineError::RemuxFailed(_)) => {
                AppError::MediaProcessing(e.to_string())
            }
            PipelineError::UploadFailed(e) => AppError::Storage(e.to_string()),
        };
        HttpAppError(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_processing::ToolError;
    use uuid::Uuid;

    fn status_of(err: impl Into<HttpAppError>) -> u16 {
        let HttpAppError(app) = err.into();
        app.http_status_code()
    }

    #[test]
    fn test_from_validation_error_request_too_large() {
        let HttpAppError(app_err) = ValidationError::RequestTooLarge {
            size: 2000,
            max: 1000,
        }
        .into();
        match app_err {
            AppError::PayloadTooLarge(msg) => {
                assert!(msg.contains("2000"));
                assert!(msg.contains("1000"));
            }
            _ => panic!("Expected PayloadTooLarge variant"),
        }
    }

    #[test]
    fn test_from_validation_error_invalid_content_type() {
        let HttpAppError(app_err) = ValidationError::InvalidContentType {
            content_type: "video/quicktime".to_string(),
            expected: "video/mp4",
        }
        .into();
        match app_err {
            AppError::InvalidInput(msg) => {
                assert!(msg.contains("video/quicktime"));
                assert!(msg.contains("video/mp4"));
            }
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_from_storage_error_upload_failed_is_storage() {
        let HttpAppError(app_err) = StorageError::UploadFailed("timeout".to_string()).into();
        assert!(matches!(app_err, AppError::Storage(_)));
        assert_eq!(app_err.error_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_from_storage_error_invalid_key() {
        let HttpAppError(app_err) = StorageError::InvalidKey("../x".to_string()).into();
        match app_err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "../x"),
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_pipeline_error_status_mapping() {
        assert_eq!(status_of(PipelineError::Unauthorized("no".into())), 401);
        assert_eq!(status_of(PipelineError::NotFound(Uuid::new_v4())), 404);
        assert_eq!(
            status_of(PipelineError::Validation(ValidationError::RequestTooLarge {
                size: 2,
                max: 1
            })),
            413
        );
        assert_eq!(status_of(PipelineError::ProbeFailed(ToolError::NoStreams)), 500);
        assert_eq!(
            status_of(PipelineError::UploadFailed(StorageError::UploadFailed(
                "x".into()
            ))),
            500
        );
        assert_eq!(
            status_of(PipelineError::PersistFailed(AppError::Internal("x".into()))),
            500
        );
    }

    #[test]
    fn test_media_failures_hide_tool_details() {
        let HttpAppError(app_err) = PipelineError::RemuxFailed(ToolError::NonZeroExit {
            tool: "ffmpeg".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "/tmp/tubely-upload-abc.mp4: moov atom not found".to_string(),
        })
        .into();
        assert_eq!(app_err.error_code(), "MEDIA_PROCESSING_ERROR");
        assert!(app_err.is_sensitive());
        assert!(!app_err.client_message().contains("/tmp"));
    }

    #[test]
    fn test_streamed_overflow_reports_ceiling_not_chunk_size() {
        let HttpAppError(app_err) = ValidationError::BodyTooLarge { max: 65536 }.into();
        assert_eq!(app_err.http_status_code(), 413);
        match app_err {
            AppError::PayloadTooLarge(msg) => {
                assert_eq!(msg, "Upload is larger than max 65536 bytes");
            }
            _ => panic!("Expected PayloadTooLarge variant"),
        }
    }

    #[test]
    fn test_plain_body_read_error_is_bad_request() {
        let err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection reset");
        assert!(!is_body_limit_error(&err));
        assert_eq!(status_of(PipelineError::BodyRead(err)), 400);
    }

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse::new("Video not found", "NOT_FOUND");
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["error"], "Video not found");
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["recoverable"], false);
        assert!(json.get("details").is_none());
    }
}
