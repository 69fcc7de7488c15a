use tubely_core::constants::VIDEO_MP4_CONTENT_TYPE;

/// Request validation errors for video uploads
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Declared `Content-Length` over the ceiling
    #[error("Request too large: {size} bytes (max: {max} bytes)")]
    RequestTooLarge { size: u64, max: u64 },

    /// Streamed bytes went past the ceiling; the full size is never known
    #[error("Upload larger than {max} bytes")]
    BodyTooLarge { max: u64 },

    #[error("Invalid content type: {content_type} (expected: {expected})")]
    InvalidContentType {
        content_type: String,
        expected: &'static str,
    },

    #[error("Missing form field: {0}")]
    MissingField(String),

    #[error("Invalid video ID: {0}")]
    InvalidVideoId(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Normalize a MIME type: strip parameters, trim, lowercase.
///
/// `video/MP4; codecs="avc1"` becomes `video/mp4`.
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Size and MIME guards for the upload endpoint.
#[derive(Debug, Clone, Copy)]
pub struct UploadValidator {
    max_size: u64,
}

impl UploadValidator {
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Reject a request whose declared `Content-Length` is over the ceiling.
    ///
    /// A missing header passes; the streamed body is limited separately.
    pub fn check_declared_size(&self, declared: Option<u64>) -> Result<(), ValidationError> {
        match declared {
            Some(size) if size > self.max_size => Err(ValidationError::RequestTooLarge {
                size,
                max: self.max_size,
            }),
            _ => Ok(()),
        }
    }

    /// Accept exactly `video/mp4` once parameters are stripped.
    pub fn validate_content_type(&self, declared: Option<&str>) -> Result<(), ValidationError> {
        let declared = declared.unwrap_or("");
        if normalize_mime_type(declared) != VIDEO_MP4_CONTENT_TYPE {
            return Err(ValidationError::InvalidContentType {
                content_type: declared.to_string(),
                expected: VIDEO_MP4_CONTENT_TYPE,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mime_type() {
        assert_eq!(normalize_mime_type("video/mp4"), "video/mp4");
        assert_eq!(normalize_mime_type(" Video/MP4 ; codecs=\"avc1\""), "video/mp4");
        assert_eq!(normalize_mime_type(""), "");
    }

    #[test]
    fn test_declared_size_over_ceiling_rejected() {
        let validator = UploadValidator::new(1 << 30);
        assert!(validator.check_declared_size(Some(1 << 30)).is_ok());
        assert!(validator.check_declared_size(None).is_ok());
        assert!(matches!(
            validator.check_declared_size(Some((1 << 30) + 1)),
            Err(ValidationError::RequestTooLarge { .. })
        ));
    }

    #[test]
    fn test_content_type_exact_match_after_params() {
        let validator = UploadValidator::new(10);
        assert!(validator.validate_content_type(Some("video/mp4")).is_ok());
        assert!(validator
            .validate_content_type(Some("video/mp4; charset=binary"))
            .is_ok());
        assert!(validator.validate_content_type(Some("video/quicktime")).is_err());
        assert!(validator.validate_content_type(Some("video/mp4x")).is_err());
        assert!(validator.validate_content_type(None).is_err());
    }
}
