//! Constants shared across crates.

/// Hard ceiling for a single video upload (1 GiB).
pub const MAX_VIDEO_SIZE_BYTES: u64 = 1 << 30;

/// The only container media type accepted for video uploads.
pub const VIDEO_MP4_CONTENT_TYPE: &str = "video/mp4";

/// Multipart form field carrying the video bytes.
pub const VIDEO_FORM_FIELD: &str = "video";

/// File extension appended to every generated storage key.
pub const VIDEO_KEY_EXTENSION: &str = ".mp4";

/// Number of random bytes in a storage key (hex-encoded to 64 characters).
pub const STORAGE_KEY_RANDOM_BYTES: usize = 32;

/// Default deadline for a single ffprobe/ffmpeg invocation.
pub const MEDIA_TOOL_TIMEOUT_SECS: u64 = 300;
