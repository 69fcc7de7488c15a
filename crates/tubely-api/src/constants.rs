//! API-level constants

/// Prefix for versionless API routes
pub const API_PREFIX: &str = "/api";

/// Issuer stamped into and required on access tokens
pub const JWT_ISSUER: &str = "tubely-access";

/// Per-check deadline for the health endpoint
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Mount point for files written by the local storage backend
pub const MEDIA_ROUTE: &str = "/media";
