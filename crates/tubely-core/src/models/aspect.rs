use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Aspect-ratio class of a video. Drives the storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AspectBucket {
    /// Roughly 16:9
    Landscape,
    /// Roughly 9:16
    Portrait,
    Other,
}

impl AspectBucket {
    pub const ALL: [AspectBucket; 3] = [
        AspectBucket::Landscape,
        AspectBucket::Portrait,
        AspectBucket::Other,
    ];

    /// Key prefix for objects in this bucket, including the trailing slash.
    pub fn prefix(&self) -> &'static str {
        match self {
            AspectBucket::Landscape => "landscape/",
            AspectBucket::Portrait => "portrait/",
            AspectBucket::Other => "other/",
        }
    }
}

impl Display for AspectBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AspectBucket::Landscape => write!(f, "landscape"),
            AspectBucket::Portrait => write!(f, "portrait"),
            AspectBucket::Other => write!(f, "other"),
        }
    }
}
