//! Aspect-ratio classification.
//!
//! The tolerance and the comparison order decide which storage partition a
//! video lands in, so both must stay fixed: 16:9 is tried before 9:16, and a
//! ratio matches only when strictly closer than `ASPECT_TOLERANCE`.

use tubely_core::AspectBucket;

/// Absolute difference allowed between a ratio and a reference ratio.
pub const ASPECT_TOLERANCE: f64 = 0.02;

const RATIO_16_9: f64 = 16.0 / 9.0;
const RATIO_9_16: f64 = 9.0 / 16.0;

/// Map a frame size to its aspect bucket. A zero height is `Other`.
pub fn classify(width: u32, height: u32) -> AspectBucket {
    if height == 0 {
        return AspectBucket::Other;
    }
    classify_ratio(f64::from(width) / f64::from(height))
}

/// Map a width/height ratio to its aspect bucket.
pub fn classify_ratio(ratio: f64) -> AspectBucket {
    if (ratio - RATIO_16_9).abs() < ASPECT_TOLERANCE {
        AspectBucket::Landscape
    } else if (ratio - RATIO_9_16).abs() < ASPECT_TOLERANCE {
        AspectBucket::Portrait
    } else {
        AspectBucket::Other
    }
}
