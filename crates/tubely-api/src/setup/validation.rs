//! Configuration validation
//!
//! Checks run once at startup, before any connection is opened.

use anyhow::Result;
use tubely_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via CORS_ORIGINS."
        ));
    }

    // Body limit is computed as usize on the router
    if usize::try_from(config.max_video_size_bytes()).is_err() {
        return Err(anyhow::anyhow!(
            "MAX_VIDEO_SIZE_BYTES does not fit this platform's address space"
        ));
    }

    Ok(())
}
