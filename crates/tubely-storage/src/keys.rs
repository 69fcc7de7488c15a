//! Storage key generation.
//!
//! Keys are `{bucket_prefix}{hex}.mp4` with 32 random bytes from the thread-local
//! CSPRNG. The key doubles as an unguessable access token once the object is
//! publicly readable, so it must never come from a general-purpose PRNG.

use rand::RngCore;
use tubely_core::constants::{STORAGE_KEY_RANDOM_BYTES, VIDEO_KEY_EXTENSION};
use tubely_core::AspectBucket;

/// Generate a fresh storage key under the prefix of `bucket`.
pub fn generate_storage_key(bucket: AspectBucket) -> String {
    let mut random = [0u8; STORAGE_KEY_RANDOM_BYTES];
    // ThreadRng is a ChaCha-based CSPRNG reseeded from the OS
    rand::rng().fill_bytes(&mut random);
    format!(
        "{}{}{}",
        bucket.prefix(),
        hex::encode(random),
        VIDEO_KEY_EXTENSION
    )
}

/// Returns true if `key` has the shape produced by `generate_storage_key`.
pub fn is_video_storage_key(key: &str) -> bool {
    let rest = AspectBucket::ALL
        .iter()
        .find_map(|bucket| key.strip_prefix(bucket.prefix()));
    let Some(rest) = rest else {
        return false;
    };
    let Some(random) = rest.strip_suffix(VIDEO_KEY_EXTENSION) else {
        return false;
    };
    random.len() == STORAGE_KEY_RANDOM_BYTES * 2
        && random.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}
