pub mod aspect;
pub mod video;

pub use aspect::AspectBucket;
pub use video::{Video, VideoResponse};
