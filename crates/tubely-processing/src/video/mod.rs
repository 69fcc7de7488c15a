//! Video inspection and container rewriting backed by ffprobe/ffmpeg.

pub mod aspect;
mod command;
pub mod faststart;
pub mod probe;

pub use aspect::{classify, classify_ratio, ASPECT_TOLERANCE};
pub use faststart::FfmpegRemuxer;
pub use probe::FfprobeProber;
