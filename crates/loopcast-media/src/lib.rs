//! FFmpeg CLI wrapper for the loopcast converter.
//!
//! This crate provides:
//! - Best-effort source duration probing via ffprobe
//! - Pure progress-line annotation (`time=` marker -> percentage prefix)
//! - Type-safe FFmpeg command building for the two output kinds
//! - Encode supervision: spawn, stderr consumption, wait, exit-code check

pub mod command;
pub mod error;
pub mod probe;
pub mod progress;

pub use command::{check_ffmpeg, EncodeRunner, FfmpegCommand};
pub use error::{MediaError, MediaResult};
pub use probe::probe_duration;
pub use progress::annotate_line;
