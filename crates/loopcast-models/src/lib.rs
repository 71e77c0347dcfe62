//! Shared data models for the loopcast backend.
//!
//! This crate provides Serde-serializable types for:
//! - Conversion parameters (frame rate, scale, output kind)
//! - Progress events carried on the in-process queue
//! - Stream events delivered to SSE subscribers
//! - Job identifiers

pub mod event;
pub mod job;
pub mod params;

// Re-export common types
pub use event::{ProgressEvent, StreamEvent, StreamStatus};
pub use job::JobId;
pub use params::{ConversionParams, FrameRate, OutputKind, ParamParseError, Scale};
