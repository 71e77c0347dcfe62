//! In-process progress event transport.
//!
//! This crate provides:
//! - An unbounded FIFO event queue between the conversion supervisor and
//!   the delivery loop
//! - The per-job context handed to every component of one conversion
//! - The SSE delivery loop state machine with a tunable idle-timeout policy

pub mod delivery;
pub mod job;
pub mod queue;

pub use delivery::{DeliveryLoop, DeliveryPolicy};
pub use job::JobContext;
pub use queue::EventQueue;
