//! Storage collaborator for the loopcast converter.
//!
//! The orchestrator never touches a directory layout directly: it talks to
//! the [`Storage`] trait, and the server injects a [`LocalStorage`] rooted
//! wherever its configuration says uploads and outputs live.

pub mod error;
pub mod local;

pub use error::{StorageError, StorageResult};
pub use local::{LocalStorage, Storage};
