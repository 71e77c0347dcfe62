//! Request handlers.

pub mod convert;
pub mod health;
pub mod options;
pub mod stream;

pub use convert::*;
pub use health::*;
pub use options::*;
pub use stream::*;
