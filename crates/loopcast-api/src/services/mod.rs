//! Application services.

mod convert;

pub use convert::{ConversionOutcome, ConvertService};
