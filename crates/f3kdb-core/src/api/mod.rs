//! Public entry points: the [`Core`] object and its error type.

mod core;
mod error;

pub use self::core::Core;
pub use error::{DebandError, ErrorCode};
