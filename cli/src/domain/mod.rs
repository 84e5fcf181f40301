//! Domain types — pure, no I/O.

pub mod error;

pub use error::{CompileError, RuntimeError};
