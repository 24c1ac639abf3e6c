//! Diagnostic system for error reporting across every Opal phase.
//!
//! Each diagnostic has:
//! - an error code for searchability (`opal explain E6003`)
//! - a message saying what went wrong
//! - labeled spans saying where
//! - notes and suggestions for context
//!
//! Phase errors (`ReadError`, `CompileError`, `EvalError`, ...) each convert
//! into a [`Diagnostic`]; the CLI renders them through an emitter.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label};
pub use error_code::ErrorCode;
