//! Opal compiler.
//!
//! Three ways into a [`Program`](opal_ir::Program) and one way out:
//!
//! - [`compile`] lowers desugared S-expressions
//! - [`assemble`] reads a textual opcode listing
//! - [`disassemble`] prints a program back in that listing format
//! - [`verify`] checks a program's streams are structurally sound
//!
//! Lowering always produces verified output; assembled listings can hold
//! anything, so callers run [`verify`] before trusting them.

mod assemble;
mod error;
mod lower;
mod verify;

pub use assemble::{assemble, disassemble, AssembleError};
pub use error::CompileError;
pub use lower::{compile, KEYWORDS};
pub use verify::{verify, StreamName, VerifyError};
