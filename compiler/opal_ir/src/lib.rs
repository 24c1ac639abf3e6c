//! Opal IR - shared data types for the Opal toolchain.
//!
//! This crate contains the structures that flow between phases:
//! - Spans for source locations
//! - `Sexp` parse trees produced by the reader
//! - `Opcode` tags and the `Token`/`OpcodeStream` pair the evaluator consumes
//! - `FunctionDef`, `FunctionTable` and `Program` produced by the compiler
//!
//! ```text
//! source ──► reader ──► Vec<Sexp> ──► desugar ──► compile ──► Program
//!                                                               │
//!                                   main: [Token]  functions: FunctionTable
//! ```

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod opcode;
mod program;
mod sexp;
mod span;
mod stream;

pub use opcode::{BinaryOp, Opcode};
pub use program::{FunctionDef, FunctionTable, Params, Program};
pub use sexp::{Sexp, SexpKind};
pub use span::Span;
pub use stream::{OpcodeStream, Token};
