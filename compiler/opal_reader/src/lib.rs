//! Opal reader: source text to desugared S-expressions.
//!
//! ```text
//! "(print (+ 1 2 3))"
//!     │ lex (logos)
//!     ▼
//! ( print ( + 1 2 3 ) )
//!     │ read
//!     ▼
//! (print (+ 1 2 3))          Vec<Sexp>
//!     │ desugar
//!     ▼
//! (print (+ 1 (+ 2 3)))
//! ```

mod desugar;
mod error;
mod lexer;
mod reader;

pub use desugar::{desugar, desugar_form, VARIADIC_OPERATORS};
pub use error::ReadError;
pub use reader::{read, MAX_NESTING_DEPTH};

/// Read and desugar in one step.
pub fn read_program(source: &str) -> Result<Vec<opal_ir::Sexp>, ReadError> {
    read(source).map(desugar)
}
