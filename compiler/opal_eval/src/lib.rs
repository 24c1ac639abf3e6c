//! Opal evaluator: runs a compiled [`Program`](opal_ir::Program).
//!
//! The machine consumes opcode streams tag by tag against one shared
//! evaluation stack. Nested blocks and calls live on an explicit frame
//! stack, so evaluation depth is bounded by configuration rather than by
//! the host stack.
//!
//! ```text
//!                 ┌──────────── CallStack ────────────┐
//!                 │ Frame(top-level)  cursor env blocks│
//!   EvalStack ◄──►│ Frame(call f)     cursor env blocks│
//!   (shared)      │ Frame(call g)     cursor env blocks│ ◄── current
//!                 └────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use opal_eval::{buffer_handler, MachineBuilder};
//! use opal_ir::{Program, Token, FunctionTable};
//!
//! let main = ["number", "2", "number", "40", "+", "print"]
//!     .into_iter()
//!     .map(Token::synthetic)
//!     .collect();
//! let output = buffer_handler();
//! let machine = MachineBuilder::new().print_handler(output.clone()).build();
//! let outcome = machine.run(&Program::new(main, FunctionTable::new()));
//! assert!(outcome.is_ok());
//! assert_eq!(output.get_output(), "42\n");
//! ```

mod builder;
mod call_stack;
mod environment;
mod errors;
mod machine;
mod print_handler;
mod stack;
mod value;

pub use builder::{EvalConfig, MachineBuilder, DEFAULT_MAX_CALL_DEPTH};
pub use call_stack::{Block, CallStack, Frame, FrameKind};
pub use environment::Environment;
pub use errors::{BacktraceFrame, EvalBacktrace, EvalError, EvalErrorKind};
pub use machine::{EvalCounters, Machine, RunOutcome};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use stack::EvalStack;
pub use value::Value;
