//! Evaluation errors.
//!
//! Every error is fatal for the run. `return` is never an error: it
//! travels as `Flow::Return` inside the machine and cannot be confused
//! with a failure.

use std::fmt;

use opal_diagnostic::{Diagnostic, ErrorCode};
use opal_ir::Span;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    #[error("read past the end of the opcode stream")]
    StreamUnderflow,

    #[error("evaluation stack is empty")]
    StackUnderflow,

    #[error("unbound variable `{name}`")]
    UnboundName { name: String },

    #[error("undefined function `{name}`")]
    UndefinedFunction { name: String },

    #[error("`return` outside of any call")]
    ReturnOutsideCall,

    #[error("unknown opcode `{tag}`")]
    UnknownOpcode { tag: String },

    #[error("`{operation}` expected {expected}, found {found}")]
    TypeMismatch {
        operation: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("recursion limit of {limit} calls exceeded")]
    RecursionLimitExceeded { limit: usize },

    #[error("malformed `{tag}` literal `{text}`")]
    MalformedLiteral { tag: &'static str, text: String },

    #[error("structural error: {reason}")]
    StructuralError { reason: &'static str },

    #[error(
        "frame bookkeeping did not balance: {open_blocks} open block(s), {open_calls} open call(s)"
    )]
    DepthInvariantViolated { open_blocks: usize, open_calls: usize },
}

impl EvalErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalErrorKind::StreamUnderflow => ErrorCode::E6001,
            EvalErrorKind::StackUnderflow => ErrorCode::E6002,
            EvalErrorKind::UnboundName { .. } => ErrorCode::E6003,
            EvalErrorKind::UndefinedFunction { .. } => ErrorCode::E6004,
            EvalErrorKind::ReturnOutsideCall => ErrorCode::E6005,
            EvalErrorKind::UnknownOpcode { .. } => ErrorCode::E6006,
            EvalErrorKind::TypeMismatch { .. } => ErrorCode::E6007,
            EvalErrorKind::RecursionLimitExceeded { .. } => ErrorCode::E6008,
            EvalErrorKind::StructuralError { .. } => ErrorCode::E6009,
            EvalErrorKind::MalformedLiteral { .. } => ErrorCode::E6010,
            EvalErrorKind::DepthInvariantViolated { .. } => ErrorCode::E9001,
        }
    }
}

/// One active call at the time of an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Function name.
    pub name: String,
    /// Where the call was made.
    pub call_span: Span,
}

/// Active calls, most recent first. Empty for errors at top level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "call backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {} called at {}", frame.name, frame.call_span)?;
        }
        Ok(())
    }
}

/// A runtime failure with the instruction that caused it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Token index of the faulting instruction within its stream.
    pub position: usize,
    /// Tag of the faulting instruction; `None` when a stream ran out.
    pub opcode: Option<String>,
    /// Source location the instruction was lowered from.
    pub span: Option<Span>,
    pub backtrace: EvalBacktrace,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, position: usize) -> Self {
        EvalError {
            kind,
            position,
            opcode: None,
            span: None,
            backtrace: EvalBacktrace::default(),
        }
    }

    #[must_use]
    pub fn with_opcode(mut self, tag: impl Into<String>) -> Self {
        self.opcode = Some(tag.into());
        self
    }

    /// Attach a source location. Synthetic (dummy) spans are ignored.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if span != Span::DUMMY {
            self.span = Some(span);
        }
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = backtrace;
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let location = match &self.opcode {
            Some(tag) => format!("while executing `{tag}` (token {})", self.position),
            None => format!("at token {}", self.position),
        };
        let mut diag = Diagnostic::error(self.code()).with_message(self.kind.to_string());
        diag = match self.span {
            Some(span) => diag.with_label(span, location),
            None => diag.with_note(location),
        };
        for frame in self.backtrace.frames() {
            let context = format!("in call to `{}`", frame.name);
            diag = if frame.call_span == Span::DUMMY {
                diag.with_note(context)
            } else {
                diag.with_secondary_label(frame.call_span, context)
            };
        }
        if let EvalErrorKind::RecursionLimitExceeded { .. } = self.kind {
            diag = diag.with_suggestion("raise the limit with `--max-depth=N`");
        }
        diag
    }
}

#[cfg(test)]
mod tests;
