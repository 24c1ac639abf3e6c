//! Compile errors.

use opal_diagnostic::{Diagnostic, ErrorCode};
use opal_ir::Span;

/// Errors from lowering S-expressions to opcode streams.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("empty form")]
    EmptyForm { span: Span },

    #[error("`{form}` expects {expected}, found {found} argument(s)")]
    WrongArity {
        form: String,
        expected: &'static str,
        found: usize,
        span: Span,
    },

    #[error("expected a {context} name")]
    ExpectedName { context: &'static str, span: Span },

    #[error("`{name}` is reserved and cannot name a {context}")]
    ReservedName {
        name: String,
        context: &'static str,
        span: Span,
    },

    #[error("string literal was not quoted")]
    UnquotedString { span: Span },

    #[error("`fn` is only allowed at the top level")]
    NestedFunction { span: Span },

    #[error("malformed parameter list")]
    MalformedParams { span: Span },

    #[error("function `{name}` is defined more than once")]
    DuplicateFunction { name: String, span: Span, first: Span },

    #[error("parameter `{name}` is declared more than once")]
    DuplicateParameter { name: String, span: Span },

    #[error("`return` outside of a function")]
    ReturnOutsideFunction { span: Span },

    #[error("the head of a form must be a name")]
    NonSymbolHead { span: Span },

    #[error("`{form}` does not produce a value")]
    StatementAsValue { form: String, span: Span },

    #[error("`quote` expects a string literal")]
    InvalidQuote { span: Span },
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::EmptyForm { span }
            | CompileError::WrongArity { span, .. }
            | CompileError::ExpectedName { span, .. }
            | CompileError::ReservedName { span, .. }
            | CompileError::UnquotedString { span }
            | CompileError::NestedFunction { span }
            | CompileError::MalformedParams { span }
            | CompileError::DuplicateFunction { span, .. }
            | CompileError::DuplicateParameter { span, .. }
            | CompileError::ReturnOutsideFunction { span }
            | CompileError::NonSymbolHead { span }
            | CompileError::StatementAsValue { span, .. }
            | CompileError::InvalidQuote { span } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::EmptyForm { .. } => ErrorCode::E1001,
            CompileError::WrongArity { .. } => ErrorCode::E1002,
            CompileError::ExpectedName { .. } | CompileError::ReservedName { .. } => {
                ErrorCode::E1003
            }
            CompileError::UnquotedString { .. } => ErrorCode::E1004,
            CompileError::NestedFunction { .. } => ErrorCode::E1005,
            CompileError::MalformedParams { .. } => ErrorCode::E1006,
            CompileError::DuplicateFunction { .. } => ErrorCode::E1007,
            CompileError::DuplicateParameter { .. } => ErrorCode::E1008,
            CompileError::ReturnOutsideFunction { .. } => ErrorCode::E1009,
            CompileError::NonSymbolHead { .. } => ErrorCode::E1010,
            CompileError::StatementAsValue { .. } => ErrorCode::E1011,
            CompileError::InvalidQuote { .. } => ErrorCode::E1012,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            CompileError::DuplicateFunction { span, first, .. } => diag
                .with_label(*span, "redefined here")
                .with_secondary_label(*first, "first defined here"),
            CompileError::UnquotedString { span } => diag
                .with_label(*span, "bare string")
                .with_note("run the desugaring pass before compiling"),
            CompileError::StatementAsValue { span, .. } => diag
                .with_label(*span, "used as a value here")
                .with_note("only expressions and function calls leave a value on the stack"),
            CompileError::ReturnOutsideFunction { span } => diag
                .with_label(*span, "not inside a `fn` body"),
            other => diag.with_label(other.span(), ""),
        }
    }
}
