//! Reader errors.

use opal_diagnostic::{Diagnostic, ErrorCode};
use opal_ir::Span;

/// Errors from turning source text into S-expressions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("invalid escape sequence `\\{escape}`")]
    InvalidEscape { escape: char, span: Span },

    #[error("unexpected `)`")]
    UnexpectedCloseParen { span: Span },

    /// Reported at the opening paren.
    #[error("unclosed `(`")]
    UnclosedParen { span: Span },

    #[error("unrecognized character {ch:?}")]
    UnrecognizedCharacter { ch: char, span: Span },

    #[error("forms nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize, span: Span },
}

impl ReadError {
    pub fn span(&self) -> Span {
        match self {
            ReadError::UnterminatedString { span }
            | ReadError::InvalidEscape { span, .. }
            | ReadError::UnexpectedCloseParen { span }
            | ReadError::UnclosedParen { span }
            | ReadError::UnrecognizedCharacter { span, .. }
            | ReadError::NestingTooDeep { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ReadError::UnterminatedString { .. } => ErrorCode::E0001,
            ReadError::UnrecognizedCharacter { .. } => ErrorCode::E0002,
            ReadError::InvalidEscape { .. } => ErrorCode::E0003,
            ReadError::UnexpectedCloseParen { .. } => ErrorCode::E0004,
            ReadError::UnclosedParen { .. } => ErrorCode::E0005,
            ReadError::NestingTooDeep { .. } => ErrorCode::E0006,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            ReadError::UnterminatedString { span } => diag
                .with_label(*span, "string starts here")
                .with_suggestion("add a closing `\"`"),
            ReadError::InvalidEscape { span, .. } => diag
                .with_label(*span, "unknown escape")
                .with_note("valid escapes are \\\" \\\\ \\n \\t \\r"),
            ReadError::UnexpectedCloseParen { span } => {
                diag.with_label(*span, "no matching `(`")
            }
            ReadError::UnclosedParen { span } => diag
                .with_label(*span, "this `(` is never closed")
                .with_suggestion("add a closing `)`"),
            ReadError::UnrecognizedCharacter { span, .. } => {
                diag.with_label(*span, "not part of any token")
            }
            ReadError::NestingTooDeep { span, .. } => {
                diag.with_label(*span, "nesting limit reached here")
            }
        }
    }
}
