//! Structural verification of opcode streams.
//!
//! Lowering never produces a malformed stream; listings and hand-built
//! programs can. The walk is operand-aware, so a payload spelled `if` or
//! `end` is never mistaken for a marker.

use opal_diagnostic::{Diagnostic, ErrorCode};
use opal_ir::{Opcode, Program, Span, Token};
use smallvec::SmallVec;

/// Which stream a verification error was found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamName {
    Main,
    Function(String),
}

impl std::fmt::Display for StreamName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamName::Main => f.write_str("the main stream"),
            StreamName::Function(name) => write!(f, "function `{name}`"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("unknown opcode `{tag}` at token {position} of {stream}")]
    UnknownOpcode {
        tag: String,
        position: usize,
        stream: StreamName,
        span: Span,
    },

    #[error("`{tag}` at token {position} of {stream} is missing its operand")]
    MissingOperand {
        tag: &'static str,
        position: usize,
        stream: StreamName,
        span: Span,
    },

    #[error("`{marker}` without a matching `if` in {stream}")]
    StrayMarker {
        marker: &'static str,
        stream: StreamName,
        span: Span,
    },

    #[error("second `else` for the same `if` in {stream}")]
    DuplicateElse { stream: StreamName, span: Span },

    #[error("`if` is never closed by `end` in {stream}")]
    UnclosedIf { stream: StreamName, span: Span },
}

impl VerifyError {
    pub fn span(&self) -> Span {
        match self {
            VerifyError::UnknownOpcode { span, .. }
            | VerifyError::MissingOperand { span, .. }
            | VerifyError::StrayMarker { span, .. }
            | VerifyError::DuplicateElse { span, .. }
            | VerifyError::UnclosedIf { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            VerifyError::UnknownOpcode { .. } => ErrorCode::E2001,
            VerifyError::MissingOperand { .. } => ErrorCode::E2002,
            VerifyError::StrayMarker { .. } | VerifyError::DuplicateElse { .. } => {
                ErrorCode::E2003
            }
            VerifyError::UnclosedIf { .. } => ErrorCode::E2004,
        };
        Diagnostic::error(code)
            .with_message(self.to_string())
            .with_label(self.span(), "")
    }
}

/// Check the main stream and every function body.
#[tracing::instrument(level = "debug", skip_all)]
pub fn verify(program: &Program) -> Result<(), VerifyError> {
    verify_stream(&program.main, &StreamName::Main)?;
    for def in program.functions.sorted() {
        verify_stream(&def.body, &StreamName::Function(def.name.clone()))?;
    }
    Ok(())
}

struct OpenIf {
    span: Span,
    seen_else: bool,
}

fn verify_stream(tokens: &[Token], stream: &StreamName) -> Result<(), VerifyError> {
    let mut open: SmallVec<[OpenIf; 8]> = SmallVec::new();
    let mut position = 0;

    while let Some(token) = tokens.get(position) {
        let Some(op) = Opcode::from_tag(token.as_str()) else {
            return Err(VerifyError::UnknownOpcode {
                tag: token.as_str().to_string(),
                position,
                stream: stream.clone(),
                span: token.span,
            });
        };

        match op {
            Opcode::If => open.push(OpenIf {
                span: token.span,
                seen_else: false,
            }),
            Opcode::Else => match open.last_mut() {
                Some(block) if block.seen_else => {
                    return Err(VerifyError::DuplicateElse {
                        stream: stream.clone(),
                        span: token.span,
                    });
                }
                Some(block) => block.seen_else = true,
                None => {
                    return Err(VerifyError::StrayMarker {
                        marker: "else",
                        stream: stream.clone(),
                        span: token.span,
                    });
                }
            },
            Opcode::End => {
                if open.pop().is_none() {
                    return Err(VerifyError::StrayMarker {
                        marker: "end",
                        stream: stream.clone(),
                        span: token.span,
                    });
                }
            }
            _ => {}
        }

        if op.takes_operand() {
            if tokens.get(position + 1).is_none() {
                return Err(VerifyError::MissingOperand {
                    tag: op.tag(),
                    position,
                    stream: stream.clone(),
                    span: token.span,
                });
            }
            position += 1;
        }
        position += 1;
    }

    match open.pop() {
        Some(block) => Err(VerifyError::UnclosedIf {
            stream: stream.clone(),
            span: block.span,
        }),
        None => Ok(()),
    }
}
