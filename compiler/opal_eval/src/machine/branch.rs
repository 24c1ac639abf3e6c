//! Nesting-aware forward skip over an untaken branch.

use opal_ir::{Opcode, OpcodeStream};

use super::{Fault, Site};
use crate::EvalErrorKind;

/// The marker a skip stopped at. Both are consumed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BranchEnd {
    Else,
    End,
}

/// Advance `cursor` past the current branch.
///
/// Nested `if … end` groups are passed over whole, and operand tokens are
/// never read as tags, so `string end` does not close anything. With
/// `allow_else` the skip stops at an `else` of the same depth; without it
/// such an `else` is a structural error. Returns where the skip stopped and
/// how many tokens it consumed.
pub(crate) fn skip_branch(
    cursor: &mut OpcodeStream,
    allow_else: bool,
) -> Result<(BranchEnd, u64), Fault> {
    let mut depth = 0usize;
    let mut skipped = 0u64;

    loop {
        let position = cursor.position();
        let token = cursor.next_token().ok_or(EvalErrorKind::StreamUnderflow)?;
        skipped += 1;

        let Some(op) = Opcode::from_tag(token.as_str()) else {
            let site = Site {
                position,
                span: token.span,
                opcode: None,
            };
            let kind = EvalErrorKind::UnknownOpcode {
                tag: token.as_str().to_string(),
            };
            return Err(Fault::at(kind, site));
        };

        match op {
            _ if op.takes_operand() => {
                cursor.next_token().ok_or(EvalErrorKind::StreamUnderflow)?;
                skipped += 1;
            }
            Opcode::If => depth += 1,
            Opcode::End if depth == 0 => return Ok((BranchEnd::End, skipped)),
            Opcode::End => depth -= 1,
            Opcode::Else if depth == 0 => {
                if !allow_else {
                    let site = Site {
                        position,
                        span: token.span,
                        opcode: Some(op),
                    };
                    let kind = EvalErrorKind::StructuralError {
                        reason: "second `else` in one `if`",
                    };
                    return Err(Fault::at(kind, site));
                }
                return Ok((BranchEnd::Else, skipped));
            }
            _ => {}
        }
    }
}
