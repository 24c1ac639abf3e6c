//! Explicit frame stack.
//!
//! The top-level frame always exists; call frames stack above it. Each
//! frame owns its cursor, its environment and the `if` blocks currently
//! open in its stream, so returning from a call discards exactly the
//! callee's blocks and leaves the caller's untouched.

use std::sync::Arc;

use opal_ir::{OpcodeStream, Span};
use smallvec::SmallVec;

use crate::{BacktraceFrame, Environment, EvalBacktrace, EvalErrorKind};

/// An `if` branch being executed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Condition was true; an `else` ends this branch.
    Then,
    /// Condition was false; only `end` ends this branch.
    Else,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameKind {
    TopLevel,
    Call { function: Arc<str>, call_span: Span },
}

#[derive(Debug)]
pub struct Frame {
    pub kind: FrameKind,
    pub cursor: OpcodeStream,
    pub env: Environment,
    pub blocks: SmallVec<[Block; 4]>,
}

impl Frame {
    pub fn top_level(cursor: OpcodeStream) -> Self {
        Frame {
            kind: FrameKind::TopLevel,
            cursor,
            env: Environment::new(),
            blocks: SmallVec::new(),
        }
    }

    pub fn call(
        function: Arc<str>,
        call_span: Span,
        cursor: OpcodeStream,
        env: Environment,
    ) -> Self {
        Frame {
            kind: FrameKind::Call {
                function,
                call_span,
            },
            cursor,
            env,
            blocks: SmallVec::new(),
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self.kind, FrameKind::Call { .. })
    }
}

#[derive(Debug)]
pub struct CallStack {
    top: Frame,
    calls: Vec<Frame>,
    max_depth: usize,
}

impl CallStack {
    /// `max_depth` bounds the number of simultaneously open call frames.
    pub fn new(top: Frame, max_depth: usize) -> Self {
        CallStack {
            top,
            calls: Vec::new(),
            max_depth,
        }
    }

    /// Fails if one more call frame would exceed the limit.
    pub fn check_depth(&self) -> Result<(), EvalErrorKind> {
        if self.calls.len() >= self.max_depth {
            return Err(EvalErrorKind::RecursionLimitExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Open a call frame. The frame is not pushed on overflow.
    pub fn push_call(&mut self, frame: Frame) -> Result<(), EvalErrorKind> {
        self.check_depth()?;
        self.calls.push(frame);
        Ok(())
    }

    /// Close the innermost call frame. The top-level frame is never popped.
    pub fn pop_call(&mut self) -> Option<Frame> {
        self.calls.pop()
    }

    #[inline]
    pub fn current(&self) -> &Frame {
        self.calls.last().unwrap_or(&self.top)
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut Frame {
        self.calls.last_mut().unwrap_or(&mut self.top)
    }

    /// Number of open call frames.
    #[inline]
    pub fn call_depth(&self) -> usize {
        self.calls.len()
    }

    /// Snapshot of the active calls, most recent first.
    pub fn capture(&self) -> EvalBacktrace {
        let frames = self
            .calls
            .iter()
            .rev()
            .filter_map(|frame| match &frame.kind {
                FrameKind::Call {
                    function,
                    call_span,
                } => Some(BacktraceFrame {
                    name: function.to_string(),
                    call_span: *call_span,
                }),
                FrameKind::TopLevel => None,
            })
            .collect();
        EvalBacktrace::new(frames)
    }
}
