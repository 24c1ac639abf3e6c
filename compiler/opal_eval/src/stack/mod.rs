//! The evaluation stack.
//!
//! One stack per run, shared by every frame. It is the only channel
//! between a caller and its callee: arguments go down, the return value
//! comes back up.

use crate::{EvalErrorKind, Value};

#[derive(Clone, Debug, Default)]
pub struct EvalStack {
    values: Vec<Value>,
}

impl EvalStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Pop the top value. An empty stack is a `StackUnderflow`.
    #[inline]
    pub fn pop(&mut self) -> Result<Value, EvalErrorKind> {
        self.values.pop().ok_or(EvalErrorKind::StackUnderflow)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values from bottom to top.
    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}
