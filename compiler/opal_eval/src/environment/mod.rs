//! Binding environments.
//!
//! Scoping is copy-in, discard-on-return: a call starts from a full copy
//! of the caller's bindings ([`Environment::fork`]), adds its parameters,
//! and is dropped with its frame. Nothing a callee binds is ever visible
//! to the caller.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::Value;

#[derive(Clone, Debug, Default)]
pub struct Environment {
    bindings: FxHashMap<Arc<str>, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// An independent copy for a new call frame.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Bind `name`, replacing any previous value.
    pub fn bind(&mut self, name: Arc<str>, value: Value) {
        self.bindings.insert(name, value);
    }

    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
