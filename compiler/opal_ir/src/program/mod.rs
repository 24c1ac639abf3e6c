//! Compiled programs and their function tables.
//!
//! Both are built once by the compiler (or the assembler) before
//! evaluation begins and are never mutated afterwards.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{OpcodeStream, Span, Token};

/// Declared parameter names, in declaration order.
pub type Params = SmallVec<[String; 4]>;

/// A user-defined function.
#[derive(Clone, Debug)]
pub struct FunctionDef {
    pub name: String,
    pub params: Params,
    /// Body tokens. Each invocation consumes its own cursor over these.
    pub body: Arc<[Token]>,
    /// Location of the defining form.
    pub span: Span,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, params: Params, body: Vec<Token>, span: Span) -> Self {
        FunctionDef {
            name: name.into(),
            params,
            body: body.into(),
            span,
        }
    }

    /// A fresh cursor over the body, positioned at its first token.
    pub fn body_stream(&self) -> OpcodeStream {
        OpcodeStream::new(Arc::clone(&self.body))
    }

    /// Number of declared parameters.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Function name → definition.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    functions: FxHashMap<String, FunctionDef>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition.
    ///
    /// Returns the rejected definition if the name is already taken;
    /// the existing entry is kept.
    pub fn define(&mut self, def: FunctionDef) -> Result<(), FunctionDef> {
        if self.functions.contains_key(&def.name) {
            return Err(def);
        }
        self.functions.insert(def.name.clone(), def);
        Ok(())
    }

    /// Look up a function by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Definitions ordered by name (stable output for listings).
    pub fn sorted(&self) -> Vec<&FunctionDef> {
        let mut defs: Vec<&FunctionDef> = self.functions.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}

/// A whole program: the top-level stream plus its function table.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub main: Arc<[Token]>,
    pub functions: FunctionTable,
}

impl Program {
    pub fn new(main: Vec<Token>, functions: FunctionTable) -> Self {
        Program {
            main: main.into(),
            functions,
        }
    }

    /// A fresh cursor over the top-level stream.
    pub fn main_stream(&self) -> OpcodeStream {
        OpcodeStream::new(Arc::clone(&self.main))
    }
}
