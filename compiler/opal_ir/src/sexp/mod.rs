//! S-expression parse tree.
//!
//! The reader produces these; the desugarer rewrites them; the compiler
//! lowers them into opcode streams.

use std::fmt;

use crate::Span;

/// The shape of one S-expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum SexpKind {
    /// A numeric atom, kept as its raw source text.
    Number(String),
    /// A string literal, already unescaped.
    Str(String),
    /// Any other atom.
    Symbol(String),
    /// A parenthesized list.
    List(Vec<Sexp>),
}

/// An S-expression with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Sexp {
    pub kind: SexpKind,
    pub span: Span,
}

impl Sexp {
    pub fn number(text: impl Into<String>, span: Span) -> Self {
        Sexp {
            kind: SexpKind::Number(text.into()),
            span,
        }
    }

    pub fn string(text: impl Into<String>, span: Span) -> Self {
        Sexp {
            kind: SexpKind::Str(text.into()),
            span,
        }
    }

    pub fn symbol(name: impl Into<String>, span: Span) -> Self {
        Sexp {
            kind: SexpKind::Symbol(name.into()),
            span,
        }
    }

    pub fn list(items: Vec<Sexp>, span: Span) -> Self {
        Sexp {
            kind: SexpKind::List(items),
            span,
        }
    }

    /// The symbol name, if this is a symbol.
    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            SexpKind::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// The list items, if this is a list.
    pub fn as_list(&self) -> Option<&[Sexp]> {
        match &self.kind {
            SexpKind::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this is the symbol `name`.
    pub fn is_symbol(&self, name: &str) -> bool {
        self.as_symbol() == Some(name)
    }

    /// The head symbol of a non-empty list, if it is a symbol.
    pub fn head_symbol(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol()
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SexpKind::Number(text) | SexpKind::Symbol(text) => f.write_str(text),
            SexpKind::Str(text) => {
                f.write_str("\"")?;
                for c in text.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            SexpKind::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}
