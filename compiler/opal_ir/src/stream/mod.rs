//! Token stream consumed by the evaluator.
//!
//! Consumption is strictly forward: `next_token` advances the single
//! cursor and nothing ever moves it back. The token storage is shared
//! (`Arc<[Token]>`), so each call to a function takes a fresh cursor
//! over the same body tokens instead of copying them.

use std::fmt;
use std::sync::Arc;

use crate::Span;

/// One token of an opcode stream: a tag or an operand payload.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Raw token text.
    pub text: Box<str>,
    /// Source location of the form this token was lowered from.
    pub span: Span,
}

impl Token {
    /// Create a token with a source location.
    pub fn new(text: impl Into<Box<str>>, span: Span) -> Self {
        Token {
            text: text.into(),
            span,
        }
    }

    /// Create a token with no meaningful source location.
    pub fn synthetic(text: impl Into<Box<str>>) -> Self {
        Self::new(text, Span::DUMMY)
    }

    /// The token text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.text, self.span)
    }
}

/// Forward-only cursor over a shared token sequence.
#[derive(Clone)]
pub struct OpcodeStream {
    tokens: Arc<[Token]>,
    pos: usize,
}

impl OpcodeStream {
    /// Create a cursor positioned at the first token.
    pub fn new(tokens: Arc<[Token]>) -> Self {
        OpcodeStream { tokens, pos: 0 }
    }

    /// Consume and return the next token, or `None` at the end.
    #[inline]
    pub fn next_token(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Whether every token has been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Index of the next token to be consumed.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl fmt::Debug for OpcodeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpcodeStream")
            .field("pos", &self.pos)
            .field("len", &self.tokens.len())
            .finish()
    }
}
