//! Lexer built on logos.
//!
//! Produces a flat token list; the reader assembles nesting. Whitespace
//! and `;` comments are skipped here.

use logos::Logos;
use opal_ir::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\x0C]+")]
#[logos(skip r";[^\n]*")]
enum RawToken {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,

    // Longest match prefers `Str` whenever the closing quote exists.
    #[regex(r#""([^"\\]|\\.)*"#)]
    UnterminatedStr,

    #[regex(r#"[^ \t\r\n\x0C()";\x00-\x1F\x7F]+"#)]
    Atom,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    LParen,
    RParen,
    /// A closed string literal, quotes included.
    Str,
    UnterminatedStr,
    Atom,
    /// A character no token accepts.
    Error,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct LexToken {
    pub kind: TokenKind,
    pub span: Span,
}

impl LexToken {
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        source.get(self.span.to_range()).unwrap_or_default()
    }
}

pub(crate) fn lex(source: &str) -> Vec<LexToken> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let kind = match result {
            Ok(RawToken::LParen) => TokenKind::LParen,
            Ok(RawToken::RParen) => TokenKind::RParen,
            Ok(RawToken::Str) => TokenKind::Str,
            Ok(RawToken::UnterminatedStr) => TokenKind::UnterminatedStr,
            Ok(RawToken::Atom) => TokenKind::Atom,
            Err(()) => TokenKind::Error,
        };
        tokens.push(LexToken { kind, span });
    }

    tokens
}
