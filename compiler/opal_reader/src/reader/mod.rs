//! S-expression reader.
//!
//! Recursive descent over the lexer's flat token list. Nesting is capped at
//! [`MAX_NESTING_DEPTH`] and each level runs under `ensure_sufficient_stack`.

use opal_ir::{Sexp, Span};
use opal_stack::ensure_sufficient_stack;
use tracing::debug;

use crate::lexer::{lex, LexToken, TokenKind};
use crate::ReadError;

/// Deepest list nesting the reader accepts.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Read every top-level form in `source`.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn read(source: &str) -> Result<Vec<Sexp>, ReadError> {
    let mut reader = Reader {
        source,
        tokens: lex(source),
        pos: 0,
    };
    let mut forms = Vec::new();
    while let Some(token) = reader.peek() {
        if token.kind == TokenKind::RParen {
            return Err(ReadError::UnexpectedCloseParen { span: token.span });
        }
        forms.push(reader.read_form(0)?);
    }
    debug!(forms = forms.len(), "read complete");
    Ok(forms)
}

struct Reader<'src> {
    source: &'src str,
    tokens: Vec<LexToken>,
    pos: usize,
}

impl Reader<'_> {
    fn peek(&self) -> Option<LexToken> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<LexToken> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Read one form. `depth` counts the lists enclosing it.
    fn read_form(&mut self, depth: usize) -> Result<Sexp, ReadError> {
        let Some(token) = self.bump() else {
            let end = u32::try_from(self.source.len()).unwrap_or(u32::MAX);
            return Err(ReadError::UnclosedParen {
                span: Span::point(end),
            });
        };

        match token.kind {
            TokenKind::LParen => {
                if depth >= MAX_NESTING_DEPTH {
                    return Err(ReadError::NestingTooDeep {
                        limit: MAX_NESTING_DEPTH,
                        span: token.span,
                    });
                }
                ensure_sufficient_stack(|| self.read_list(token.span, depth + 1))
            }
            TokenKind::RParen => Err(ReadError::UnexpectedCloseParen { span: token.span }),
            TokenKind::Str => {
                let raw = token.text(self.source);
                let inner = raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default();
                let text = unescape(inner, token.span.start + 1)?;
                Ok(Sexp::string(text, token.span))
            }
            TokenKind::UnterminatedStr => Err(ReadError::UnterminatedString { span: token.span }),
            TokenKind::Atom => Ok(atom(token.text(self.source), token.span)),
            TokenKind::Error => {
                let ch = token.text(self.source).chars().next().unwrap_or('\u{FFFD}');
                Err(ReadError::UnrecognizedCharacter {
                    ch,
                    span: token.span,
                })
            }
        }
    }

    /// Items up to the `)` matching the already-consumed `(` at `open`.
    fn read_list(&mut self, open: Span, depth: usize) -> Result<Sexp, ReadError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => return Err(ReadError::UnclosedParen { span: open }),
                Some(token) if token.kind == TokenKind::RParen => {
                    self.pos += 1;
                    return Ok(Sexp::list(items, open.merge(token.span)));
                }
                Some(_) => items.push(self.read_form(depth)?),
            }
        }
    }
}

fn atom(text: &str, span: Span) -> Sexp {
    if is_number(text) {
        Sexp::number(text, span)
    } else {
        Sexp::symbol(text, span)
    }
}

/// Optional sign, digits, optional fraction and exponent, finite.
fn is_number(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    let starts_numeric = digits
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    starts_numeric
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && text.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Resolve escapes in a string body starting at byte `base` of the source.
fn unescape(body: &str, base: u32) -> Result<String, ReadError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escape)) = chars.next() else {
            // The lexer only closes strings after a complete escape.
            out.push('\\');
            break;
        };
        match escape {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            other => {
                let start = base + u32::try_from(i).unwrap_or(0);
                let width = u32::try_from(1 + other.len_utf8()).unwrap_or(2);
                return Err(ReadError::InvalidEscape {
                    escape: other,
                    span: Span::new(start, start + width),
                });
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests;
