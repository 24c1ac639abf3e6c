//! Textual opcode listings.
//!
//! ```text
//! # sub(p, q) = p - q
//! .fn sub p q :
//!     ident q
//!     var
//!     ident p
//!     var
//!     -
//!     return
//! .endfn
//!
//! number 3
//! number 10
//! ident sub
//! call
//! print
//! ```
//!
//! Words are separated by whitespace; `#` at the start of a word comments
//! out the rest of the line. A word wrapped in `"` may contain whitespace
//! and the escapes `\" \\ \n \t \r`. Quoted words are never directives.
//! Line breaks carry no meaning: `number 3 print` is the same listing.

use std::borrow::Cow;
use std::fmt::Write;

use opal_diagnostic::{Diagnostic, ErrorCode};
use opal_ir::{FunctionDef, FunctionTable, Opcode, Params, Program, Span, Token};

const FN_DIRECTIVE: &str = ".fn";
const ENDFN_DIRECTIVE: &str = ".endfn";
const PARAMS_END: &str = ":";

/// Errors from reading an opcode listing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    #[error("unterminated quoted word")]
    UnterminatedQuote { span: Span },

    #[error("invalid escape sequence `\\{escape}` in quoted word")]
    InvalidEscape { escape: char, span: Span },

    #[error("malformed function block: {reason}")]
    MalformedFunction { reason: &'static str, span: Span },

    #[error("function `{name}` is defined more than once")]
    DuplicateFunction { name: String, span: Span },
}

impl AssembleError {
    pub fn span(&self) -> Span {
        match self {
            AssembleError::UnterminatedQuote { span }
            | AssembleError::InvalidEscape { span, .. }
            | AssembleError::MalformedFunction { span, .. }
            | AssembleError::DuplicateFunction { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            AssembleError::UnterminatedQuote { .. } | AssembleError::InvalidEscape { .. } => {
                ErrorCode::E2006
            }
            AssembleError::MalformedFunction { .. } => ErrorCode::E2005,
            AssembleError::DuplicateFunction { .. } => ErrorCode::E1007,
        };
        Diagnostic::error(code)
            .with_message(self.to_string())
            .with_label(self.span(), "")
    }
}

struct Word<'src> {
    text: Cow<'src, str>,
    quoted: bool,
    span: Span,
}

impl Word<'_> {
    fn is_directive(&self, directive: &str) -> bool {
        !self.quoted && self.text == directive
    }

    fn into_token(self) -> Token {
        Token::new(self.text.into_owned(), self.span)
    }
}

fn offset(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}

fn words(source: &str) -> Result<Vec<Word<'_>>, AssembleError> {
    let mut words = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '#' {
            while chars.next_if(|&(_, c)| c != '\n').is_some() {}
        } else if c == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some((i, c)) = chars.next() {
                match c {
                    '"' => {
                        words.push(Word {
                            text: Cow::Owned(std::mem::take(&mut text)),
                            quoted: true,
                            span: Span::new(offset(start), offset(i + 1)),
                        });
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, '"')) => text.push('"'),
                        Some((_, '\\')) => text.push('\\'),
                        Some((_, 'n')) => text.push('\n'),
                        Some((_, 't')) => text.push('\t'),
                        Some((_, 'r')) => text.push('\r'),
                        Some((j, escape)) => {
                            return Err(AssembleError::InvalidEscape {
                                escape,
                                span: Span::new(offset(i), offset(j + escape.len_utf8())),
                            });
                        }
                        None => break,
                    },
                    c => text.push(c),
                }
            }
            if !closed {
                return Err(AssembleError::UnterminatedQuote {
                    span: Span::new(offset(start), offset(source.len())),
                });
            }
        } else {
            let mut end = start;
            while let Some((i, c)) = chars.next_if(|&(_, c)| !c.is_whitespace()) {
                end = i + c.len_utf8();
            }
            words.push(Word {
                text: Cow::Borrowed(&source[start..end]),
                quoted: false,
                span: Span::new(offset(start), offset(end)),
            });
        }
    }

    Ok(words)
}

/// Read a listing into a program. No structural checks are made; see
/// [`verify`](crate::verify).
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn assemble(source: &str) -> Result<Program, AssembleError> {
    let mut main = Vec::new();
    let mut functions = FunctionTable::new();
    let mut words = words(source)?.into_iter();

    while let Some(word) = words.next() {
        if word.is_directive(ENDFN_DIRECTIVE) {
            return Err(AssembleError::MalformedFunction {
                reason: "`.endfn` without `.fn`",
                span: word.span,
            });
        }
        if !word.is_directive(FN_DIRECTIVE) {
            main.push(word.into_token());
            continue;
        }

        let def = function_block(word.span, &mut words)?;
        if let Err(rejected) = functions.define(def) {
            return Err(AssembleError::DuplicateFunction {
                name: rejected.name,
                span: rejected.span,
            });
        }
    }

    Ok(Program::new(main, functions))
}

/// Everything after `.fn` up to and including `.endfn`.
fn function_block<'src>(
    start: Span,
    words: &mut impl Iterator<Item = Word<'src>>,
) -> Result<FunctionDef, AssembleError> {
    let unclosed = |span: Span| AssembleError::MalformedFunction {
        reason: "missing `.endfn`",
        span,
    };

    let name = match words.next() {
        Some(word) if !word.is_directive(PARAMS_END) => word.text.into_owned(),
        _ => {
            return Err(AssembleError::MalformedFunction {
                reason: "expected a function name after `.fn`",
                span: start,
            })
        }
    };

    let mut params = Params::new();
    loop {
        let Some(word) = words.next() else {
            return Err(unclosed(start));
        };
        if word.is_directive(PARAMS_END) {
            break;
        }
        if word.is_directive(FN_DIRECTIVE) || word.is_directive(ENDFN_DIRECTIVE) {
            return Err(AssembleError::MalformedFunction {
                reason: "parameter list must end with `:`",
                span: word.span,
            });
        }
        params.push(word.text.into_owned());
    }

    let mut body = Vec::new();
    loop {
        let Some(word) = words.next() else {
            return Err(unclosed(start));
        };
        if word.is_directive(ENDFN_DIRECTIVE) {
            return Ok(FunctionDef::new(name, params, body, start.merge(word.span)));
        }
        if word.is_directive(FN_DIRECTIVE) {
            return Err(AssembleError::MalformedFunction {
                reason: "function blocks cannot nest",
                span: word.span,
            });
        }
        body.push(word.into_token());
    }
}

/// Print a program as a listing that [`assemble`] reads back.
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();
    for def in program.functions.sorted() {
        out.push_str(FN_DIRECTIVE);
        for word in std::iter::once(&def.name).chain(def.params.iter()) {
            let _ = write!(out, " {}", quote(word));
        }
        let _ = writeln!(out, " {PARAMS_END}");
        write_stream(&mut out, &def.body, "    ");
        let _ = writeln!(out, "{ENDFN_DIRECTIVE}\n");
    }
    write_stream(&mut out, &program.main, "");
    out
}

/// One instruction per line; literal tags share a line with their operand.
fn write_stream(out: &mut String, tokens: &[Token], indent: &str) {
    let mut rest = tokens;
    while let Some((tag, tail)) = rest.split_first() {
        let _ = write!(out, "{indent}{}", quote(tag.as_str()));
        rest = tail;
        let takes_operand = Opcode::from_tag(tag.as_str()).is_some_and(Opcode::takes_operand);
        if takes_operand {
            if let Some((operand, tail)) = rest.split_first() {
                let _ = write!(out, " {}", quote(operand.as_str()));
                rest = tail;
            }
        }
        out.push('\n');
    }
}

fn quote(word: &str) -> Cow<'_, str> {
    let needs_quotes = word.is_empty()
        || word.starts_with(['#', '.', ':'])
        || word.chars().any(|c| c.is_whitespace() || c == '"');
    if !needs_quotes {
        return Cow::Borrowed(word);
    }

    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

#[cfg(test)]
mod tests;
