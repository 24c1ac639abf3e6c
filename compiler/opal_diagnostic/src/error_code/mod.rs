//! Error codes for all diagnostics.
//!
//! Each code is a unique identifier (e.g., `E1001`) whose first digit names
//! the phase that produced it.

use std::fmt;

/// Error codes for all diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: Reader errors
/// - E1xxx: Compiler errors
/// - E2xxx: Assembler / structural verifier errors
/// - E6xxx: Runtime errors
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Reader Errors (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Invalid escape sequence
    E0003,
    /// Unexpected closing parenthesis
    E0004,
    /// Unclosed parenthesis
    E0005,
    /// Nesting too deep
    E0006,

    // Compiler Errors (E1xxx)
    /// Empty form
    E1001,
    /// Wrong number of arguments to a special form
    E1002,
    /// Expected a name
    E1003,
    /// String literal that was not quoted
    E1004,
    /// Function definition outside top level
    E1005,
    /// Malformed parameter list
    E1006,
    /// Duplicate function definition
    E1007,
    /// Duplicate parameter name
    E1008,
    /// `return` outside a function body
    E1009,
    /// Form head is not a symbol
    E1010,
    /// Statement used where a value is expected
    E1011,
    /// `quote` of something other than a string
    E1012,

    // Assembler / Verifier Errors (E2xxx)
    /// Unknown opcode tag
    E2001,
    /// Missing operand
    E2002,
    /// Stray `else` or `end`
    E2003,
    /// Unclosed `if`
    E2004,
    /// Malformed function block
    E2005,
    /// Malformed quoted token
    E2006,

    // Runtime Errors (E6xxx)
    /// Read past the end of the opcode stream
    E6001,
    /// Pop from an empty evaluation stack
    E6002,
    /// Unbound variable
    E6003,
    /// Undefined function
    E6004,
    /// `return` with no enclosing call
    E6005,
    /// Unknown opcode
    E6006,
    /// Type mismatch
    E6007,
    /// Recursion limit exceeded
    E6008,
    /// Structural marker out of place
    E6009,
    /// Malformed literal payload
    E6010,

    // Internal Errors (E9xxx)
    /// Frame bookkeeping did not balance
    E9001,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: [ErrorCode; 35] = [
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E0005,
        ErrorCode::E0006,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E1009,
        ErrorCode::E1010,
        ErrorCode::E1011,
        ErrorCode::E1012,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E6001,
        ErrorCode::E6002,
        ErrorCode::E6003,
        ErrorCode::E6004,
        ErrorCode::E6005,
        ErrorCode::E6006,
        ErrorCode::E6007,
        ErrorCode::E6008,
        ErrorCode::E6009,
        ErrorCode::E6010,
        ErrorCode::E9001,
    ];

    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E1011 => "E1011",
            ErrorCode::E1012 => "E1012",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E6008 => "E6008",
            ErrorCode::E6009 => "E6009",
            ErrorCode::E6010 => "E6010",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Parse a code like `E6003` (case-insensitive).
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(code))
    }

    /// One-line explanation, used by `opal explain`.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "a string literal is missing its closing quote",
            ErrorCode::E0002 => "the source contains a character the reader does not accept",
            ErrorCode::E0003 => "a string literal contains an unknown escape sequence",
            ErrorCode::E0004 => "a `)` appears with no matching `(`",
            ErrorCode::E0005 => "a `(` is never closed",
            ErrorCode::E0006 => "lists are nested deeper than the reader allows",
            ErrorCode::E1001 => "an empty list `()` cannot be compiled",
            ErrorCode::E1002 => "a special form was given the wrong number of arguments",
            ErrorCode::E1003 => "a name was expected (variable, function or parameter)",
            ErrorCode::E1004 => "a string literal reached the compiler without being quoted",
            ErrorCode::E1005 => "`fn` definitions are only allowed at the top level",
            ErrorCode::E1006 => "a function's parameter list must be a list of names",
            ErrorCode::E1007 => "two functions share the same name",
            ErrorCode::E1008 => "a function declares the same parameter twice",
            ErrorCode::E1009 => "`return` can only be used inside a function body",
            ErrorCode::E1010 => "the head of a form must be a name",
            ErrorCode::E1011 => "a statement (`let`, `print`, `if`, `do`, `return`) was used as a value",
            ErrorCode::E1012 => "`quote` only wraps string literals",
            ErrorCode::E2001 => "the opcode listing contains an unknown instruction tag",
            ErrorCode::E2002 => "a literal instruction is missing its operand",
            ErrorCode::E2003 => "an `else` or `end` has no matching `if`",
            ErrorCode::E2004 => "an `if` is never closed by `end`",
            ErrorCode::E2005 => "a `.fn` block is malformed or never closed by `.endfn`",
            ErrorCode::E2006 => "a quoted token is unterminated or contains an unknown escape",
            ErrorCode::E6001 => "an instruction needed a token past the end of the stream",
            ErrorCode::E6002 => "an instruction popped an empty evaluation stack",
            ErrorCode::E6003 => "a variable was read before anything was bound to it",
            ErrorCode::E6004 => "a call names a function that is not defined",
            ErrorCode::E6005 => "`return` executed with no enclosing call",
            ErrorCode::E6006 => "the stream contains an instruction tag the machine does not know",
            ErrorCode::E6007 => "an instruction received a value of the wrong kind",
            ErrorCode::E6008 => "calls nested deeper than the configured limit",
            ErrorCode::E6009 => "an `else` or `end` was reached outside its `if`",
            ErrorCode::E6010 => "a literal operand could not be parsed",
            ErrorCode::E9001 => "frame bookkeeping did not balance when evaluation finished",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
