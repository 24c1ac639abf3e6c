//! Opcode tags for the evaluator's token stream.
//!
//! A stream is a flat sequence of textual tokens. Each instruction starts
//! with a tag token; the four literal-producing tags are followed by
//! exactly one operand token carrying their raw payload.

use std::fmt;

/// Instruction tag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Opcode {
    /// `number <text>` - push a Number parsed from the operand.
    Number,
    /// `string <text>` - push the operand as Text.
    String,
    /// `bool <text>` - push `true` iff the operand is exactly `true`.
    Bool,
    /// `ident <text>` - push the operand as a Name (never looked up).
    Ident,
    /// Pop a Name, push its bound value.
    Var,
    /// Pop a Name, pop a Value, bind.
    Let,
    /// Binary operator: pop L, pop R, push `L op R`.
    Binary(BinaryOp),
    /// Pop a value and emit one line of output.
    Print,
    /// Pop a Boolean and select a branch.
    If,
    /// Separates the then-block from the else-block.
    Else,
    /// Closes an `if`.
    End,
    /// Pop a Name and invoke that function.
    Call,
    /// Pop a value and leave the enclosing call with it.
    Return,
}

impl Opcode {
    /// Every tag, in a stable order.
    pub const ALL: [Opcode; 22] = [
        Opcode::Number,
        Opcode::String,
        Opcode::Bool,
        Opcode::Ident,
        Opcode::Var,
        Opcode::Let,
        Opcode::Binary(BinaryOp::Add),
        Opcode::Binary(BinaryOp::Sub),
        Opcode::Binary(BinaryOp::Mul),
        Opcode::Binary(BinaryOp::Div),
        Opcode::Binary(BinaryOp::Eq),
        Opcode::Binary(BinaryOp::NotEq),
        Opcode::Binary(BinaryOp::Gt),
        Opcode::Binary(BinaryOp::Lt),
        Opcode::Binary(BinaryOp::LtEq),
        Opcode::Binary(BinaryOp::GtEq),
        Opcode::Print,
        Opcode::If,
        Opcode::Else,
        Opcode::End,
        Opcode::Call,
        Opcode::Return,
    ];

    /// Decode a tag token. Returns `None` for anything unrecognized.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let op = match tag {
            "number" => Opcode::Number,
            "string" => Opcode::String,
            "bool" => Opcode::Bool,
            "ident" => Opcode::Ident,
            "var" => Opcode::Var,
            "let" => Opcode::Let,
            "print" => Opcode::Print,
            "if" => Opcode::If,
            "else" => Opcode::Else,
            "end" => Opcode::End,
            "call" => Opcode::Call,
            "return" => Opcode::Return,
            other => return BinaryOp::from_symbol(other).map(Opcode::Binary),
        };
        Some(op)
    }

    /// The tag token text for this opcode.
    pub const fn tag(self) -> &'static str {
        match self {
            Opcode::Number => "number",
            Opcode::String => "string",
            Opcode::Bool => "bool",
            Opcode::Ident => "ident",
            Opcode::Var => "var",
            Opcode::Let => "let",
            Opcode::Binary(op) => op.as_symbol(),
            Opcode::Print => "print",
            Opcode::If => "if",
            Opcode::Else => "else",
            Opcode::End => "end",
            Opcode::Call => "call",
            Opcode::Return => "return",
        }
    }

    /// Whether the tag is immediately followed by one operand token.
    #[inline]
    pub const fn takes_operand(self) -> bool {
        matches!(
            self,
            Opcode::Number | Opcode::String | Opcode::Bool | Opcode::Ident
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Binary operators shared by the compiler and the evaluator.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Gt,
    Lt,
    LtEq,
    GtEq,
}

impl BinaryOp {
    /// Parse an operator symbol (`+`, `<=`, ...).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::NotEq,
            ">" => BinaryOp::Gt,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::LtEq,
            ">=" => BinaryOp::GtEq,
            _ => return None,
        };
        Some(op)
    }

    /// Source and tag spelling of the operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
        }
    }

    /// `+ - * /`, the operators the desugarer flattens.
    #[inline]
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}
