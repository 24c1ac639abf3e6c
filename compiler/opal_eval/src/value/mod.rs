//! Runtime values.
//!
//! Text and names share their storage (`Arc<str>`), so copying an
//! environment at a call boundary never copies string contents.

use std::fmt;
use std::sync::Arc;

use opal_ir::BinaryOp;

use crate::EvalErrorKind;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(Arc<str>),
    Boolean(bool),
    /// An identifier pushed by `ident`. Consumed by `var`, `let` and
    /// `call`; never printed or combined.
    Name(Arc<str>),
}

impl Value {
    pub fn text(s: impl Into<Arc<str>>) -> Self {
        Value::Text(s.into())
    }

    pub fn name(s: impl Into<Arc<str>>) -> Self {
        Value::Name(s.into())
    }

    /// Kind name used in type mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Name(_) => "name",
        }
    }
}

/// Output form used by `print`.
///
/// Integral finite numbers drop the fraction (`33`, not `33.0`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => fmt_number(*n, f),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Name(name) => write!(f, "<name {name}>"),
        }
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // Adding zero folds `-0.0` into `0.0`.
    write!(f, "{}", n + 0.0)
}

/// Apply `op` to operands popped as `lhs` (first) and `rhs` (second).
pub(crate) fn apply_binary(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
) -> Result<Value, EvalErrorKind> {
    let result = match (op, lhs, rhs) {
        (BinaryOp::Add, Value::Number(a), Value::Number(b)) => Value::Number(a + b),
        (BinaryOp::Sub, Value::Number(a), Value::Number(b)) => Value::Number(a - b),
        (BinaryOp::Mul, Value::Number(a), Value::Number(b)) => Value::Number(a * b),
        (BinaryOp::Div, Value::Number(a), Value::Number(b)) => Value::Number(a / b),
        (BinaryOp::Add, Value::Text(a), Value::Text(b)) => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Value::text(joined)
        }

        (BinaryOp::Eq, Value::Number(a), Value::Number(b)) => Value::Boolean(a == b),
        (BinaryOp::Eq, Value::Text(a), Value::Text(b)) => Value::Boolean(a == b),
        (BinaryOp::Eq, Value::Boolean(a), Value::Boolean(b)) => Value::Boolean(a == b),
        (BinaryOp::NotEq, Value::Number(a), Value::Number(b)) => Value::Boolean(a != b),
        (BinaryOp::NotEq, Value::Text(a), Value::Text(b)) => Value::Boolean(a != b),
        (BinaryOp::NotEq, Value::Boolean(a), Value::Boolean(b)) => Value::Boolean(a != b),

        (BinaryOp::Lt, Value::Number(a), Value::Number(b)) => Value::Boolean(a < b),
        (BinaryOp::Gt, Value::Number(a), Value::Number(b)) => Value::Boolean(a > b),
        (BinaryOp::LtEq, Value::Number(a), Value::Number(b)) => Value::Boolean(a <= b),
        (BinaryOp::GtEq, Value::Number(a), Value::Number(b)) => Value::Boolean(a >= b),
        (BinaryOp::Lt, Value::Text(a), Value::Text(b)) => Value::Boolean(a < b),
        (BinaryOp::Gt, Value::Text(a), Value::Text(b)) => Value::Boolean(a > b),
        (BinaryOp::LtEq, Value::Text(a), Value::Text(b)) => Value::Boolean(a <= b),
        (BinaryOp::GtEq, Value::Text(a), Value::Text(b)) => Value::Boolean(a >= b),

        _ => {
            let expected = match op {
                BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => "two numbers",
                BinaryOp::Eq | BinaryOp::NotEq => "two values of the same kind",
                BinaryOp::Add
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::LtEq
                | BinaryOp::GtEq => "two numbers or two texts",
            };
            return Err(EvalErrorKind::TypeMismatch {
                operation: op.as_symbol(),
                expected,
                found: format!("{} and {}", lhs.type_name(), rhs.type_name()),
            });
        }
    };
    Ok(result)
}
