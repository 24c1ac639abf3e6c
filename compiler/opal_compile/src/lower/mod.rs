//! Lowering from desugared S-expressions to opcode streams.
//!
//! Operand order follows the evaluator's pop order: a binary operator pops
//! its left operand first, so `(op a b)` emits `b` then `a` then `op`.
//! Calls push arguments last-to-first so the first parameter is on top.
//!
//! | Form             | Tokens                                   |
//! |------------------|------------------------------------------|
//! | `(let x e)`      | `⟦e⟧ ident x let`                        |
//! | `(print e)`      | `⟦e⟧ print`                              |
//! | `(if c t f)`     | `⟦c⟧ if ⟦t⟧ else ⟦f⟧ end`                |
//! | `(return e)`     | `⟦e⟧ return`                             |
//! | `(op a b)`       | `⟦b⟧ ⟦a⟧ op`                             |
//! | `(f a1 … an)`    | `⟦an⟧ … ⟦a1⟧ ident f call`               |

use opal_ir::{
    BinaryOp, FunctionDef, FunctionTable, Opcode, Params, Program, Sexp, SexpKind, Span, Token,
};
use opal_stack::ensure_sufficient_stack;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::CompileError;

/// Symbols that can never name a variable, parameter or function.
pub const KEYWORDS: [&str; 9] = [
    "let", "print", "if", "do", "return", "fn", "quote", "true", "false",
];

/// Lower a whole program.
///
/// Top-level `fn` forms populate the function table; every other form is a
/// statement of the main stream, in source order.
#[tracing::instrument(level = "debug", skip_all, fields(forms = forms.len()))]
pub fn compile(forms: &[Sexp]) -> Result<Program, CompileError> {
    let mut functions = FunctionTable::new();
    let mut main = Lowerer::new(false);

    for form in forms {
        if form.head_symbol() == Some("fn") {
            let def = lower_function(form)?;
            debug!(
                name = %def.name,
                arity = def.arity(),
                tokens = def.body.len(),
                "defined function"
            );
            if let Err(rejected) = functions.define(def) {
                let first = functions
                    .get(&rejected.name)
                    .map_or(Span::DUMMY, |f| f.span);
                return Err(CompileError::DuplicateFunction {
                    name: rejected.name,
                    span: rejected.span,
                    first,
                });
            }
        } else {
            main.lower_stmt(form)?;
        }
    }

    debug!(
        tokens = main.tokens.len(),
        functions = functions.len(),
        "compiled program"
    );
    Ok(Program::new(main.tokens, functions))
}

/// `(fn name (p1 … pk) body…)`
fn lower_function(form: &Sexp) -> Result<FunctionDef, CompileError> {
    let items = form.as_list().unwrap_or_default();
    if items.len() < 3 {
        return Err(CompileError::WrongArity {
            form: "fn".into(),
            expected: "a name, a parameter list and a body",
            found: items.len().saturating_sub(1),
            span: form.span,
        });
    }

    let name = expect_name(&items[1], "function")?;
    let Some(param_forms) = items[2].as_list() else {
        return Err(CompileError::MalformedParams {
            span: items[2].span,
        });
    };

    let mut params = Params::new();
    let mut seen = FxHashSet::default();
    for param in param_forms {
        if param.as_symbol().is_none() {
            return Err(CompileError::MalformedParams { span: param.span });
        }
        let param_name = expect_name(param, "parameter")?;
        if !seen.insert(param_name) {
            return Err(CompileError::DuplicateParameter {
                name: param_name.to_string(),
                span: param.span,
            });
        }
        params.push(param_name.to_string());
    }

    let mut body = Lowerer::new(true);
    for stmt in &items[3..] {
        body.lower_stmt(stmt)?;
    }

    Ok(FunctionDef::new(name, params, body.tokens, form.span))
}

fn expect_name<'a>(form: &'a Sexp, context: &'static str) -> Result<&'a str, CompileError> {
    let Some(name) = form.as_symbol() else {
        return Err(CompileError::ExpectedName {
            context,
            span: form.span,
        });
    };
    if KEYWORDS.contains(&name) || BinaryOp::from_symbol(name).is_some() {
        return Err(CompileError::ReservedName {
            name: name.to_string(),
            context,
            span: form.span,
        });
    }
    Ok(name)
}

fn expect_args(
    form: &str,
    items: &[Sexp],
    count: usize,
    expected: &'static str,
    span: Span,
) -> Result<(), CompileError> {
    let found = items.len().saturating_sub(1);
    if found == count {
        Ok(())
    } else {
        Err(CompileError::WrongArity {
            form: form.to_string(),
            expected,
            found,
            span,
        })
    }
}

/// Token sink for one stream (the main program or a function body).
struct Lowerer {
    tokens: Vec<Token>,
    in_function: bool,
}

impl Lowerer {
    fn new(in_function: bool) -> Self {
        Lowerer {
            tokens: Vec::new(),
            in_function,
        }
    }

    fn emit(&mut self, op: Opcode, span: Span) {
        self.tokens.push(Token::new(op.tag(), span));
    }

    fn emit_literal(&mut self, op: Opcode, payload: &str, span: Span) {
        debug_assert!(op.takes_operand());
        self.emit(op, span);
        self.tokens.push(Token::new(payload, span));
    }

    fn lower_stmt(&mut self, form: &Sexp) -> Result<(), CompileError> {
        ensure_sufficient_stack(|| self.lower_stmt_inner(form))
    }

    fn lower_stmt_inner(&mut self, form: &Sexp) -> Result<(), CompileError> {
        let Some(items) = form.as_list() else {
            return self.lower_expr(form);
        };
        let span = form.span;

        match items.first().and_then(Sexp::as_symbol) {
            Some("let") => {
                expect_args("let", items, 2, "a name and a value", span)?;
                let name = expect_name(&items[1], "variable")?;
                self.lower_expr(&items[2])?;
                self.emit_literal(Opcode::Ident, name, items[1].span);
                self.emit(Opcode::Let, span);
            }
            Some("print") => {
                expect_args("print", items, 1, "one value", span)?;
                self.lower_expr(&items[1])?;
                self.emit(Opcode::Print, span);
            }
            Some("if") => {
                if !(3..=4).contains(&items.len()) {
                    return Err(CompileError::WrongArity {
                        form: "if".into(),
                        expected: "a condition, a then-branch and an optional else-branch",
                        found: items.len() - 1,
                        span,
                    });
                }
                self.lower_expr(&items[1])?;
                self.emit(Opcode::If, span);
                self.lower_stmt(&items[2])?;
                if let Some(otherwise) = items.get(3) {
                    self.emit(Opcode::Else, otherwise.span);
                    self.lower_stmt(otherwise)?;
                }
                self.emit(Opcode::End, span);
            }
            Some("do") => {
                for stmt in &items[1..] {
                    self.lower_stmt(stmt)?;
                }
            }
            Some("return") => {
                if !self.in_function {
                    return Err(CompileError::ReturnOutsideFunction { span });
                }
                expect_args("return", items, 1, "one value", span)?;
                self.lower_expr(&items[1])?;
                self.emit(Opcode::Return, span);
            }
            Some("fn") => return Err(CompileError::NestedFunction { span }),
            _ => self.lower_expr(form)?,
        }
        Ok(())
    }

    fn lower_expr(&mut self, form: &Sexp) -> Result<(), CompileError> {
        ensure_sufficient_stack(|| self.lower_expr_inner(form))
    }

    fn lower_expr_inner(&mut self, form: &Sexp) -> Result<(), CompileError> {
        let span = form.span;
        match &form.kind {
            SexpKind::Number(text) => self.emit_literal(Opcode::Number, text, span),
            SexpKind::Str(_) => return Err(CompileError::UnquotedString { span }),
            SexpKind::Symbol(name) if name == "true" || name == "false" => {
                self.emit_literal(Opcode::Bool, name, span);
            }
            SexpKind::Symbol(_) => {
                let name = expect_name(form, "variable")?;
                self.emit_literal(Opcode::Ident, name, span);
                self.emit(Opcode::Var, span);
            }
            SexpKind::List(items) => {
                let Some(head) = items.first() else {
                    return Err(CompileError::EmptyForm { span });
                };
                let Some(op) = head.as_symbol() else {
                    return Err(CompileError::NonSymbolHead { span: head.span });
                };
                match op {
                    "quote" => {
                        expect_args("quote", items, 1, "one string literal", span)?;
                        let SexpKind::Str(text) = &items[1].kind else {
                            return Err(CompileError::InvalidQuote {
                                span: items[1].span,
                            });
                        };
                        self.emit_literal(Opcode::String, text, span);
                    }
                    "let" | "print" | "if" | "do" | "return" => {
                        return Err(CompileError::StatementAsValue {
                            form: op.to_string(),
                            span,
                        });
                    }
                    "fn" => return Err(CompileError::NestedFunction { span }),
                    _ => match BinaryOp::from_symbol(op) {
                        Some(binary) => self.lower_operator(binary, &items[1..], span)?,
                        None => self.lower_call(head, &items[1..], span)?,
                    },
                }
            }
        }
        Ok(())
    }

    fn lower_operator(
        &mut self,
        op: BinaryOp,
        args: &[Sexp],
        span: Span,
    ) -> Result<(), CompileError> {
        match (op, args) {
            (_, [lhs, rhs]) => {
                self.lower_expr(rhs)?;
                self.lower_expr(lhs)?;
                self.emit(Opcode::Binary(op), span);
            }
            // Negation and reciprocal: the constant is popped first, as L.
            (BinaryOp::Sub, [operand]) => {
                self.lower_expr(operand)?;
                self.emit_literal(Opcode::Number, "0", span);
                self.emit(Opcode::Binary(op), span);
            }
            (BinaryOp::Div, [operand]) => {
                self.lower_expr(operand)?;
                self.emit_literal(Opcode::Number, "1", span);
                self.emit(Opcode::Binary(op), span);
            }
            (BinaryOp::Add | BinaryOp::Mul, [operand]) => self.lower_expr(operand)?,
            _ => {
                let expected = if op.is_arithmetic() {
                    "one or two operands"
                } else {
                    "two operands"
                };
                return Err(CompileError::WrongArity {
                    form: op.as_symbol().to_string(),
                    expected,
                    found: args.len(),
                    span,
                });
            }
        }
        Ok(())
    }

    fn lower_call(
        &mut self,
        callee: &Sexp,
        args: &[Sexp],
        span: Span,
    ) -> Result<(), CompileError> {
        let name = expect_name(callee, "function")?;
        for arg in args.iter().rev() {
            self.lower_expr(arg)?;
        }
        self.emit_literal(Opcode::Ident, name, callee.span);
        self.emit(Opcode::Call, span);
        Ok(())
    }
}
