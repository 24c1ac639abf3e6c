//! The dispatch loop.
//!
//! One iteration reads one tag from the current frame's cursor and
//! executes it. Blocks and calls never recurse on the host stack: `if`
//! records a [`Block`] on the current frame, `call` pushes a [`Frame`],
//! and `return` surfaces as [`Flow::Return`] which the loop turns into a
//! frame pop plus a push of the returned value.

mod branch;

use std::sync::Arc;

use opal_ir::{Opcode, Program, Span};
use tracing::{debug, trace};

use crate::call_stack::{Block, CallStack, Frame, FrameKind};
use crate::print_handler::{PrintHandlerImpl, SharedPrintHandler};
use crate::value::apply_binary;
use crate::{EvalConfig, EvalError, EvalErrorKind, EvalStack, Value};

use branch::{skip_branch, BranchEnd};

/// Per-run instrumentation, reported by `opal run --profile`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalCounters {
    pub instructions: u64,
    pub calls: u64,
    pub returns: u64,
    /// Tokens passed over by branch skips.
    pub skipped_tokens: u64,
    pub max_call_depth: usize,
}

impl EvalCounters {
    /// Format a summary report.
    pub fn report(&self) -> String {
        format!(
            "Evaluation profile:\n  \
             Instructions executed: {}\n  \
             Function calls:        {}\n  \
             Returns:               {}\n  \
             Tokens skipped:        {}\n  \
             Deepest call stack:    {}",
            self.instructions,
            self.calls,
            self.returns,
            self.skipped_tokens,
            self.max_call_depth,
        )
    }
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    /// Evaluation stack contents, bottom to top.
    pub stack: Vec<Value>,
    pub counters: EvalCounters,
}

/// Executes programs. A machine holds configuration only; every run starts
/// from an empty stack and environment.
pub struct Machine {
    config: EvalConfig,
    print_handler: SharedPrintHandler,
}

impl Machine {
    pub fn new(config: EvalConfig, print_handler: SharedPrintHandler) -> Self {
        Machine {
            config,
            print_handler,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(tokens = program.main.len(), functions = program.functions.len())
    )]
    pub fn run(&self, program: &Program) -> Result<RunOutcome, EvalError> {
        let run = Run {
            program,
            print: &self.print_handler,
            stack: EvalStack::new(),
            frames: CallStack::new(
                Frame::top_level(program.main_stream()),
                self.config.max_call_depth,
            ),
            counters: EvalCounters::default(),
        };
        run.execute()
    }
}

/// Outcome of one instruction.
#[derive(Debug)]
pub(crate) enum Flow {
    Continue,
    /// Leave the current call with this value.
    Return(Value),
}

/// Where an instruction sits, for error reporting.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Site {
    pub position: usize,
    pub span: Span,
    pub opcode: Option<Opcode>,
}

/// An error kind plus, when it differs from the executing instruction,
/// the token it was found at.
#[derive(Debug)]
pub(crate) struct Fault {
    kind: EvalErrorKind,
    site: Option<Site>,
}

impl Fault {
    pub fn at(kind: EvalErrorKind, site: Site) -> Self {
        Fault {
            kind,
            site: Some(site),
        }
    }
}

impl From<EvalErrorKind> for Fault {
    fn from(kind: EvalErrorKind) -> Self {
        Fault { kind, site: None }
    }
}

struct Run<'p> {
    program: &'p Program,
    print: &'p PrintHandlerImpl,
    stack: EvalStack,
    frames: CallStack,
    counters: EvalCounters,
}

impl Run<'_> {
    fn execute(mut self) -> Result<RunOutcome, EvalError> {
        loop {
            let cursor = &self.frames.current().cursor;
            let position = cursor.position();
            let site = Site {
                position,
                span: Span::DUMMY,
                opcode: None,
            };
            if cursor.is_empty() {
                match self.finish_stream() {
                    Ok(true) => break,
                    Ok(false) => continue,
                    Err(kind) => return Err(self.error(kind.into(), site)),
                }
            }

            let Some(token) = self.frames.current_mut().cursor.next_token() else {
                return Err(self.error(EvalErrorKind::StreamUnderflow.into(), site));
            };

            let span = token.span;
            let Some(op) = Opcode::from_tag(token.as_str()) else {
                let kind = EvalErrorKind::UnknownOpcode {
                    tag: token.as_str().to_string(),
                };
                let site = Site {
                    position,
                    span,
                    opcode: None,
                };
                return Err(self.error(kind.into(), site));
            };

            self.counters.instructions += 1;
            trace!(position, opcode = %op, depth = self.frames.call_depth(), "dispatch");

            let site = Site {
                position,
                span,
                opcode: Some(op),
            };
            match self.step(op, span) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Return(value)) => self.finish_call(value),
                Err(fault) => return Err(self.error(fault, site)),
            }
        }

        debug!(
            instructions = self.counters.instructions,
            calls = self.counters.calls,
            stack = self.stack.len(),
            "run complete"
        );
        Ok(RunOutcome {
            stack: self.stack.into_vec(),
            counters: self.counters,
        })
    }

    fn error(&self, fault: Fault, current: Site) -> EvalError {
        let site = fault.site.unwrap_or(current);
        let tag = match &fault.kind {
            EvalErrorKind::UnknownOpcode { tag } => Some(tag.clone()),
            _ => site.opcode.map(|op| op.tag().to_string()),
        };
        let err = EvalError::new(fault.kind, site.position)
            .with_span(site.span)
            .with_backtrace(self.frames.capture());
        match tag {
            Some(tag) => err.with_opcode(tag),
            None => err,
        }
    }

    /// The current frame's stream is exhausted. Returns `true` when the
    /// whole run is finished.
    fn finish_stream(&mut self) -> Result<bool, EvalErrorKind> {
        let frame = self.frames.current();
        if !frame.blocks.is_empty() {
            return Err(EvalErrorKind::DepthInvariantViolated {
                open_blocks: frame.blocks.len(),
                open_calls: self.frames.call_depth(),
            });
        }
        match self.frames.pop_call() {
            None => Ok(true),
            Some(frame) => {
                // Falling off the end contributes no result.
                if let FrameKind::Call { function, .. } = &frame.kind {
                    debug!(function = %function, "call finished without return");
                }
                Ok(false)
            }
        }
    }

    fn finish_call(&mut self, value: Value) {
        if let Some(Frame {
            kind: FrameKind::Call { function, .. },
            blocks,
            ..
        }) = self.frames.pop_call()
        {
            debug!(
                function = %function,
                unwound_blocks = blocks.len(),
                value = %value,
                "return"
            );
        }
        self.counters.returns += 1;
        self.stack.push(value);
    }

    /// Consume the operand token following a literal tag.
    fn operand<R>(&mut self, f: impl FnOnce(&str) -> R) -> Result<R, EvalErrorKind> {
        let token = self
            .frames
            .current_mut()
            .cursor
            .next_token()
            .ok_or(EvalErrorKind::StreamUnderflow)?;
        Ok(f(token.as_str()))
    }

    fn pop_name(&mut self, operation: &'static str) -> Result<Arc<str>, EvalErrorKind> {
        match self.stack.pop()? {
            Value::Name(name) => Ok(name),
            other => Err(EvalErrorKind::TypeMismatch {
                operation,
                expected: "a name",
                found: other.type_name().to_string(),
            }),
        }
    }

    fn step(&mut self, op: Opcode, span: Span) -> Result<Flow, Fault> {
        match op {
            Opcode::Number => {
                let number = self.operand(|text| {
                    text.parse::<f64>()
                        .map_err(|_| EvalErrorKind::MalformedLiteral {
                            tag: "number",
                            text: text.to_string(),
                        })
                })??;
                self.stack.push(Value::Number(number));
            }
            Opcode::String => {
                let text = self.operand(|text| Arc::<str>::from(text))?;
                self.stack.push(Value::Text(text));
            }
            Opcode::Bool => {
                let flag = self.operand(|text| text == "true")?;
                self.stack.push(Value::Boolean(flag));
            }
            Opcode::Ident => {
                let name = self.operand(|text| Arc::<str>::from(text))?;
                self.stack.push(Value::Name(name));
            }
            Opcode::Var => {
                let name = self.pop_name("var")?;
                let value = self
                    .frames
                    .current()
                    .env
                    .lookup(&name)
                    .cloned()
                    .ok_or_else(|| EvalErrorKind::UnboundName {
                        name: name.to_string(),
                    })?;
                self.stack.push(value);
            }
            Opcode::Let => {
                let name = self.pop_name("let")?;
                let value = self.stack.pop()?;
                self.frames.current_mut().env.bind(name, value);
            }
            Opcode::Binary(binary) => {
                let lhs = self.stack.pop()?;
                let rhs = self.stack.pop()?;
                let result = apply_binary(binary, &lhs, &rhs)?;
                self.stack.push(result);
            }
            Opcode::Print => {
                let value = self.stack.pop()?;
                if let Value::Name(_) = value {
                    return Err(EvalErrorKind::TypeMismatch {
                        operation: "print",
                        expected: "a number, text or boolean",
                        found: value.type_name().to_string(),
                    }
                    .into());
                }
                self.print.println(&value.to_string());
            }
            Opcode::If => return self.branch(),
            Opcode::Else => {
                let frame = self.frames.current_mut();
                if frame.blocks.last() != Some(&Block::Then) {
                    return Err(EvalErrorKind::StructuralError {
                        reason: "`else` without an open then-block",
                    }
                    .into());
                }
                frame.blocks.pop();
                let (_, skipped) = skip_branch(&mut frame.cursor, false)?;
                self.counters.skipped_tokens += skipped;
            }
            Opcode::End => {
                if self.frames.current_mut().blocks.pop().is_none() {
                    return Err(EvalErrorKind::StructuralError {
                        reason: "`end` without an open block",
                    }
                    .into());
                }
            }
            Opcode::Call => self.call(span)?,
            Opcode::Return => {
                if !self.frames.current().is_call() {
                    return Err(EvalErrorKind::ReturnOutsideCall.into());
                }
                let value = self.stack.pop()?;
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Continue)
    }

    /// `if`: a true condition opens the then-block; a false one skips to
    /// the matching `else` (opening the else-block) or `end`.
    fn branch(&mut self) -> Result<Flow, Fault> {
        let condition = match self.stack.pop()? {
            Value::Boolean(b) => b,
            other => {
                return Err(EvalErrorKind::TypeMismatch {
                    operation: "if",
                    expected: "a boolean",
                    found: other.type_name().to_string(),
                }
                .into());
            }
        };

        let frame = self.frames.current_mut();
        if condition {
            frame.blocks.push(Block::Then);
        } else {
            let (reached, skipped) = skip_branch(&mut frame.cursor, true)?;
            if reached == BranchEnd::Else {
                frame.blocks.push(Block::Else);
            }
            self.counters.skipped_tokens += skipped;
        }
        Ok(Flow::Continue)
    }

    /// `call`: pop the function name, then one argument per parameter in
    /// declaration order, into a fork of the caller's environment.
    fn call(&mut self, call_span: Span) -> Result<(), EvalErrorKind> {
        let name = self.pop_name("call")?;
        let program = self.program;
        let def = program
            .functions
            .get(&name)
            .ok_or_else(|| EvalErrorKind::UndefinedFunction {
                name: name.to_string(),
            })?;
        self.frames.check_depth()?;

        let mut env = self.frames.current().env.fork();
        for param in &def.params {
            let value = self.stack.pop()?;
            env.bind(Arc::from(param.as_str()), value);
        }

        self.frames
            .push_call(Frame::call(name, call_span, def.body_stream(), env))?;
        self.counters.calls += 1;
        let depth = self.frames.call_depth();
        self.counters.max_call_depth = self.counters.max_call_depth.max(depth);
        debug!(function = %def.name, depth, "call");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
