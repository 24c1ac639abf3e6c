//! Source-to-result pipeline shared by the CLI commands and tests.

use std::time::Instant;

use opal_compile::{assemble, compile, verify, AssembleError, CompileError, VerifyError};
use opal_diagnostic::{Diagnostic, ErrorCode};
use opal_eval::{EvalError, Machine, RunOutcome};
use opal_ir::Program;
use opal_reader::{read_program, ReadError};

/// A failure from any phase.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl PipelineError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            PipelineError::Read(e) => e.to_diagnostic(),
            PipelineError::Compile(e) => e.to_diagnostic(),
            PipelineError::Assemble(e) => e.to_diagnostic(),
            PipelineError::Verify(e) => e.to_diagnostic(),
            PipelineError::Eval(e) => e.to_diagnostic(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.to_diagnostic().code
    }
}

/// Read, desugar and compile Opal source.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn compile_source(source: &str) -> Result<Program, PipelineError> {
    let forms = read_program(source)?;
    let program = compile(&forms)?;
    tracing::debug!(
        forms = forms.len(),
        main_tokens = program.main.len(),
        functions = program.functions.len(),
        "compiled"
    );
    Ok(program)
}

/// Assemble an opcode listing and check its structure.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = listing.len()))]
pub fn assemble_source(listing: &str) -> Result<Program, PipelineError> {
    let program = assemble(listing)?;
    verify(&program)?;
    tracing::debug!(functions = program.functions.len(), "listing verified");
    Ok(program)
}

pub fn run_program(machine: &Machine, program: &Program) -> Result<RunOutcome, PipelineError> {
    let start = Instant::now();
    let outcome = machine.run(program)?;
    tracing::debug!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        instructions = outcome.counters.instructions,
        "program finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests;
