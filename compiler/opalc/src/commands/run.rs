//! The `run` and `exec` commands: build a program and evaluate it.

use opal_eval::{MachineBuilder, RunOutcome};
use opal_ir::Program;

use super::{fail, read_file};
use crate::{assemble_source, compile_source, run_program, PipelineError};

/// Options shared by `run` and `exec`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Overrides the default call depth limit.
    pub max_depth: Option<usize>,
    /// Print evaluation counters to stderr after the run.
    pub profile: bool,
}

/// Parse `<file> [--max-depth=N] [--profile]`, flags in any position.
pub fn parse_run_args(args: &[String]) -> Result<(String, RunOptions), String> {
    let mut options = RunOptions::default();
    let mut path = None;

    for arg in args {
        if let Some(value) = arg.strip_prefix("--max-depth=") {
            let depth = value
                .parse::<usize>()
                .map_err(|_| format!("invalid --max-depth value '{value}'"))?;
            options.max_depth = Some(depth);
        } else if arg == "--profile" {
            options.profile = true;
        } else if arg.starts_with('-') {
            return Err(format!("unknown option '{arg}'"));
        } else if path.is_none() {
            path = Some(arg.clone());
        } else {
            return Err(format!("unexpected argument '{arg}'"));
        }
    }

    path.map(|p| (p, options))
        .ok_or_else(|| "missing file path".to_string())
}

/// Run an Opal source file.
pub fn run_file(path: &str, options: &RunOptions) {
    let source = read_file(path);
    evaluate(path, &source, compile_source(&source), options);
}

/// Run an opcode listing after verifying it.
pub fn exec_file(path: &str, options: &RunOptions) {
    let listing = read_file(path);
    evaluate(path, &listing, assemble_source(&listing), options);
}

fn evaluate(
    path: &str,
    source: &str,
    program: Result<Program, PipelineError>,
    options: &RunOptions,
) {
    let program = match program {
        Ok(program) => program,
        Err(err) => fail(path, source, &err),
    };

    let mut builder = MachineBuilder::new();
    if let Some(depth) = options.max_depth {
        builder = builder.max_call_depth(depth);
    }
    let machine = builder.build();

    match run_program(&machine, &program) {
        Ok(RunOutcome { counters, .. }) => {
            if options.profile {
                eprintln!("{}", counters.report());
            }
        }
        Err(err) => fail(path, source, &err),
    }
}

#[cfg(test)]
mod tests;
