//! Command handlers for the `opal` CLI.
//!
//! Each submodule implements one command. Shared helpers for reading
//! input files and reporting failures live here.

use std::io::IsTerminal;

use opal_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};

use crate::PipelineError;

mod debug;
mod explain;
mod run;

pub use debug::{read_forms, tokens_file};
pub use explain::explain_error;
pub use run::{exec_file, parse_run_args, run_file, RunOptions};

/// Read a file from disk, exiting with a user-friendly error message on failure.
pub(crate) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

/// Emit `err` against `source` on stderr and exit with status 1.
pub(crate) fn fail(path: &str, source: &str, err: &PipelineError) -> ! {
    let is_tty = std::io::stderr().is_terminal();
    let mut emitter =
        TerminalEmitter::stderr(ColorMode::Auto, is_tty).with_source(path, source);
    emitter.emit(&err.to_diagnostic());
    emitter.flush();
    std::process::exit(1);
}
