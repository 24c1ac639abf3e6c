//! Opal driver: wires the reader, compiler and evaluator together.
//!
//! ```text
//! file.opal ──► read ──► desugar ──► compile ─┐
//!                                             ├──► Program ──► Machine::run
//! file.ops  ──► assemble ──► verify ──────────┘
//! ```
//!
//! The `opal` binary is a thin layer over [`commands`]; embedders use
//! [`compile_source`] / [`assemble_source`] and build their own
//! [`Machine`](opal_eval::Machine).

pub mod commands;
mod pipeline;

pub use pipeline::{assemble_source, compile_source, run_program, PipelineError};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// The filter comes from `OPAL_LOG`, or `RUST_LOG` when that is unset or
/// invalid. With neither set, no subscriber is installed. Safe to call
/// multiple times.
///
/// ```text
/// OPAL_LOG=opal_eval=debug opal run fib.opal
/// ```
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_env("OPAL_LOG")
            .or_else(|_| EnvFilter::try_from_default_env());
        if let Ok(filter) = filter {
            let tree = tracing_tree::HierarchicalLayer::new(2)
                .with_writer(std::io::stderr)
                .with_targets(true)
                .with_indent_lines(true);
            tracing_subscriber::registry().with(filter).with(tree).init();
        }
    });
}
