//! Machine configuration.

use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::Machine;

/// Call depth allowed when none is configured.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Resolved machine settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum number of simultaneously open call frames.
    pub max_call_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Builder for [`Machine`].
///
/// ```
/// use opal_eval::{buffer_handler, MachineBuilder};
///
/// let machine = MachineBuilder::new()
///     .max_call_depth(64)
///     .print_handler(buffer_handler())
///     .build();
/// assert_eq!(machine.config().max_call_depth, 64);
/// ```
#[must_use]
#[derive(Default)]
pub struct MachineBuilder {
    config: EvalConfig,
    print_handler: Option<SharedPrintHandler>,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    /// Where `print` output goes. Defaults to stdout.
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Machine {
        Machine::new(self.config, self.print_handler.unwrap_or_else(stdout_handler))
    }
}
