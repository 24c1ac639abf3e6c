//! Stack safety for the recursive front-end passes.
//!
//! The reader, desugarer and compiler all walk nested S-expressions
//! recursively. Each recursive step is wrapped in [`ensure_sufficient_stack`]
//! so that pathological nesting grows the stack instead of overflowing it.
//! The evaluator does not need this: it drives an explicit frame stack.
//!
//! # Platform Support
//!
//! - **Native targets**: Uses the `stacker` crate to grow the stack on demand.
//! - **WASM targets**: No-op passthrough (WASM has its own stack management).
//!
//! # Configuration
//!
//! - **Red zone**: 64KB - if less than this remains, the stack grows
//! - **Growth size**: 1MB per growth

/// Minimum stack space to keep available.
const RED_ZONE: usize = 64 * 1024;

/// Stack space to allocate when growing.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// ```text
/// fn lower_expr(&mut self, expr: &Sexp) -> Result<(), CompileError> {
///     ensure_sufficient_stack(|| {
///         // ... recursive lowering ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
