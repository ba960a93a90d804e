//! Steps 1 and 13 of §4.2: `CASM(TOP)`/`CASM(BOTTOM)`, the raw pre-/post-pass extension points.
//! Unlike every other handler, these don't read a directive annotation off the transformer class —
//! they hand the target and transformer nodes to an arbitrary user-supplied callback, letting
//! advanced transformers do bytecode surgery the declarative directives don't cover.

use crate::context::HandlerCtx;
use crate::error::WeaveError;

/// A raw ASM-style hook: given the mutable target and the (already remapped) transformer class for
/// this application, may mutate the target however it likes.
pub type AsmHook = dyn Fn(&mut HandlerCtx) -> Result<(), WeaveError> + Send + Sync;

pub fn apply_top(ctx: &mut HandlerCtx, hooks: &[Box<AsmHook>]) -> Result<(), WeaveError> {
	run(ctx, hooks)
}

pub fn apply_bottom(ctx: &mut HandlerCtx, hooks: &[Box<AsmHook>]) -> Result<(), WeaveError> {
	run(ctx, hooks)
}

fn run(ctx: &mut HandlerCtx, hooks: &[Box<AsmHook>]) -> Result<(), WeaveError> {
	for hook in hooks {
		hook(ctx)?;
	}
	Ok(())
}
