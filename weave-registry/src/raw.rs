//! Raw transformers (§3 `rawTransformers`): hooks registered directly against a target class name,
//! bypassing the annotation-driven transformer class flow entirely. These are the "bytecode-
//! transformers"/"post-transformers" steps in §2's data-flow line — they run outside the fixed
//! thirteen-step per-transformer-class pipeline, so unlike `weave_handlers::handlers::asm::AsmHook`
//! they operate on a bare `&mut ClassNode`, with no paired transformer class to thread through a
//! `HandlerCtx`.

use std::sync::Arc;

use weave_ast::ClassNode;
use weave_handlers::error::WeaveError;

pub type RawHook = dyn Fn(&mut ClassNode) -> Result<(), WeaveError> + Send + Sync;

/// Where a raw transformer runs relative to the annotation-driven transformer loop for its target:
/// `Pre` matches "bytecode-transformers" in §2's data-flow line (before any transformer class is
/// applied), `Post` matches "post-transformers" (after every registered transformer class ran).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RawPhase {
	Pre,
	Post,
}

#[derive(Clone)]
pub struct RawTransformer {
	pub name: String,
	pub phase: RawPhase,
	pub hook: Arc<RawHook>,
}

impl RawTransformer {
	pub fn new(name: impl Into<String>, phase: RawPhase, hook: Arc<RawHook>) -> RawTransformer {
		RawTransformer { name: name.into(), phase, hook }
	}
}

impl std::fmt::Debug for RawTransformer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RawTransformer").field("name", &self.name).field("phase", &self.phase).finish_non_exhaustive()
	}
}
