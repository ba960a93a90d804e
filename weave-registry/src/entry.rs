//! A single registered transformer class plus the raw `CASM(TOP)`/`CASM(BOTTOM)` hooks (§4.2 steps
//! 1 and 13) registered alongside it. `weave_handlers::handlers::asm::AsmHook` already expects a
//! paired transformer `ClassNode` (it reads `ctx.transformer`), so those hooks live here, next to
//! the class node they were registered with, rather than in `crate::raw` alongside the
//! transformer-class-free raw transformers.

use weave_ast::ClassNode;
use weave_handlers::handlers::asm::AsmHook;

pub struct TransformerEntry {
	pub class: ClassNode,
	pub top_hooks: Vec<Box<AsmHook>>,
	pub bottom_hooks: Vec<Box<AsmHook>>,
}

impl TransformerEntry {
	pub fn new(class: ClassNode) -> TransformerEntry {
		TransformerEntry { class, top_hooks: Vec::new(), bottom_hooks: Vec::new() }
	}

	pub fn with_top_hook(mut self, hook: Box<AsmHook>) -> TransformerEntry {
		self.top_hooks.push(hook);
		self
	}

	pub fn with_bottom_hook(mut self, hook: Box<AsmHook>) -> TransformerEntry {
		self.bottom_hooks.push(hook);
		self
	}
}

impl std::fmt::Debug for TransformerEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TransformerEntry")
			.field("class", &self.class.name)
			.field("top_hooks", &self.top_hooks.len())
			.field("bottom_hooks", &self.bottom_hooks.len())
			.finish()
	}
}
