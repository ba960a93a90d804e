//! The per-application handler context: the target and transformer class nodes a single handler
//! pass mutates, plus the identifier map that accumulates shadow/rename mappings across handlers
//! (steps 3-5 of §4.2) for `MemberCopy` (step 12) to apply when rewriting copied bodies.

use indexmap::IndexMap;
use weave_ast::tree::class::ClassNode;
use weave_ast::tree::field::FieldNameAndDesc;
use weave_ast::tree::method::MethodNameAndDesc;

#[derive(Debug, Default)]
pub struct IdentifierMap {
	methods: IndexMap<MethodNameAndDesc, MethodNameAndDesc>,
	fields: IndexMap<FieldNameAndDesc, FieldNameAndDesc>,
}

impl IdentifierMap {
	pub fn map_method(&mut self, from: MethodNameAndDesc, to: MethodNameAndDesc) {
		self.methods.insert(from, to);
	}

	pub fn map_field(&mut self, from: FieldNameAndDesc, to: FieldNameAndDesc) {
		self.fields.insert(from, to);
	}

	pub fn resolve_method(&self, key: &MethodNameAndDesc) -> MethodNameAndDesc {
		self.methods.get(key).cloned().unwrap_or_else(|| key.clone())
	}

	pub fn resolve_field(&self, key: &FieldNameAndDesc) -> FieldNameAndDesc {
		self.fields.get(key).cloned().unwrap_or_else(|| key.clone())
	}

	pub fn methods(&self) -> impl Iterator<Item = (&MethodNameAndDesc, &MethodNameAndDesc)> {
		self.methods.iter()
	}

	pub fn fields(&self) -> impl Iterator<Item = (&FieldNameAndDesc, &FieldNameAndDesc)> {
		self.fields.iter()
	}
}

/// The mutable state one handler invocation (one transformer class against one target class)
/// operates on. Per Invariant 3 both `target` and `transformer` are already deep clones private to
/// this application — handlers are free to mutate either.
pub struct HandlerCtx<'a> {
	pub target: &'a mut ClassNode,
	pub transformer: &'a mut ClassNode,
	pub id_map: &'a mut IdentifierMap,
}
