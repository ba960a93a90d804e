//! The process-wide registries of §3: which transformer classes and raw transformers apply to
//! which target class names. `Registry` itself is plain data with no locking — §5's "Rust
//! mapping" puts the `RwLock` one level up, around the whole `Registry`, owned by `WeaveEngine` in
//! the `weave` crate; that lets a single guard cover the multi-map mutations `register_transformer`
//! performs atomically (Invariant 1's "insertion replaces same-named transformer, preserves order"
//! touches both `transformers` and `registered_transformer_names` together).
//!
//! **Open question, resolved here:** §3 also lists `annotationHandlers: ordered list<AnnotationHandler>`
//! and `injectionTargets: map<string, InjectionTargetImpl>` as registry fields. Neither is modelled
//! as runtime-mutable state in this crate: the thirteen-step handler order is fixed at compile time
//! in `weave_handlers::apply_pipeline` (§4.2 says the order "cannot be reordered after registration
//! except via the anchors", and the only anchors that exist — `CASM(TOP)`/`CASM(BOTTOM)` — are
//! already the per-transformer hooks in `crate::entry::TransformerEntry`, not a global list to
//! splice into), and the injection-target-kind dispatch is likewise a fixed compile-time match in
//! `weave_target::resolve_directive`. Modelling either as a runtime `Vec`/`IndexMap` the way the
//! source language's reflective registration does would add mutable global surface the fixed
//! pipeline never actually uses.

use indexmap::{IndexMap, IndexSet};
use weave_ast::tree::class::ClassName;

use crate::entry::TransformerEntry;
use crate::raw::RawTransformer;

/// The transformer/raw-transformer registrations known to the process. Carries no lock itself —
/// callers (here, `weave::WeaveEngine`) wrap it in a `std::sync::RwLock`.
#[derive(Debug, Default)]
pub struct Registry {
	transformers: IndexMap<ClassName, Vec<TransformerEntry>>,
	raw_transformers: IndexMap<ClassName, Vec<RawTransformer>>,
	registered_transformer_names: IndexSet<ClassName>,
}

impl Registry {
	pub fn new() -> Registry {
		Registry::default()
	}

	/// Registers `transformer` against `target`. Per Invariant 1/§8 "registering the same
	/// transformer class twice... does not duplicate its effects", a second registration of a
	/// transformer with the same class name against the same target replaces the first in place,
	/// preserving its original position in iteration order.
	pub fn register_transformer(&mut self, target: ClassName, transformer: TransformerEntry) {
		let name = transformer.class.name.clone();
		let list = self.transformers.entry(target).or_default();
		match list.iter().position(|existing| existing.class.name == name) {
			Some(i) => list[i] = transformer,
			None => list.push(transformer),
		}
		self.registered_transformer_names.insert(name);
	}

	pub fn register_raw_transformer(&mut self, target: ClassName, raw: RawTransformer) {
		self.raw_transformers.entry(target).or_default().push(raw);
	}

	/// Removes every transformer registered under `transformer_name`, from whichever target(s) it
	/// was registered against. Used by hotswap to drop stale state before re-registering a
	/// redefined transformer class.
	pub fn unregister_transformer(&mut self, transformer_name: &ClassName) {
		for list in self.transformers.values_mut() {
			list.retain(|entry| &entry.class.name != transformer_name);
		}
		self.transformers.retain(|_, list| !list.is_empty());
		self.registered_transformer_names.shift_remove(transformer_name);
	}

	pub fn transformers_for(&self, target: &ClassName) -> &[TransformerEntry] {
		self.transformers.get(target).map_or(&[], Vec::as_slice)
	}

	pub fn raw_transformers_for(&self, target: &ClassName) -> &[RawTransformer] {
		self.raw_transformers.get(target).map_or(&[], Vec::as_slice)
	}

	pub fn is_transformer_registered(&self, name: &ClassName) -> bool {
		self.registered_transformer_names.contains(name)
	}

	/// Invariant 4: a target is retransformed only if something is registered against its name.
	pub fn has_transformers_for(&self, target: &ClassName) -> bool {
		!self.transformers_for(target).is_empty() || !self.raw_transformers_for(target).is_empty()
	}

	/// `transformedTargetNames`: the union of every name either map is keyed by.
	pub fn transformed_target_names(&self) -> IndexSet<ClassName> {
		self.transformers.keys().chain(self.raw_transformers.keys()).cloned().collect()
	}
}
