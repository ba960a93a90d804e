//! `WeaveEngine` (§2, §5, §9): the facade a host actually holds onto. Owns the registry behind a
//! `std::sync::RwLock` per §5's "Rust mapping", a per-class hotswap re-entrancy flag per §9, and
//! the obfuscation `Remapper` transformer bodies are remapped against before the handler chain
//! runs (§4.4's "rewrites... to point at the target's current identifiers").

use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

use weave_ast::tree::class::ClassName;
use weave_ast::ClassNode;
use weave_handlers::directive::mixin_targets;
use weave_handlers::error::WeaveError;
use weave_remap::Remapper;
use weave_registry::{mixin, ClassProvider, RawTransformer, Registry, TransformOutcome, TransformerEntry};

use crate::config::Config;

/// Releases a class's re-entrancy flag when dropped, including on an early return, so a second
/// `transform` call for the same class is never left permanently blocked by a first call that
/// returned through `?` or a panic unwind.
struct ReentrancyGuard<'a> {
	set: &'a Mutex<HashSet<ClassName>>,
	name: ClassName,
}

impl Drop for ReentrancyGuard<'_> {
	fn drop(&mut self) {
		self.set.lock().expect("reentrancy lock poisoned").remove(&self.name);
	}
}

pub struct WeaveEngine {
	registry: RwLock<Registry>,
	mappings: RwLock<Remapper>,
	config: Config,
	in_progress: Mutex<HashSet<ClassName>>,
	/// Targets successfully transformed at least once, so `hotswap` knows what to redefine.
	loaded: RwLock<indexmap::IndexMap<ClassName, ClassNode>>,
}

impl WeaveEngine {
	pub fn new(config: Config) -> WeaveEngine {
		WeaveEngine {
			registry: RwLock::new(Registry::new()),
			mappings: RwLock::new(Remapper::new()),
			config,
			in_progress: Mutex::new(HashSet::new()),
			loaded: RwLock::new(indexmap::IndexMap::new()),
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn set_mappings(&self, mappings: Remapper) {
		*self.mappings.write().expect("mappings lock poisoned") = mappings;
	}

	pub fn register_transformer(&self, target: ClassName, entry: TransformerEntry) {
		self.registry.write().expect("registry lock poisoned").register_transformer(target, entry);
	}

	pub fn register_raw_transformer(&self, target: ClassName, raw: RawTransformer) {
		self.registry.write().expect("registry lock poisoned").register_raw_transformer(target, raw);
	}

	/// Resolves a dot-form `addTransformer` pattern (bare name, `pkg.*`, `pkg.**`) against
	/// `provider` and registers every `@CMixin`-annotated match (§6 "Wildcard registration").
	pub fn register_pattern(&self, provider: &dyn ClassProvider, pattern: &str) -> Result<(), WeaveError> {
		mixin::register_pattern(&mut self.registry.write().expect("registry lock poisoned"), provider, pattern)
	}

	/// Models the instrumentation host's `transform(loader, name, classBeingRedefined,
	/// protectionDomain, bytes) -> bytes?` contract (§6). The `loader`/`classBeingRedefined`/
	/// `protectionDomain` parameters carry no semantic weight for this subsystem — they're JVM
	/// redefinition bookkeeping the (out-of-scope, §1) instrumentation host owns — so only `name`
	/// and the already-parsed class survive into this signature.
	pub fn transform(&self, name: &str, class: ClassNode) -> Option<ClassNode> {
		let target_name = ClassName::from(name.replace('.', "/").as_str());

		{
			let mut in_progress = self.in_progress.lock().expect("reentrancy lock poisoned");
			if in_progress.contains(&target_name) {
				log::warn!("re-entrant transform of {target_name} during its own load; returning unchanged");
				return None;
			}
			in_progress.insert(target_name.clone());
		}
		let _guard = ReentrancyGuard { set: &self.in_progress, name: target_name.clone() };

		let registry = self.registry.read().expect("registry lock poisoned");
		let mappings = self.mappings.read().expect("mappings lock poisoned");
		let outcome = weave_registry::transform_target(&registry, &target_name, class, &mappings, self.config.fail_strategy);
		drop(registry);
		drop(mappings);

		match outcome {
			Ok(TransformOutcome { class, outcomes }) => {
				for (who, result) in &outcomes {
					if let weave_registry::HandlerOutcome::Failed(err) = result {
						log::error!("{who} faulted on {target_name}: {err}");
					}
				}
				if let Some(class) = &class {
					self.loaded.write().expect("loaded-cache lock poisoned").insert(target_name, class.clone());
				}
				class
			}
			Err(err) => crate::fatal!("transform of {target_name} exited per fail strategy: {err}"),
		}
	}

	/// §6 "Hotswap": re-registers a redefined transformer class against its (possibly changed)
	/// `@CMixin` targets, then re-runs `transform` for every already-loaded target so the caller
	/// can redefine it via the host's redefine capability. The transformer's own returned class
	/// file is always an empty stub (the real bytecode lives only in the registry) — building that
	/// stub is the caller's concern, not this engine's, since it is purely a function of the
	/// transformer's own name/access and carries no transformation logic.
	pub fn hotswap(&self, transformer: ClassNode) -> Result<Vec<(ClassName, ClassNode)>, WeaveError> {
		if !self.config.hotswap_enabled {
			return Ok(Vec::new());
		}

		let targets = mixin_targets(&transformer.visible_annotations).into_iter().chain(mixin_targets(&transformer.invisible_annotations)).collect::<Vec<_>>();
		{
			let mut registry = self.registry.write().expect("registry lock poisoned");
			registry.unregister_transformer(&transformer.name);
			for target in &targets {
				registry.register_transformer(ClassName::from(target.as_str()), TransformerEntry::new(transformer.clone()));
			}
		}

		let loaded_snapshot: Vec<(ClassName, ClassNode)> = self.loaded.read().expect("loaded-cache lock poisoned").iter().map(|(k, v)| (k.clone(), v.clone())).collect();

		let mut redefined = Vec::new();
		for (name, class) in loaded_snapshot {
			if let Some(new_class) = self.transform(name.as_str(), class) {
				redefined.push((name, new_class));
			}
		}
		Ok(redefined)
	}
}
