//! The `ClassProvider` capability (§6): a way for the registry to enumerate and fetch classes a
//! host knows about, used for wildcard transformer registration (`pkg.*`/`pkg.**`).
//!
//! §1 takes the bytecode reader/writer as an external dependency and models only what the pipeline
//! does to the parsed AST; accordingly this trait is expressed in terms of `ClassNode`, not raw
//! `.class` bytes — a host wires its own reader behind an impl of this trait.

use weave_ast::tree::class::ClassName;

/// A capability exposed to the registry for resolving class names into parsed class nodes, and for
/// enumerating everything a host currently knows about (used by wildcard registration).
pub trait ClassProvider: Send + Sync {
	/// Fetches a single class by internal name, if the provider knows about it.
	fn get_class(&self, name: &ClassName) -> Option<weave_ast::ClassNode>;

	/// Every internal name the provider currently knows about. Wildcard registration walks this
	/// list rather than asking the provider to resolve a package prefix itself, matching the
	/// spec's "enumerates direct children"/"enumerates descendants" wording (the enumeration logic
	/// lives in `crate::wildcard`, not here).
	fn all_class_names(&self) -> Vec<ClassName>;
}
