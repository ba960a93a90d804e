//! Wildcard registration (§6): resolves an `addTransformer`-style dot-form pattern against a
//! `ClassProvider`, and for each candidate class that carries a `@CMixin` class-level annotation,
//! registers it against every target name the annotation lists (`weave_handlers::directive::mixin_targets`).
//! A bare (non-wildcard) pattern that names a class without `@CMixin` is an error; a wildcard
//! pattern silently skips non-transformer classes it happens to enumerate.

use weave_ast::tree::class::ClassName;
use weave_handlers::directive::mixin_targets;
use weave_handlers::error::WeaveError;

use crate::entry::TransformerEntry;
use crate::provider::ClassProvider;
use crate::registry::Registry;
use crate::wildcard::Pattern;

/// Resolves `pattern` (dot-form, as `addTransformer` receives it) against `provider` and registers
/// every matching `@CMixin`-annotated class against its declared targets.
pub fn register_pattern(registry: &mut Registry, provider: &dyn ClassProvider, pattern: &str) -> Result<(), WeaveError> {
	let parsed = Pattern::parse(pattern);
	let is_wildcard = !matches!(parsed, Pattern::Exact(_));
	let all_names = provider.all_class_names();
	let candidates = parsed.matches(&all_names);

	for name in candidates {
		let Some(class) = provider.get_class(&name) else { continue };
		let targets = mixin_targets(&class.visible_annotations).into_iter().chain(mixin_targets(&class.invisible_annotations)).collect::<Vec<_>>();

		if targets.is_empty() {
			if is_wildcard {
				continue;
			}
			return Err(WeaveError::fault(
				"Registration",
				&class.name,
				&class.name,
				format!("{} has no @CMixin targets and was registered by bare name", class.name),
			));
		}

		for target in targets {
			registry.register_transformer(ClassName::from(target.as_str()), TransformerEntry::new(class.clone()));
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use indexmap::IndexMap;
	use weave_ast::tree::annotation::{Annotation, ElementValue};
	use weave_ast::tree::class::ClassAccess;
	use weave_ast::ClassNode;

	struct FakeProvider(IndexMap<ClassName, ClassNode>);

	impl ClassProvider for FakeProvider {
		fn get_class(&self, name: &ClassName) -> Option<ClassNode> {
			self.0.get(name).cloned()
		}

		fn all_class_names(&self) -> Vec<ClassName> {
			self.0.keys().cloned().collect()
		}
	}

	fn mixin_class(name: &str, targets: &[&str]) -> ClassNode {
		let mut class = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from(name), None, Vec::new());
		let values = targets.iter().map(|t| ElementValue::String((*t).to_owned())).collect();
		class.visible_annotations.push(Annotation::new("Lweave/CMixin;").with("value", ElementValue::Array(values)));
		class
	}

	fn plain_class(name: &str) -> ClassNode {
		ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from(name), None, Vec::new())
	}

	#[test]
	fn recursive_wildcard_registers_only_mixin_classes_under_prefix() {
		let mut classes = IndexMap::new();
		classes.insert(ClassName::from("pkg/A"), mixin_class("pkg/A", &["pkg/TargetA"]));
		classes.insert(ClassName::from("pkg/sub/B"), mixin_class("pkg/sub/B", &["pkg/TargetB"]));
		classes.insert(ClassName::from("other/C"), mixin_class("other/C", &["other/TargetC"]));
		let provider = FakeProvider(classes);

		let mut registry = Registry::new();
		register_pattern(&mut registry, &provider, "pkg.**").unwrap();

		assert!(registry.has_transformers_for(&ClassName::from("pkg/TargetA")));
		assert!(registry.has_transformers_for(&ClassName::from("pkg/TargetB")));
		assert!(!registry.has_transformers_for(&ClassName::from("other/TargetC")));
	}

	#[test]
	fn direct_children_wildcard_skips_non_mixin_classes_silently() {
		let mut classes = IndexMap::new();
		classes.insert(ClassName::from("pkg/A"), mixin_class("pkg/A", &["pkg/TargetA"]));
		classes.insert(ClassName::from("pkg/Plain"), plain_class("pkg/Plain"));
		let provider = FakeProvider(classes);

		let mut registry = Registry::new();
		register_pattern(&mut registry, &provider, "pkg.*").unwrap();

		assert!(registry.has_transformers_for(&ClassName::from("pkg/TargetA")));
		assert!(!registry.is_transformer_registered(&ClassName::from("pkg/Plain")));
	}

	#[test]
	fn bare_name_without_mixin_annotation_is_an_error() {
		let mut classes = IndexMap::new();
		classes.insert(ClassName::from("pkg/Plain"), plain_class("pkg/Plain"));
		let provider = FakeProvider(classes);

		let mut registry = Registry::new();
		assert!(register_pattern(&mut registry, &provider, "pkg.Plain").is_err());
	}
}
