//! Wildcard transformer registration (§6): `pkg.*` enumerates direct children of `pkg`, `pkg.**`
//! enumerates all descendants, and a bare name registers exactly that one class. Patterns are
//! written in dot-form (matching the spec's `addTransformer("pkg.*")` examples) but matched
//! against `ClassName::package()`, which is slash-separated — `Pattern::parse` does the
//! conversion once so the matcher itself only ever compares slash-separated segments.

use weave_ast::tree::class::ClassName;

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
	/// A single, fully-qualified class name.
	Exact(ClassName),
	/// `pkg.*`: every class directly inside `pkg` (slash-separated internally).
	DirectChildren(String),
	/// `pkg.**`: every class under `pkg`, at any depth.
	Descendants(String),
}

impl Pattern {
	/// Parses a dot-form registration string (`"pkg.*"`, `"pkg.**"`, `"pkg.Class"`) the way
	/// `addTransformer` receives it.
	pub fn parse(raw: &str) -> Pattern {
		if let Some(pkg) = raw.strip_suffix(".**") {
			Pattern::Descendants(pkg.replace('.', "/"))
		} else if let Some(pkg) = raw.strip_suffix(".*") {
			Pattern::DirectChildren(pkg.replace('.', "/"))
		} else {
			Pattern::Exact(ClassName::from(raw.replace('.', "/").as_str()))
		}
	}

	/// Selects the matching class names out of everything a `ClassProvider` knows about.
	pub fn matches<'a>(&self, all_names: impl IntoIterator<Item = &'a ClassName>) -> Vec<ClassName> {
		match self {
			Pattern::Exact(name) => vec![name.clone()],
			Pattern::DirectChildren(pkg) => all_names.into_iter().filter(|n| n.package() == pkg).cloned().collect(),
			Pattern::Descendants(pkg) => all_names
				.into_iter()
				.filter(|n| n.package() == pkg || n.package().starts_with(&format!("{pkg}/")))
				.cloned()
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn names(raw: &[&str]) -> Vec<ClassName> {
		raw.iter().map(|s| ClassName::from(*s)).collect()
	}

	#[test]
	fn exact_pattern_matches_only_itself() {
		let pattern = Pattern::parse("pkg.A");
		assert_eq!(pattern.matches(&names(&["pkg/A", "pkg/B"])), vec![ClassName::from("pkg/A")]);
	}

	#[test]
	fn direct_children_excludes_nested_packages() {
		let pattern = Pattern::parse("pkg.*");
		let all = names(&["pkg/A", "pkg/sub/B", "other/C"]);
		assert_eq!(pattern.matches(&all), vec![ClassName::from("pkg/A")]);
	}

	#[test]
	fn descendants_includes_nested_packages() {
		let pattern = Pattern::parse("pkg.**");
		let all = names(&["pkg/A", "pkg/sub/B", "other/C"]);
		let mut matched = pattern.matches(&all);
		matched.sort_by(|a, b| a.as_str().cmp(b.as_str()));
		assert_eq!(matched, vec![ClassName::from("pkg/A"), ClassName::from("pkg/sub/B")]);
	}
}
