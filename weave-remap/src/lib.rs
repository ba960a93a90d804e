//! The mapping engine: a mutable, keyed rename table plus a pass that rewrites the class/field/
//! method references inside a cloned [`ClassNode`] to point at current identifiers.
//!
//! Grounded on `quill::remapper`'s `ARemapper`/`BRemapper` traits (same `map_desc` char-scan, same
//! "fall back to identity" default), adapted from their immutable namespace-pair builders to the
//! single mutable table the spec calls for: one [`Remapper`] you register renames into directly,
//! rather than deriving one from a two-namespace `Mappings` tree.

pub mod rewrite;

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use weave_ast::tree::class::ClassName;
use weave_ast::tree::field::{FieldDescriptor, FieldName, FieldNameAndDesc};
use weave_ast::tree::method::{MethodDescriptor, MethodName, MethodNameAndDesc};

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct FieldKey {
	owner: ClassName,
	name: FieldName,
	/// `None` matches any descriptor on `name` — mirrors the spec's "desc may be empty to match
	/// any" field key form.
	desc: Option<FieldDescriptor>,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct MethodKey {
	owner: ClassName,
	name: MethodName,
	desc: MethodDescriptor,
}

/// A rename table keyed by class, method (`owner.name(desc)`) and field (`owner.name:desc`,
/// `desc` optionally absent to match any). `reverse()` is lazily built and cached; any
/// registration invalidates the cache.
#[derive(Debug, Default)]
pub struct Remapper {
	classes: IndexMap<ClassName, ClassName>,
	methods: IndexMap<MethodKey, MethodNameAndDesc>,
	fields: IndexMap<FieldKey, FieldNameAndDesc>,
	reverse_cache: RefCell<Option<Rc<Remapper>>>,
}

impl Remapper {
	pub fn new() -> Remapper {
		Remapper::default()
	}

	pub fn add_class(&mut self, from: ClassName, to: ClassName) {
		self.classes.insert(from, to);
		self.invalidate_reverse();
	}

	pub fn add_method(&mut self, owner: ClassName, name: MethodName, desc: MethodDescriptor, to_name: MethodName, to_desc: MethodDescriptor) {
		self.methods.insert(MethodKey { owner, name, desc }, MethodNameAndDesc { name: to_name, desc: to_desc });
		self.invalidate_reverse();
	}

	pub fn add_field(&mut self, owner: ClassName, name: FieldName, desc: Option<FieldDescriptor>, to_name: FieldName, to_desc: FieldDescriptor) {
		self.fields.insert(FieldKey { owner, name, desc }, FieldNameAndDesc { name: to_name, desc: to_desc });
		self.invalidate_reverse();
	}

	fn invalidate_reverse(&mut self) {
		*self.reverse_cache.borrow_mut() = None;
	}

	pub fn map_class_name(&self, class: &ClassName) -> ClassName {
		self.classes.get(class).cloned().unwrap_or_else(|| class.clone())
	}

	/// Identity-fallback lookup by key string, mirroring the spec's `mapSafe`: any class not in
	/// the table maps to itself.
	pub fn map_safe(&self, class: &ClassName) -> ClassName {
		self.map_class_name(class)
	}

	pub fn map_field_name(&self, owner: &ClassName, name: &FieldName, desc: &FieldDescriptor) -> FieldNameAndDesc {
		let exact = FieldKey { owner: owner.clone(), name: name.clone(), desc: Some(desc.clone()) };
		if let Some(mapped) = self.fields.get(&exact) {
			return mapped.clone();
		}
		let any_desc = FieldKey { owner: owner.clone(), name: name.clone(), desc: None };
		if let Some(mapped) = self.fields.get(&any_desc) {
			return FieldNameAndDesc { name: mapped.name.clone(), desc: self.map_field_desc(desc) };
		}
		FieldNameAndDesc { name: name.clone(), desc: self.map_field_desc(desc) }
	}

	pub fn map_method_name(&self, owner: &ClassName, name: &MethodName, desc: &MethodDescriptor) -> MethodNameAndDesc {
		let key = MethodKey { owner: owner.clone(), name: name.clone(), desc: desc.clone() };
		match self.methods.get(&key) {
			Some(mapped) => mapped.clone(),
			None => MethodNameAndDesc { name: name.clone(), desc: self.map_method_desc(desc) },
		}
	}

	pub fn map_field_desc(&self, desc: &FieldDescriptor) -> FieldDescriptor {
		FieldDescriptor::from(self.map_desc(desc.as_str()).as_str())
	}

	pub fn map_method_desc(&self, desc: &MethodDescriptor) -> MethodDescriptor {
		MethodDescriptor::from(self.map_desc(desc.as_str()).as_str())
	}

	/// Rewrites every `Lclass/name;` class reference embedded in a descriptor string, leaving
	/// primitive and array-dimension characters untouched. Ported from `quill`'s
	/// `ARemapper::map_desc` char scan.
	pub fn map_desc(&self, desc: &str) -> String {
		let mut out = String::new();
		let mut iter = desc.chars();

		while let Some(ch) = iter.next() {
			out.push(ch);
			if ch == 'L' {
				let mut class_name = String::new();
				for ch in iter.by_ref() {
					if ch == ';' {
						break;
					}
					class_name.push(ch);
				}
				let mapped = self.map_class_name(&ClassName::from(class_name.as_str()));
				out.push_str(mapped.as_str());
				out.push(';');
			}
		}

		out
	}

	/// The table with every `from -> to` entry inverted, with owners of methods/fields
	/// re-keyed under their mapped class. Built once and cached until the next mutation.
	pub fn reverse(&self) -> Rc<Remapper> {
		if let Some(cached) = self.reverse_cache.borrow().as_ref() {
			return cached.clone();
		}

		let mut classes = IndexMap::new();
		for (from, to) in &self.classes {
			classes.insert(to.clone(), from.clone());
		}

		let mut methods = IndexMap::new();
		for (key, mapped) in &self.methods {
			let new_owner = self.map_class_name(&key.owner);
			let new_key = MethodKey { owner: new_owner, name: mapped.name.clone(), desc: mapped.desc.clone() };
			methods.insert(new_key, MethodNameAndDesc { name: key.name.clone(), desc: key.desc.clone() });
		}

		let mut fields = IndexMap::new();
		for (key, mapped) in &self.fields {
			let new_owner = self.map_class_name(&key.owner);
			let new_key = FieldKey { owner: new_owner, name: mapped.name.clone(), desc: Some(mapped.desc.clone()) };
			fields.insert(new_key, FieldNameAndDesc { name: key.name.clone(), desc: key.desc.clone().unwrap_or_else(|| mapped.desc.clone()) });
		}

		let reversed = Rc::new(Remapper { classes, methods, fields, reverse_cache: RefCell::new(None) });
		*self.reverse_cache.borrow_mut() = Some(reversed.clone());
		reversed
	}
}
