use std::fmt::{Debug, Display, Formatter};
use anyhow::{bail, Result};
use crate::tree::annotation::Annotation;
use crate::tree::field::FieldNode;
use crate::tree::method::MethodNode;

/// A class, in the sense of the JVM class file format: a set of access flags, a name, a super
/// class, interfaces, fields, methods and annotations.
///
/// Unlike a visitor-based reader API, this is a plain mutable tree: handlers in `weave-handlers`
/// take `&mut ClassNode` and splice fields/methods/instructions directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNode {
	pub access: ClassAccess,
	pub name: ClassName,
	pub super_class: Option<ClassName>,
	pub interfaces: Vec<ClassName>,

	pub fields: Vec<FieldNode>,
	pub methods: Vec<MethodNode>,

	pub inner_classes: Vec<InnerClass>,

	pub visible_annotations: Vec<Annotation>,
	pub invisible_annotations: Vec<Annotation>,
}

impl ClassNode {
	pub fn new(access: ClassAccess, name: ClassName, super_class: Option<ClassName>, interfaces: Vec<ClassName>) -> ClassNode {
		ClassNode {
			access,
			name,
			super_class,
			interfaces,
			fields: Vec::new(),
			methods: Vec::new(),
			inner_classes: Vec::new(),
			visible_annotations: Vec::new(),
			invisible_annotations: Vec::new(),
		}
	}

	pub fn find_method(&self, name: &str, desc: &str) -> Option<&MethodNode> {
		self.methods.iter().find(|m| m.name.as_str() == name && m.descriptor.as_str() == desc)
	}

	pub fn find_method_mut(&mut self, name: &str, desc: &str) -> Option<&mut MethodNode> {
		self.methods.iter_mut().find(|m| m.name.as_str() == name && m.descriptor.as_str() == desc)
	}

	pub fn find_field(&self, name: &str, desc: &str) -> Option<&FieldNode> {
		self.fields.iter().find(|f| f.name.as_str() == name && (desc.is_empty() || f.descriptor.as_str() == desc))
	}

	/// Picks a name for a new member that doesn't collide with any existing field or method name.
	pub fn fresh_member_name(&self, base: &str) -> String {
		let mut candidate = base.to_owned();
		let mut i = 0u32;
		while self.methods.iter().any(|m| m.name.as_str() == candidate) || self.fields.iter().any(|f| f.name.as_str() == candidate) {
			i += 1;
			candidate = format!("{base}${i}");
		}
		candidate
	}
}

/// The access flags a class can have, per JVMS 4.1.
#[derive(Copy, Clone, Default, PartialEq)]
pub struct ClassAccess {
	pub is_public: bool,
	pub is_final: bool,
	pub is_super: bool,
	pub is_interface: bool,
	pub is_abstract: bool,
	pub is_synthetic: bool,
	pub is_annotation: bool,
	pub is_enum: bool,
}

impl Debug for ClassAccess {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("ClassAccess { ")?;
		if self.is_public     { f.write_str("public ")?; }
		if self.is_final      { f.write_str("final ")?; }
		if self.is_super      { f.write_str("super ")?; }
		if self.is_interface  { f.write_str("interface ")?; }
		if self.is_abstract   { f.write_str("abstract ")?; }
		if self.is_synthetic  { f.write_str("synthetic ")?; }
		if self.is_annotation { f.write_str("annotation ")?; }
		if self.is_enum       { f.write_str("enum ")?; }
		f.write_str("}")
	}
}

impl From<u16> for ClassAccess {
	fn from(value: u16) -> Self {
		ClassAccess {
			is_public:     value & 0x0001 != 0,
			is_final:      value & 0x0010 != 0,
			is_super:      value & 0x0020 != 0,
			is_interface:  value & 0x0200 != 0,
			is_abstract:   value & 0x0400 != 0,
			is_synthetic:  value & 0x1000 != 0,
			is_annotation: value & 0x2000 != 0,
			is_enum:       value & 0x4000 != 0,
		}
	}
}

impl From<ClassAccess> for u16 {
	fn from(value: ClassAccess) -> Self {
		(if value.is_public     { 0x0001 } else { 0 }) |
		(if value.is_final      { 0x0010 } else { 0 }) |
		(if value.is_super      { 0x0020 } else { 0 }) |
		(if value.is_interface  { 0x0200 } else { 0 }) |
		(if value.is_abstract   { 0x0400 } else { 0 }) |
		(if value.is_synthetic  { 0x1000 } else { 0 }) |
		(if value.is_annotation { 0x2000 } else { 0 }) |
		(if value.is_enum       { 0x4000 } else { 0 })
	}
}

/// An internal binary class name, e.g. `java/lang/Thread`. Always slash-separated.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ClassName(String);

impl ClassName {
	pub const JAVA_LANG_OBJECT_STR: &'static str = "java/lang/Object";

	pub fn new(s: impl Into<String>) -> Result<ClassName> {
		let s = s.into();
		if crate::tree::names::is_valid_class_name(&s) {
			Ok(ClassName(s))
		} else {
			bail!("invalid class name {s:?}: must be `/`-separated non-empty parts (or an array descriptor), without `.`, `;`, `[`")
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn get_simple_name(&self) -> &str {
		self.0.rsplit_once('/').map_or(self.0.as_str(), |(_, simple)| simple)
	}

	pub fn package(&self) -> &str {
		self.0.rsplit_once('/').map_or("", |(pkg, _)| pkg)
	}
}

impl From<&str> for ClassName {
	/// Infallible conversion used at call sites that already know the name is well-formed
	/// (test fixtures, constants). Prefer [`ClassName::new`] for untrusted input.
	fn from(value: &str) -> Self {
		ClassName::new(value).expect("well-formed class name literal")
	}
}

impl From<String> for ClassName {
	fn from(value: String) -> Self {
		ClassName::new(value).expect("well-formed class name")
	}
}

impl Display for ClassName {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClass {
	pub inner_class: ClassName,
	pub outer_class: Option<ClassName>,
	pub inner_name: Option<String>,
	pub flags: InnerClassFlags,
}

#[derive(Copy, Clone, PartialEq, Default)]
pub struct InnerClassFlags {
	pub is_public: bool,
	pub is_private: bool,
	pub is_protected: bool,
	pub is_static: bool,
	pub is_final: bool,
	pub is_interface: bool,
	pub is_abstract: bool,
	pub is_synthetic: bool,
}

impl Debug for InnerClassFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("InnerClassFlags { ")?;
		if self.is_public    { f.write_str("public ")?; }
		if self.is_private   { f.write_str("private ")?; }
		if self.is_protected { f.write_str("protected ")?; }
		if self.is_static    { f.write_str("static ")?; }
		if self.is_final     { f.write_str("final ")?; }
		if self.is_interface { f.write_str("interface ")?; }
		if self.is_abstract  { f.write_str("abstract ")?; }
		if self.is_synthetic { f.write_str("synthetic ")?; }
		f.write_str("}")
	}
}

impl InnerClassFlags {
	/// Strips `private`/`protected`, raising effective visibility to public. Used by the
	/// `InnerClassOpener` handler so copied member bodies can link against the inner class.
	pub fn open(&mut self) {
		self.is_private = false;
		self.is_protected = false;
		self.is_public = true;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn class_name_rejects_malformed() {
		assert!(ClassName::new("a.b").is_err());
		assert!(ClassName::new("").is_err());
		assert!(ClassName::new("java/lang/Object").is_ok());
	}

	#[test]
	fn simple_name_and_package() {
		let name = ClassName::from("a/b/C");
		assert_eq!(name.get_simple_name(), "C");
		assert_eq!(name.package(), "a/b");

		let unqualified = ClassName::from("C");
		assert_eq!(unqualified.get_simple_name(), "C");
		assert_eq!(unqualified.package(), "");
	}

	#[test]
	fn class_access_roundtrip() {
		let raw: u16 = 0x0001 | 0x0020 | 0x0400;
		let access = ClassAccess::from(raw);
		assert!(access.is_public);
		assert!(access.is_super);
		assert!(access.is_abstract);
		assert_eq!(u16::from(access), raw);
	}

	#[test]
	fn inner_class_open_raises_visibility() {
		let mut flags = InnerClassFlags { is_private: true, ..Default::default() };
		flags.open();
		assert!(!flags.is_private);
		assert!(flags.is_public);
	}
}
