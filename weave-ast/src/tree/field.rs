use std::fmt::{Debug, Display, Formatter};
use anyhow::{bail, Result};
use crate::tree::annotation::Annotation;
use crate::tree::class::ClassName;
use crate::tree::descriptor::Type;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
	pub access: FieldAccess,
	pub name: FieldName,
	pub descriptor: FieldDescriptor,

	pub visible_annotations: Vec<Annotation>,
	pub invisible_annotations: Vec<Annotation>,
}

impl FieldNode {
	pub fn new(access: FieldAccess, name: FieldName, descriptor: FieldDescriptor) -> FieldNode {
		FieldNode { access, name, descriptor, visible_annotations: Vec::new(), invisible_annotations: Vec::new() }
	}

	pub fn as_ref(&self, owner: ClassName) -> FieldRef {
		FieldRef { class: owner, name: self.name.clone(), desc: self.descriptor.clone() }
	}

	pub fn ty(&self) -> Type {
		self.descriptor.parse().expect("field descriptor was validated at construction")
	}
}

#[derive(Copy, Clone, Hash, Eq, PartialEq, Default)]
pub struct FieldAccess {
	pub is_public: bool,
	pub is_private: bool,
	pub is_protected: bool,
	pub is_static: bool,
	pub is_final: bool,
	pub is_volatile: bool,
	pub is_transient: bool,
	pub is_synthetic: bool,
	pub is_enum: bool,
}

impl Debug for FieldAccess {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("FieldAccess { ")?;
		if self.is_public    { f.write_str("public ")?; }
		if self.is_private   { f.write_str("private ")?; }
		if self.is_protected { f.write_str("protected ")?; }
		if self.is_static    { f.write_str("static ")?; }
		if self.is_final      { f.write_str("final ")?; }
		if self.is_volatile   { f.write_str("volatile ")?; }
		if self.is_transient  { f.write_str("transient ")?; }
		if self.is_synthetic  { f.write_str("synthetic ")?; }
		if self.is_enum       { f.write_str("enum ")?; }
		f.write_str("}")
	}
}

impl From<u16> for FieldAccess {
	fn from(value: u16) -> Self {
		FieldAccess {
			is_public:    value & 0x0001 != 0,
			is_private:   value & 0x0002 != 0,
			is_protected: value & 0x0004 != 0,
			is_static:    value & 0x0008 != 0,
			is_final:     value & 0x0010 != 0,
			is_volatile:  value & 0x0040 != 0,
			is_transient: value & 0x0080 != 0,
			is_synthetic: value & 0x1000 != 0,
			is_enum:      value & 0x4000 != 0,
		}
	}
}

impl From<FieldAccess> for u16 {
	fn from(value: FieldAccess) -> Self {
		(if value.is_public    { 0x0001 } else { 0 }) |
		(if value.is_private   { 0x0002 } else { 0 }) |
		(if value.is_protected { 0x0004 } else { 0 }) |
		(if value.is_static    { 0x0008 } else { 0 }) |
		(if value.is_final     { 0x0010 } else { 0 }) |
		(if value.is_volatile  { 0x0040 } else { 0 }) |
		(if value.is_transient { 0x0080 } else { 0 }) |
		(if value.is_synthetic { 0x1000 } else { 0 }) |
		(if value.is_enum      { 0x4000 } else { 0 })
	}
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldName(String);

impl FieldName {
	pub fn new(s: impl Into<String>) -> Result<FieldName> {
		let s = s.into();
		if crate::tree::names::is_valid_unqualified_name(&s) {
			Ok(FieldName(s))
		} else {
			bail!("invalid field name {s:?}")
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for FieldName {
	fn from(value: &str) -> Self {
		FieldName::new(value).expect("well-formed field name literal")
	}
}

impl Display for FieldName {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldDescriptor(String);

impl FieldDescriptor {
	pub fn new(s: impl Into<String>) -> Result<FieldDescriptor> {
		let s = s.into();
		let _: Type = crate::tree::descriptor::parse_field_descriptor(&s)?;
		Ok(FieldDescriptor(s))
	}

	pub fn as_str(&self) -> &str { &self.0 }

	pub fn parse(&self) -> Result<Type> {
		crate::tree::descriptor::parse_field_descriptor(&self.0)
	}
}

impl From<&str> for FieldDescriptor {
	fn from(value: &str) -> Self {
		FieldDescriptor::new(value).expect("well-formed field descriptor literal")
	}
}
impl From<Type> for FieldDescriptor {
	fn from(value: Type) -> Self {
		FieldDescriptor(value.descriptor_string())
	}
}

impl Display for FieldDescriptor {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldRef {
	pub class: ClassName,
	pub name: FieldName,
	pub desc: FieldDescriptor,
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldNameAndDesc {
	pub name: FieldName,
	pub desc: FieldDescriptor,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn field_access_roundtrip() {
		let raw = 0x0001 | 0x0008 | 0x0010;
		let access = FieldAccess::from(raw);
		assert!(access.is_public && access.is_static && access.is_final);
		assert_eq!(u16::from(access), raw);
	}

	#[test]
	fn field_descriptor_rejects_garbage() {
		assert!(FieldDescriptor::new("I").is_ok());
		assert!(FieldDescriptor::new("(I)V").is_err());
	}
}
