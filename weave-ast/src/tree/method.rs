use std::fmt::{Debug, Display, Formatter};
use anyhow::{bail, Context, Result};
use crate::tree::annotation::Annotation;
use crate::tree::class::ClassName;
use crate::tree::code::Code;
use crate::tree::descriptor::{self, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct MethodNode {
	pub access: MethodAccess,
	pub name: MethodName,
	pub descriptor: MethodDescriptor,

	pub code: Option<Code>,
	pub exceptions: Vec<ClassName>,

	pub visible_annotations: Vec<Annotation>,
	pub invisible_annotations: Vec<Annotation>,
	/// One annotation list per formal parameter, in descriptor order. `weave-handlers` reads
	/// these for `@CLocalVariable`-tagged trailing parameters on `@Inject` methods.
	pub parameter_annotations: Vec<Vec<Annotation>>,
}

impl MethodNode {
	pub fn new(access: MethodAccess, name: MethodName, descriptor: MethodDescriptor) -> MethodNode {
		MethodNode {
			access,
			name,
			descriptor,
			code: None,
			exceptions: Vec::new(),
			visible_annotations: Vec::new(),
			invisible_annotations: Vec::new(),
			parameter_annotations: Vec::new(),
		}
	}

	/// The annotations on parameter `index`, or an empty slice if the method carries no
	/// parameter-annotation entry for it (parameter annotation lists are sparse: absent is the
	/// common case).
	pub fn annotations_for_param(&self, index: usize) -> &[Annotation] {
		self.parameter_annotations.get(index).map_or(&[], |v| v.as_slice())
	}

	pub fn as_name_and_desc(&self) -> MethodNameAndDesc {
		MethodNameAndDesc { name: self.name.clone(), desc: self.descriptor.clone() }
	}

	pub fn as_ref(&self, owner: ClassName) -> MethodRef {
		MethodRef { class: owner, name: self.name.clone(), desc: self.descriptor.clone() }
	}

	pub fn args(&self) -> Vec<Type> {
		self.descriptor.parse().expect("method descriptor was validated at construction").0
	}

	pub fn return_type(&self) -> Type {
		self.descriptor.parse().expect("method descriptor was validated at construction").1
	}

	/// Local variable slot of the first argument: `1` for an instance method (slot `0` is
	/// `this`), `0` for a static method.
	pub fn first_arg_slot(&self) -> u16 {
		if self.access.is_static { 0 } else { 1 }
	}

	pub fn code_mut(&mut self) -> Result<&mut Code> {
		self.code.as_mut().with_context(|| anyhow::anyhow!("method {} {} has no code (abstract or native)", self.name, self.descriptor))
	}
}

#[derive(Copy, Clone, Hash, Eq, PartialEq, Default)]
pub struct MethodAccess {
	pub is_public: bool,
	pub is_private: bool,
	pub is_protected: bool,
	pub is_static: bool,
	pub is_final: bool,
	pub is_synchronized: bool,
	pub is_bridge: bool,
	pub is_varargs: bool,
	pub is_native: bool,
	pub is_abstract: bool,
	pub is_synthetic: bool,
}

impl Debug for MethodAccess {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("MethodAccess { ")?;
		if self.is_public       { f.write_str("public ")?; }
		if self.is_private      { f.write_str("private ")?; }
		if self.is_protected    { f.write_str("protected ")?; }
		if self.is_static       { f.write_str("static ")?; }
		if self.is_final        { f.write_str("final ")?; }
		if self.is_synchronized { f.write_str("synchronized ")?; }
		if self.is_bridge       { f.write_str("bridge ")?; }
		if self.is_varargs      { f.write_str("varargs ")?; }
		if self.is_native       { f.write_str("native ")?; }
		if self.is_abstract     { f.write_str("abstract ")?; }
		if self.is_synthetic    { f.write_str("synthetic ")?; }
		f.write_str("}")
	}
}

impl From<u16> for MethodAccess {
	fn from(value: u16) -> Self {
		MethodAccess {
			is_public:       value & 0x0001 != 0,
			is_private:      value & 0x0002 != 0,
			is_protected:    value & 0x0004 != 0,
			is_static:       value & 0x0008 != 0,
			is_final:        value & 0x0010 != 0,
			is_synchronized: value & 0x0020 != 0,
			is_bridge:       value & 0x0040 != 0,
			is_varargs:      value & 0x0080 != 0,
			is_native:       value & 0x0100 != 0,
			is_abstract:     value & 0x0400 != 0,
			is_synthetic:    value & 0x1000 != 0,
		}
	}
}

impl From<MethodAccess> for u16 {
	fn from(value: MethodAccess) -> Self {
		(if value.is_public       { 0x0001 } else { 0 }) |
		(if value.is_private      { 0x0002 } else { 0 }) |
		(if value.is_protected    { 0x0004 } else { 0 }) |
		(if value.is_static       { 0x0008 } else { 0 }) |
		(if value.is_final        { 0x0010 } else { 0 }) |
		(if value.is_synchronized { 0x0020 } else { 0 }) |
		(if value.is_bridge       { 0x0040 } else { 0 }) |
		(if value.is_varargs      { 0x0080 } else { 0 }) |
		(if value.is_native       { 0x0100 } else { 0 }) |
		(if value.is_abstract     { 0x0400 } else { 0 }) |
		(if value.is_synthetic    { 0x1000 } else { 0 })
	}
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MethodName(String);

impl MethodName {
	pub fn new(s: impl Into<String>) -> Result<MethodName> {
		let s = s.into();
		if crate::tree::names::is_valid_method_name(&s) {
			Ok(MethodName(s))
		} else {
			bail!("invalid method name {s:?}")
		}
	}

	pub fn as_str(&self) -> &str { &self.0 }
	pub fn is_constructor(&self) -> bool { self.0 == "<init>" }
}

impl From<&str> for MethodName {
	fn from(value: &str) -> Self { MethodName::new(value).expect("well-formed method name literal") }
}

impl Display for MethodName {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MethodDescriptor(String);

impl MethodDescriptor {
	pub fn new(s: impl Into<String>) -> Result<MethodDescriptor> {
		let s = s.into();
		let _ = descriptor::parse_method_descriptor(&s)?;
		Ok(MethodDescriptor(s))
	}

	pub fn as_str(&self) -> &str { &self.0 }

	pub fn parse(&self) -> Result<(Vec<Type>, Type)> {
		descriptor::parse_method_descriptor(&self.0)
	}

	/// Builds a descriptor string `(args)ret` without validating the pieces again (they're
	/// already-parsed [`Type`]s).
	pub fn from_parts(args: &[Type], ret: &Type) -> MethodDescriptor {
		let mut s = String::from("(");
		for a in args {
			s.push_str(&a.descriptor_string());
		}
		s.push(')');
		s.push_str(&ret.descriptor_string());
		MethodDescriptor(s)
	}
}

impl From<&str> for MethodDescriptor {
	fn from(value: &str) -> Self { MethodDescriptor::new(value).expect("well-formed method descriptor literal") }
}

impl Display for MethodDescriptor {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MethodRef {
	pub class: ClassName,
	pub name: MethodName,
	pub desc: MethodDescriptor,
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MethodNameAndDesc {
	pub name: MethodName,
	pub desc: MethodDescriptor,
}

impl MethodNameAndDesc {
	pub fn with_class(self, class: ClassName) -> MethodRef {
		MethodRef { class, name: self.name, desc: self.desc }
	}
}
