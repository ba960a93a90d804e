use std::iter::Peekable;
use std::str::Chars;
use anyhow::{anyhow, bail, Context, Result};
use crate::tree::class::ClassName;

/// A JVM type, as it appears in a field descriptor or as one argument / the return type of a
/// method descriptor.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Type {
	B, C, D, F, I, J, S, Z,
	Object(ClassName),
	Array(u8, Box<Type>),
	/// Only valid as a method return type.
	Void,
}

impl Type {
	/// Operand stack / local variable slot width: `long` and `double` take two slots, everything
	/// else takes one. `void` has no width (it never occupies a slot).
	pub fn width(&self) -> u8 {
		match self {
			Type::J | Type::D => 2,
			Type::Void => 0,
			_ => 1,
		}
	}

	pub fn is_primitive(&self) -> bool {
		matches!(self, Type::B | Type::C | Type::D | Type::F | Type::I | Type::J | Type::S | Type::Z)
	}

	pub fn is_reference(&self) -> bool {
		matches!(self, Type::Object(_) | Type::Array(_, _))
	}

	/// The `xLOAD`/`xSTORE`/`xRETURN`/`xALOAD` instruction family selector for this type: one of
	/// `I`, `L` (long), `F`, `D`, `A` (reference). Used throughout `weave-handlers` to pick the
	/// right opcode for a given slot's type without repeating the match everywhere.
	pub fn op_category(&self) -> OpCategory {
		match self {
			Type::I | Type::Z | Type::B | Type::C | Type::S => OpCategory::Int,
			Type::J => OpCategory::Long,
			Type::F => OpCategory::Float,
			Type::D => OpCategory::Double,
			Type::Object(_) | Type::Array(_, _) => OpCategory::Ref,
			Type::Void => OpCategory::Void,
		}
	}

	/// The boxed wrapper class for a primitive type (`int` -> `java/lang/Integer`, ...). Reference
	/// types box to themselves (no-op).
	pub fn boxed_class(&self) -> ClassName {
		ClassName::from(match self {
			Type::B => "java/lang/Byte",
			Type::C => "java/lang/Character",
			Type::D => "java/lang/Double",
			Type::F => "java/lang/Float",
			Type::I => "java/lang/Integer",
			Type::J => "java/lang/Long",
			Type::S => "java/lang/Short",
			Type::Z => "java/lang/Boolean",
			Type::Object(c) => return c.clone(),
			Type::Array(_, _) => return ClassName::from("java/lang/Object"),
			Type::Void => return ClassName::from("java/lang/Void"),
		})
	}

	pub fn descriptor_string(&self) -> String {
		match self {
			Type::B => "B".to_owned(),
			Type::C => "C".to_owned(),
			Type::D => "D".to_owned(),
			Type::F => "F".to_owned(),
			Type::I => "I".to_owned(),
			Type::J => "J".to_owned(),
			Type::S => "S".to_owned(),
			Type::Z => "Z".to_owned(),
			Type::Void => "V".to_owned(),
			Type::Object(c) => format!("L{};", c.as_str()),
			Type::Array(dims, inner) => format!("{}{}", "[".repeat(*dims as usize), inner.descriptor_string()),
		}
	}
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpCategory { Int, Long, Float, Double, Ref, Void }

fn read_field_type(chars: &mut Peekable<Chars>) -> Result<Type> {
	match chars.next().ok_or_else(|| anyhow!("unexpected end of descriptor"))? {
		'B' => Ok(Type::B),
		'C' => Ok(Type::C),
		'D' => Ok(Type::D),
		'F' => Ok(Type::F),
		'I' => Ok(Type::I),
		'J' => Ok(Type::J),
		'S' => Ok(Type::S),
		'Z' => Ok(Type::Z),
		'L' => {
			let mut name = String::new();
			for ch in chars.by_ref() {
				if ch == ';' {
					return Ok(Type::Object(ClassName::new(name).context("class name inside descriptor")?));
				}
				name.push(ch);
			}
			bail!("unterminated object type (missing `;`)")
		}
		'[' => {
			let mut dims = 1u8;
			while chars.peek() == Some(&'[') {
				chars.next();
				dims += 1;
			}
			Ok(Type::Array(dims, Box::new(read_field_type(chars)?)))
		}
		other => bail!("unexpected character {other:?} in descriptor"),
	}
}

pub fn parse_field_descriptor(desc: &str) -> Result<Type> {
	let mut chars = desc.chars().peekable();
	let ty = read_field_type(&mut chars).with_context(|| anyhow!("parsing field descriptor {desc:?}"))?;
	if chars.next().is_some() {
		bail!("trailing characters after field descriptor {desc:?}");
	}
	Ok(ty)
}

/// Parses a method descriptor `(ArgTypes)ReturnType` into its argument types and return type.
pub fn parse_method_descriptor(desc: &str) -> Result<(Vec<Type>, Type)> {
	let mut chars = desc.chars().peekable();
	if chars.next() != Some('(') {
		bail!("method descriptor {desc:?} must start with `(`");
	}
	let mut args = Vec::new();
	while chars.peek() != Some(&')') {
		args.push(read_field_type(&mut chars).with_context(|| anyhow!("parsing method descriptor {desc:?}"))?);
	}
	chars.next(); // consume ')'
	let ret = match chars.peek() {
		Some('V') => { chars.next(); Type::Void }
		_ => read_field_type(&mut chars).with_context(|| anyhow!("parsing return type of {desc:?}"))?,
	};
	if chars.next().is_some() {
		bail!("trailing characters after method descriptor {desc:?}");
	}
	Ok((args, ret))
}

/// The number of local variable slots occupied by a run of argument types, as used when laying
/// out parameters starting at slot 0 (plus 1 if the method is an instance method, for `this`).
pub fn args_width(args: &[Type]) -> u16 {
	args.iter().map(|t| t.width() as u16).sum()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_primitives_and_arrays() {
		assert_eq!(parse_field_descriptor("I").unwrap(), Type::I);
		assert_eq!(parse_field_descriptor("[[D").unwrap(), Type::Array(2, Box::new(Type::D)));
		assert_eq!(parse_field_descriptor("Ljava/lang/String;").unwrap(), Type::Object(ClassName::from("java/lang/String")));
	}

	#[test]
	fn parses_method_descriptor() {
		let (args, ret) = parse_method_descriptor("(ILjava/lang/String;[D)Z").unwrap();
		assert_eq!(args, vec![Type::I, Type::Object(ClassName::from("java/lang/String")), Type::Array(1, Box::new(Type::D))]);
		assert_eq!(ret, Type::Z);
	}

	#[test]
	fn void_return_and_no_args() {
		let (args, ret) = parse_method_descriptor("()V").unwrap();
		assert!(args.is_empty());
		assert_eq!(ret, Type::Void);
	}

	#[test]
	fn rejects_trailing_garbage() {
		assert!(parse_field_descriptor("II").is_err());
		assert!(parse_method_descriptor("(I)VV").is_err());
	}

	#[test]
	fn widths() {
		assert_eq!(Type::J.width(), 2);
		assert_eq!(Type::D.width(), 2);
		assert_eq!(Type::I.width(), 1);
		assert_eq!(Type::Void.width(), 0);
		assert_eq!(args_width(&[Type::I, Type::J, Type::Z]), 4);
	}

	#[test]
	fn descriptor_roundtrip() {
		let ty = Type::Array(2, Box::new(Type::Object(ClassName::from("java/lang/String"))));
		assert_eq!(ty.descriptor_string(), "[[Ljava/lang/String;");
		assert_eq!(parse_field_descriptor(&ty.descriptor_string()).unwrap(), ty);
	}
}
