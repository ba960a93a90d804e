use crate::error::TargetError;
use crate::kind::{ConstantArg, TargetKind};
use weave_ast::tree::class::ClassName;
use weave_ast::tree::field::{FieldDescriptor, FieldName};
use weave_ast::tree::method::{MethodDescriptor, MethodName};

fn invalid(arg: &str, reason: impl Into<String>) -> TargetError {
	TargetError::InvalidTarget { arg: arg.to_owned(), reason: reason.into() }
}

/// Splits `Lowner;rest` into `(owner, rest)`. Also accepts the alternate `owner.` form (a bare,
/// unbracketed internal name followed by `.`) the spec mentions for `INVOKE`.
fn split_owner<'a>(arg: &'a str) -> Result<(&'a str, &'a str), TargetError> {
	if let Some(rest) = arg.strip_prefix('L') {
		rest.split_once(';').ok_or_else(|| invalid(arg, "missing `;` terminating owner class name"))
	} else {
		arg.split_once('.').ok_or_else(|| invalid(arg, "expected `Lowner;...` or `owner....`"))
	}
}

/// Parses `name(desc)returnDesc` or `name desc` (space-separated alternate form) into
/// `(name, descriptor)`.
fn split_member<'a>(arg: &'a str, rest: &'a str) -> Result<(&'a str, &'a str), TargetError> {
	if let Some(paren) = rest.find('(') {
		Ok((rest[..paren].trim_end(), &rest[paren..]))
	} else if let Some((name, desc)) = rest.split_once(' ') {
		Ok((name, desc))
	} else {
		Err(invalid(arg, "expected `name(desc)ret` or `name desc`"))
	}
}

pub fn parse_invoke(arg: &str) -> Result<TargetKind, TargetError> {
	let (owner, rest) = split_owner(arg)?;
	let (name, desc) = split_member(arg, rest)?;
	Ok(TargetKind::Invoke {
		owner: ClassName::new(owner).map_err(|e| invalid(arg, e.to_string()))?,
		name: MethodName::new(name).map_err(|e| invalid(arg, e.to_string()))?,
		desc: MethodDescriptor::new(desc).map_err(|e| invalid(arg, e.to_string()))?,
	})
}

/// Parses `Lowner;name:desc` (`:desc` optional — absent means "match any descriptor").
fn parse_field_triple(arg: &str) -> Result<(ClassName, FieldName, Option<FieldDescriptor>), TargetError> {
	let (owner, rest) = split_owner(arg)?;
	let (name, desc) = match rest.split_once(':') {
		Some((name, desc)) if !desc.is_empty() => {
			(name, Some(FieldDescriptor::new(desc).map_err(|e| invalid(arg, e.to_string()))?))
		}
		Some((name, _)) => (name, None),
		None => (rest, None),
	};
	Ok((
		ClassName::new(owner).map_err(|e| invalid(arg, e.to_string()))?,
		FieldName::new(name).map_err(|e| invalid(arg, e.to_string()))?,
		desc,
	))
}

pub fn parse_field(arg: &str) -> Result<TargetKind, TargetError> {
	let (owner, name, desc) = parse_field_triple(arg)?;
	Ok(TargetKind::Field { owner, name, desc })
}

pub fn parse_get_field(arg: &str) -> Result<TargetKind, TargetError> {
	let (owner, name, desc) = parse_field_triple(arg)?;
	Ok(TargetKind::GetField { owner, name, desc })
}

pub fn parse_put_field(arg: &str) -> Result<TargetKind, TargetError> {
	let (owner, name, desc) = parse_field_triple(arg)?;
	Ok(TargetKind::PutField { owner, name, desc })
}

pub fn parse_new(arg: &str) -> Result<TargetKind, TargetError> {
	let owner = arg.strip_prefix('L').and_then(|s| s.strip_suffix(';')).unwrap_or(arg);
	Ok(TargetKind::New { owner: ClassName::new(owner).map_err(|e| invalid(arg, e.to_string()))? })
}

pub fn parse_opcode(arg: &str) -> Result<TargetKind, TargetError> {
	if arg.is_empty() {
		return Err(invalid(arg, "empty opcode"));
	}
	Ok(TargetKind::Opcode(arg.to_owned()))
}

/// Parses an int/long/float/double/string literal for a `CONSTANT` directive. Suffix rules match
/// Java literal syntax: trailing `L`/`l` for long, `F`/`f` for float, `D`/`d` for double,
/// surrounding `"..."` for string; anything else is tried as a plain `i32`.
pub fn parse_constant(arg: &str) -> Result<TargetKind, TargetError> {
	if let Some(inner) = arg.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
		return Ok(TargetKind::Constant(ConstantArg::String(inner.to_owned())));
	}
	if let Some(body) = arg.strip_suffix(['L', 'l']) {
		return body.parse::<i64>().map(|v| TargetKind::Constant(ConstantArg::Long(v))).map_err(|e| invalid(arg, e.to_string()));
	}
	if let Some(body) = arg.strip_suffix(['F', 'f']) {
		return body.parse::<f32>().map(|v| TargetKind::Constant(ConstantArg::Float(v))).map_err(|e| invalid(arg, e.to_string()));
	}
	if let Some(body) = arg.strip_suffix(['D', 'd']) {
		if let Ok(v) = body.parse::<f64>() {
			return Ok(TargetKind::Constant(ConstantArg::Double(v)));
		}
	}
	arg.parse::<i32>().map(|v| TargetKind::Constant(ConstantArg::Int(v))).map_err(|e| invalid(arg, e.to_string()))
}

/// Dispatches on the directive's target kind name (`"HEAD"`, `"INVOKE"`, ...) and parses `arg`
/// (empty for the argument-less kinds) into a [`TargetKind`].
pub fn parse_target(kind_name: &str, arg: &str) -> Result<TargetKind, TargetError> {
	match kind_name.to_ascii_uppercase().as_str() {
		"HEAD" => Ok(TargetKind::Head),
		"RETURN" => Ok(TargetKind::Return),
		"TAIL" => Ok(TargetKind::Tail),
		"THROW" => Ok(TargetKind::Throw),
		"INVOKE" => parse_invoke(arg),
		"FIELD" => parse_field(arg),
		"GETFIELD" => parse_get_field(arg),
		"PUTFIELD" => parse_put_field(arg),
		"NEW" => parse_new(arg),
		"OPCODE" => parse_opcode(arg),
		"CONSTANT" => parse_constant(arg),
		other => Err(invalid(arg, format!("unknown target kind {other:?}"))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_invoke_bracket_form() {
		let kind = parse_invoke("Ljava/lang/String;toUpperCase()Ljava/lang/String;").unwrap();
		assert_eq!(kind, TargetKind::Invoke {
			owner: ClassName::from("java/lang/String"),
			name: MethodName::from("toUpperCase"),
			desc: MethodDescriptor::from("()Ljava/lang/String;"),
		});
	}

	#[test]
	fn parses_invoke_dotted_form() {
		let kind = parse_invoke("java/lang/String.toUpperCase ()Ljava/lang/String;").unwrap();
		assert_eq!(kind, TargetKind::Invoke {
			owner: ClassName::from("java/lang/String"),
			name: MethodName::from("toUpperCase"),
			desc: MethodDescriptor::from("()Ljava/lang/String;"),
		});
	}

	#[test]
	fn parses_field_with_and_without_descriptor() {
		let with_desc = parse_field("Lpkg/C;x:I").unwrap();
		assert_eq!(with_desc, TargetKind::Field { owner: ClassName::from("pkg/C"), name: FieldName::from("x"), desc: Some(FieldDescriptor::from("I")) });

		let without_desc = parse_field("Lpkg/C;x").unwrap();
		assert_eq!(without_desc, TargetKind::Field { owner: ClassName::from("pkg/C"), name: FieldName::from("x"), desc: None });
	}

	#[test]
	fn parses_new_target() {
		assert_eq!(parse_new("Lpkg/C;").unwrap(), TargetKind::New { owner: ClassName::from("pkg/C") });
	}

	#[test]
	fn parses_constant_literals() {
		assert_eq!(parse_constant("5").unwrap(), TargetKind::Constant(ConstantArg::Int(5)));
		assert_eq!(parse_constant("5L").unwrap(), TargetKind::Constant(ConstantArg::Long(5)));
		assert_eq!(parse_constant("5.0F").unwrap(), TargetKind::Constant(ConstantArg::Float(5.0)));
		assert_eq!(parse_constant("\"hi\"").unwrap(), TargetKind::Constant(ConstantArg::String("hi".to_owned())));
	}

	#[test]
	fn rejects_malformed_invoke() {
		assert!(parse_invoke("not-a-target").is_err());
	}

	#[test]
	fn unknown_kind_is_invalid() {
		assert!(parse_target("BOGUS", "").is_err());
	}
}
