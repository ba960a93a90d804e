//! Parses the typed directive a transformer member's annotations describe, from the raw
//! `(descriptor, values)` pairs `weave-ast::tree::annotation` carries. This is the core's side of
//! the "specific annotation-parsing reflection glue" boundary (§1): it knows the shape of each
//! directive annotation, not how annotations were read off the class file in the first place.

use weave_ast::tree::annotation::{Annotation, ElementValue};
use weave_ast::tree::field::FieldNode;
use weave_ast::tree::method::{MethodDescriptor, MethodNode};
use weave_target::{parse_target, ConstantArg, Shift, Slice, TargetError, TargetKind, TargetSpec};

use crate::annotation_names as names;

/// A `method = "name"` or `method = "name(desc)ret"` pattern naming the target method a directive
/// applies to. Descriptor-less patterns match the first target method with that name.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodPattern {
	pub name: String,
	pub desc: Option<MethodDescriptor>,
}

impl MethodPattern {
	fn parse(raw: &str) -> MethodPattern {
		match raw.split_once('(') {
			Some((name, rest)) => MethodPattern { name: name.to_owned(), desc: MethodDescriptor::new(format!("({rest}")).ok() },
			None => MethodPattern { name: raw.to_owned(), desc: None },
		}
	}

	pub fn matches(&self, method: &MethodNode) -> bool {
		method.name.as_str() == self.name && self.desc.as_ref().map_or(true, |d| d == &method.descriptor)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableSpec {
	pub index: Option<u16>,
	pub name: Option<String>,
	pub load_opcode: Option<String>,
	pub modifiable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InjectSpec {
	pub method: MethodPattern,
	pub target: TargetSpec,
	pub cancellable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedirectSpec {
	pub method: MethodPattern,
	pub target: TargetSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifyConstantSpec {
	pub method: MethodPattern,
	pub constant: ConstantArg,
	pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WrapCatchSpec {
	pub method: MethodPattern,
	pub target: TargetSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverrideSpec {
	pub method: MethodPattern,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowSpec {
	/// The target-side name, if it differs from the transformer member's own name.
	pub target_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeSpec {
	pub method: MethodPattern,
}

/// The directive a transformer method carries, if any. `Shadow` also applies to fields (handled
/// separately by `shadow_directive_for_field`, since fields can't carry `Inject`/`Redirect`/...).
#[derive(Debug, Clone, PartialEq)]
pub enum MethodDirective {
	Inject(InjectSpec),
	Redirect(RedirectSpec),
	ModifyConstant(ModifyConstantSpec),
	WrapCatch(WrapCatchSpec),
	Override(OverrideSpec),
	Shadow(ShadowSpec),
	Inline,
	Upgrade(UpgradeSpec),
}

fn find<'a>(annotations: &'a [Annotation], descriptor: &str) -> Option<&'a Annotation> {
	annotations.iter().find(|a| a.is(descriptor))
}

fn str_of(ann: &Annotation, key: &str, default: &str) -> String {
	ann.get(key).and_then(ElementValue::as_str).unwrap_or(default).to_owned()
}

fn bool_of(ann: &Annotation, key: &str) -> bool {
	ann.get(key).and_then(ElementValue::as_bool).unwrap_or(false)
}

fn parse_shift(raw: &str) -> Result<Shift, TargetError> {
	match raw.to_ascii_uppercase().as_str() {
		"BEFORE" | "" => Ok(Shift::Before),
		"AFTER" => Ok(Shift::After),
		other => Err(TargetError::InvalidTarget { arg: other.to_owned(), reason: "shift must be BEFORE or AFTER".to_owned() }),
	}
}

/// Parses a nested `@CTarget` annotation into a full [`TargetSpec`], including its optional
/// nested `@CSlice(from = @CTarget(...), to = @CTarget(...))`.
pub fn parse_target_spec(ann: &Annotation) -> Result<TargetSpec, TargetError> {
	let kind_name = str_of(ann, "value", "HEAD");
	let arg = str_of(ann, "target", "");
	let kind = parse_target(&kind_name, &arg)?;

	let mut spec = TargetSpec::new(kind).with_shift(parse_shift(&str_of(ann, "shift", "")).unwrap_or_default());
	if bool_of(ann, "optional") {
		spec = spec.optional();
	}

	if let Some(slice_ann) = ann.get("slice").and_then(ElementValue::as_annotation) {
		let from = slice_ann.get("from").and_then(ElementValue::as_annotation).map(parse_target_kind).transpose()?;
		let to = slice_ann.get("to").and_then(ElementValue::as_annotation).map(parse_target_kind).transpose()?;
		if let (Some(from), Some(to)) = (from, to) {
			spec = spec.with_slice(Slice { from, to });
		}
	}

	Ok(spec)
}

fn parse_target_kind(ann: &Annotation) -> Result<TargetKind, TargetError> {
	Ok(parse_target_spec(ann)?.kind)
}

fn parse_constant_value(ann: &Annotation) -> Result<ConstantArg, TargetError> {
	if let Some(v) = ann.get("intValue").and_then(ElementValue::as_int) {
		return Ok(ConstantArg::Int(v));
	}
	if let Some(ElementValue::Long(v)) = ann.get("longValue") {
		return Ok(ConstantArg::Long(*v));
	}
	if let Some(ElementValue::Float(v)) = ann.get("floatValue") {
		return Ok(ConstantArg::Float(*v));
	}
	if let Some(ElementValue::Double(v)) = ann.get("doubleValue") {
		return Ok(ConstantArg::Double(*v));
	}
	if let Some(v) = ann.get("stringValue").and_then(ElementValue::as_str) {
		return Ok(ConstantArg::String(v.to_owned()));
	}
	Err(TargetError::InvalidTarget { arg: "@CConstant".to_owned(), reason: "no recognized value element".to_owned() })
}

/// Reads the directive off a transformer method's annotations, if it carries one the core
/// recognizes. Returns `Ok(None)` for plain helper methods with no directive at all.
pub fn method_directive(method: &MethodNode) -> Result<Option<MethodDirective>, TargetError> {
	let all: Vec<&Annotation> = method.visible_annotations.iter().chain(method.invisible_annotations.iter()).collect();

	if let Some(ann) = all.iter().find(|a| a.is(names::INJECT)) {
		let target = ann.get("target").and_then(ElementValue::as_annotation).map(parse_target_spec).transpose()?.unwrap_or_else(|| TargetSpec::new(TargetKind::Head));
		return Ok(Some(MethodDirective::Inject(InjectSpec {
			method: MethodPattern::parse(&str_of(ann, "method", "")),
			target,
			cancellable: bool_of(ann, "cancellable"),
		})));
	}
	if let Some(ann) = all.iter().find(|a| a.is(names::REDIRECT)) {
		let target = ann.get("target").and_then(ElementValue::as_annotation).map(parse_target_spec).transpose()?.ok_or_else(|| {
			TargetError::InvalidTarget { arg: "@CRedirect".to_owned(), reason: "missing `target`".to_owned() }
		})?;
		return Ok(Some(MethodDirective::Redirect(RedirectSpec { method: MethodPattern::parse(&str_of(ann, "method", "")), target })));
	}
	if let Some(ann) = all.iter().find(|a| a.is(names::MODIFY_CONSTANT)) {
		let constant_ann = ann.get("constant").and_then(ElementValue::as_annotation).ok_or_else(|| {
			TargetError::InvalidTarget { arg: "@CModifyConstant".to_owned(), reason: "missing `constant`".to_owned() }
		})?;
		return Ok(Some(MethodDirective::ModifyConstant(ModifyConstantSpec {
			method: MethodPattern::parse(&str_of(ann, "method", "")),
			constant: parse_constant_value(constant_ann)?,
			optional: bool_of(ann, "optional"),
		})));
	}
	if let Some(ann) = all.iter().find(|a| a.is(names::WRAP_CATCH)) {
		let target = ann
			.get("target")
			.and_then(ElementValue::as_annotation)
			.map(parse_target_spec)
			.transpose()?
			.unwrap_or_else(|| TargetSpec::new(TargetKind::Head));
		return Ok(Some(MethodDirective::WrapCatch(WrapCatchSpec { method: MethodPattern::parse(&str_of(ann, "method", "")), target })));
	}
	if let Some(ann) = all.iter().find(|a| a.is(names::OVERRIDE)) {
		let raw = str_of(ann, "method", "");
		let method = if raw.is_empty() { MethodPattern { name: method.name.as_str().to_owned(), desc: Some(method.descriptor.clone()) } } else { MethodPattern::parse(&raw) };
		return Ok(Some(MethodDirective::Override(OverrideSpec { method })));
	}
	if let Some(ann) = all.iter().find(|a| a.is(names::SHADOW)) {
		return Ok(Some(MethodDirective::Shadow(ShadowSpec { target_name: ann.get("method").and_then(ElementValue::as_str).map(str::to_owned) })));
	}
	if all.iter().any(|a| a.is(names::INLINE)) {
		return Ok(Some(MethodDirective::Inline));
	}
	if let Some(ann) = all.iter().find(|a| a.is(names::UPGRADE)) {
		let raw = str_of(ann, "method", "");
		let method = if raw.is_empty() { MethodPattern { name: method.name.as_str().to_owned(), desc: Some(method.descriptor.clone()) } } else { MethodPattern::parse(&raw) };
		return Ok(Some(MethodDirective::Upgrade(UpgradeSpec { method })));
	}

	Ok(None)
}

pub fn shadow_directive_for_field(field: &FieldNode) -> Option<ShadowSpec> {
	let ann = find(&field.visible_annotations, names::SHADOW).or_else(|| find(&field.invisible_annotations, names::SHADOW))?;
	Some(ShadowSpec { target_name: ann.get("name").and_then(ElementValue::as_str).map(str::to_owned) })
}

/// Reads the `@CLocalVariable` off parameter `index` of an `@Inject` transformer method, if any.
pub fn local_variable_spec(method: &MethodNode, index: usize) -> Option<LocalVariableSpec> {
	let ann = method.annotations_for_param(index).iter().find(|a| a.is(names::LOCAL_VARIABLE))?;
	Some(LocalVariableSpec {
		index: ann.get("index").and_then(ElementValue::as_int).map(|i| i as u16),
		name: ann.get("name").and_then(ElementValue::as_str).map(str::to_owned),
		load_opcode: ann.get("loadOpcode").and_then(ElementValue::as_str).map(str::to_owned),
		modifiable: bool_of(ann, "modifiable"),
	})
}

/// The target class names a `@CMixin` class-level annotation names, as raw internal names
/// (`Type`-typed targets are pre-remapped into plain names by the time this runs — see
/// `weave-registry::pipeline`).
pub fn mixin_targets(annotations: &[Annotation]) -> Vec<String> {
	let Some(ann) = find(annotations, names::MIXIN) else { return Vec::new() };
	match ann.get("value") {
		Some(ElementValue::Array(items)) => items.iter().filter_map(|v| v.as_str().map(str::to_owned).or_else(|| v.as_class().map(|c| c.as_str().to_owned()))).collect(),
		Some(v) => v.as_str().map(str::to_owned).or_else(|| v.as_class().map(|c| c.as_str().to_owned())).into_iter().collect(),
		None => Vec::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use weave_ast::tree::method::{MethodAccess, MethodName};

	fn sample_method() -> MethodNode {
		MethodNode::new(MethodAccess::default(), MethodName::from("hook"), MethodDescriptor::from("()V"))
	}

	#[test]
	fn method_pattern_parses_name_only_and_name_with_desc() {
		assert_eq!(MethodPattern::parse("add"), MethodPattern { name: "add".to_owned(), desc: None });
		let with_desc = MethodPattern::parse("add(II)I");
		assert_eq!(with_desc.desc.unwrap().as_str(), "(II)I");
	}

	#[test]
	fn parses_inject_directive_with_head_target() {
		let mut method = sample_method();
		let target_ann = Annotation::new(names::TARGET).with("value", ElementValue::String("HEAD".to_owned()));
		let ann = Annotation::new(names::INJECT)
			.with("method", ElementValue::String("add".to_owned()))
			.with("target", ElementValue::Annotation(Box::new(target_ann)));
		method.visible_annotations.push(ann);

		match method_directive(&method).unwrap() {
			Some(MethodDirective::Inject(spec)) => {
				assert_eq!(spec.method.name, "add");
				assert_eq!(spec.target.kind, TargetKind::Head);
				assert!(!spec.cancellable);
			}
			other => panic!("expected Inject, got {other:?}"),
		}
	}

	#[test]
	fn parses_redirect_directive_with_invoke_target() {
		let mut method = sample_method();
		let target_ann = Annotation::new(names::TARGET)
			.with("value", ElementValue::String("INVOKE".to_owned()))
			.with("target", ElementValue::String("Ljava/lang/String;toUpperCase()Ljava/lang/String;".to_owned()));
		let ann = Annotation::new(names::REDIRECT)
			.with("method", ElementValue::String("f".to_owned()))
			.with("target", ElementValue::Annotation(Box::new(target_ann)));
		method.visible_annotations.push(ann);

		match method_directive(&method).unwrap() {
			Some(MethodDirective::Redirect(spec)) => assert!(matches!(spec.target.kind, TargetKind::Invoke { .. })),
			other => panic!("expected Redirect, got {other:?}"),
		}
	}

	#[test]
	fn parses_modify_constant_directive() {
		let mut method = sample_method();
		let constant_ann = Annotation::new(names::CONSTANT).with("intValue", ElementValue::Int(5));
		let ann = Annotation::new(names::MODIFY_CONSTANT)
			.with("method", ElementValue::String("f".to_owned()))
			.with("constant", ElementValue::Annotation(Box::new(constant_ann)));
		method.visible_annotations.push(ann);

		match method_directive(&method).unwrap() {
			Some(MethodDirective::ModifyConstant(spec)) => assert_eq!(spec.constant, ConstantArg::Int(5)),
			other => panic!("expected ModifyConstant, got {other:?}"),
		}
	}

	#[test]
	fn no_directive_returns_none() {
		let method = sample_method();
		assert_eq!(method_directive(&method).unwrap(), None);
	}
}
