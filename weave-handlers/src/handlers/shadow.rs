//! Step 4 of §4.2: for each transformer field/method annotated `@CShadow`, records a
//! `transformerMember -> targetMember` mapping (so later handlers rewriting bodies route
//! references at the old name to the real target member) and strips the transformer-side body —
//! a shadow declaration exists only to be referred to, never to be copied.

use weave_ast::tree::field::FieldNameAndDesc;
use weave_ast::tree::method::{MethodName, MethodNameAndDesc};

use crate::context::HandlerCtx;
use crate::directive::{method_directive, shadow_directive_for_field, MethodDirective};
use crate::error::WeaveError;

pub fn apply(ctx: &mut HandlerCtx) -> Result<(), WeaveError> {
	let mut shadow_method_indices = Vec::new();
	for (i, method) in ctx.transformer.methods.iter().enumerate() {
		if matches!(method_directive(method).map_err(|e| target_error(ctx, method, e))?, Some(MethodDirective::Shadow(_))) {
			shadow_method_indices.push(i);
		}
	}

	for i in shadow_method_indices.into_iter().rev() {
		let method = &ctx.transformer.methods[i];
		let spec = match method_directive(method).ok().flatten() {
			Some(MethodDirective::Shadow(spec)) => spec,
			_ => unreachable!("filtered above"),
		};
		let target_name = spec.target_name.clone().unwrap_or_else(|| method.name.as_str().to_owned());
		let target_method = ctx
			.target
			.find_method(&target_name, method.descriptor.as_str())
			.ok_or_else(|| WeaveError::shape(&ctx.transformer.name, &method.name, &method.descriptor, "@CShadow method not found on target", "check the method name/descriptor or pass an explicit `method = \"...\"`"))?;

		let from = method.as_name_and_desc();
		let to = MethodNameAndDesc { name: MethodName::from(target_name.as_str()), desc: target_method.descriptor.clone() };
		ctx.id_map.map_method(from, to);
		ctx.transformer.methods.remove(i);
	}

	let mut shadow_field_indices = Vec::new();
	for (i, field) in ctx.transformer.fields.iter().enumerate() {
		if shadow_directive_for_field(field).is_some() {
			shadow_field_indices.push(i);
		}
	}
	for i in shadow_field_indices.into_iter().rev() {
		let field = &ctx.transformer.fields[i];
		let spec = shadow_directive_for_field(field).expect("filtered above");
		let target_name = spec.target_name.clone().unwrap_or_else(|| field.name.as_str().to_owned());
		let target_field = ctx.target.find_field(&target_name, field.descriptor.as_str()).ok_or_else(|| {
			WeaveError::fault("Shadow", &ctx.target.name, &ctx.transformer.name, format!("@CShadow field {target_name} not found on target"))
		})?;

		let from = FieldNameAndDesc { name: field.name.clone(), desc: field.descriptor.clone() };
		let to = FieldNameAndDesc { name: target_field.name.clone(), desc: target_field.descriptor.clone() };
		ctx.id_map.map_field(from, to);
		ctx.transformer.fields.remove(i);
	}

	Ok(())
}

fn target_error(ctx: &HandlerCtx, method: &weave_ast::MethodNode, source: weave_target::TargetError) -> WeaveError {
	WeaveError::Target { transformer: ctx.transformer.name.clone(), method: method.name.clone(), desc: method.descriptor.clone(), source }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::IdentifierMap;
	use weave_ast::tree::annotation::Annotation;
	use weave_ast::tree::class::{ClassAccess, ClassName};
	use weave_ast::tree::method::{MethodAccess, MethodDescriptor, MethodNode};
	use weave_ast::ClassNode;

	#[test]
	fn shadow_method_strips_body_and_records_mapping() {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		target.methods.push(MethodNode::new(MethodAccess::default(), MethodName::from("counter"), MethodDescriptor::from("()I")));

		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		let mut shadow_method = MethodNode::new(MethodAccess::default(), MethodName::from("counter"), MethodDescriptor::from("()I"));
		shadow_method.visible_annotations.push(Annotation::new(crate::annotation_names::SHADOW));
		transformer.methods.push(shadow_method);

		let mut id_map = IdentifierMap::default();
		apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map }).unwrap();

		assert!(transformer.methods.is_empty());
		let resolved = id_map.resolve_method(&MethodNameAndDesc { name: MethodName::from("counter"), desc: MethodDescriptor::from("()I") });
		assert_eq!(resolved.name.as_str(), "counter");
	}

	#[test]
	fn shadow_method_missing_on_target_is_a_shape_error() {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		let mut shadow_method = MethodNode::new(MethodAccess::default(), MethodName::from("missing"), MethodDescriptor::from("()I"));
		shadow_method.visible_annotations.push(Annotation::new(crate::annotation_names::SHADOW));
		transformer.methods.push(shadow_method);
		let mut id_map = IdentifierMap::default();

		let result = apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map });
		assert!(matches!(result, Err(WeaveError::TransformerShape { .. })));
	}
}
