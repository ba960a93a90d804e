//! Step 5 of §4.2: `@COverride` copies a transformer method's body over a matching target
//! method, preserving the target's original body under a renamed alias so other members that
//! still call it by its old name (e.g. a later `Upgrade` or hand-written super-call convention)
//! keep working.

use weave_ast::tree::method::{MethodName, MethodNode};

use crate::context::HandlerCtx;
use crate::directive::{method_directive, MethodDirective};
use crate::error::WeaveError;

pub fn apply(ctx: &mut HandlerCtx) -> Result<(), WeaveError> {
	let mut consumed = Vec::new();

	for i in 0..ctx.transformer.methods.len() {
		let method = &ctx.transformer.methods[i];
		let directive = method_directive(method).map_err(|e| WeaveError::Target {
			transformer: ctx.transformer.name.clone(),
			method: method.name.clone(),
			desc: method.descriptor.clone(),
			source: e,
		})?;
		let Some(MethodDirective::Override(spec)) = directive else { continue };

		let target_name = spec.method.name.clone();
		let target_desc = spec.method.desc.clone().unwrap_or_else(|| method.descriptor.clone());

		let original_index = ctx
			.target
			.methods
			.iter()
			.position(|m| m.name.as_str() == target_name && m.descriptor == target_desc)
			.ok_or_else(|| WeaveError::shape(&ctx.transformer.name, &method.name, &method.descriptor, format!("@COverride target method {target_name}{target_desc} not found"), "check the `method` pattern"))?;

		if method.descriptor != ctx.target.methods[original_index].descriptor {
			return Err(WeaveError::shape(
				&ctx.transformer.name,
				&method.name,
				&method.descriptor,
				"@COverride method's descriptor does not match the target method it overrides",
				"give the override method the exact same descriptor as its target",
			));
		}

		let alias_name = ctx.target.fresh_member_name(&format!("{target_name}$original"));
		let mut alias = ctx.target.methods[original_index].clone();
		alias.name = MethodName::from(alias_name.as_str());
		ctx.target.methods.push(alias);

		let original: &mut MethodNode = &mut ctx.target.methods[original_index];
		original.code = method.code.clone();
		original.exceptions = method.exceptions.clone();

		consumed.push(i);
	}

	for i in consumed.into_iter().rev() {
		ctx.transformer.methods.remove(i);
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::IdentifierMap;
	use weave_ast::tree::annotation::Annotation;
	use weave_ast::tree::class::{ClassAccess, ClassName};
	use weave_ast::tree::code::{Code, Instruction};
	use weave_ast::tree::method::{MethodAccess, MethodDescriptor};
	use weave_ast::ClassNode;

	#[test]
	fn overrides_target_method_and_preserves_original_under_alias() {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		let mut original = MethodNode::new(MethodAccess::default(), MethodName::from("f"), MethodDescriptor::from("()I"));
		original.code = Some(Code::new(1, 1));
		original.code.as_mut().unwrap().instructions.push(Instruction::IntPush(1));
		target.methods.push(original);

		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		let mut override_method = MethodNode::new(MethodAccess::default(), MethodName::from("f"), MethodDescriptor::from("()I"));
		override_method.code = Some(Code::new(1, 1));
		override_method.code.as_mut().unwrap().instructions.push(Instruction::IntPush(2));
		override_method.visible_annotations.push(Annotation::new(crate::annotation_names::OVERRIDE));
		transformer.methods.push(override_method);

		let mut id_map = IdentifierMap::default();
		apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map }).unwrap();

		assert!(transformer.methods.is_empty());
		let replaced = target.find_method("f", "()I").unwrap();
		assert_eq!(replaced.code.as_ref().unwrap().instructions, vec![Instruction::IntPush(2)]);
		let alias = target.methods.iter().find(|m| m.name.as_str() == "f$original").unwrap();
		assert_eq!(alias.code.as_ref().unwrap().instructions, vec![Instruction::IntPush(1)]);
	}
}
