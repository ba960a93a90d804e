//! Step 11 of §4.2: `@CUpgrade` moves a transformer method's body wholesale into a matching
//! target method, replacing it outright — unlike `Override` (step 5), it does not preserve the
//! original body under an alias. Consumes the transformer method.

use weave_ast::tree::method::MethodNode;

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
		let Some(MethodDirective::Upgrade(spec)) = directive else { continue };

		let target_name = spec.method.name.clone();
		let target_desc = spec.method.desc.clone().unwrap_or_else(|| method.descriptor.clone());

		let target: &mut MethodNode = ctx
			.target
			.methods
			.iter_mut()
			.find(|m| m.name.as_str() == target_name && m.descriptor == target_desc)
			.ok_or_else(|| WeaveError::shape(&ctx.transformer.name, &method.name, &method.descriptor, format!("@CUpgrade target method {target_name}{target_desc} not found"), "check the `method` pattern"))?;

		if method.descriptor != target.descriptor {
			return Err(WeaveError::shape(
				&ctx.transformer.name,
				&method.name,
				&method.descriptor,
				"@CUpgrade method's descriptor does not match the target method it upgrades",
				"give the upgrade method the exact same descriptor as its target",
			));
		}

		target.code = method.code.clone();
		target.exceptions = method.exceptions.clone();
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
	use weave_ast::tree::method::{MethodAccess, MethodDescriptor, MethodName};
	use weave_ast::ClassNode;

	#[test]
	fn upgrades_target_method_without_preserving_original() {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		let mut original = MethodNode::new(MethodAccess::default(), MethodName::from("f"), MethodDescriptor::from("()I"));
		original.code = Some(Code::new(1, 1));
		original.code.as_mut().unwrap().instructions.push(Instruction::IntPush(1));
		target.methods.push(original);

		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		let mut upgrade_method = MethodNode::new(MethodAccess::default(), MethodName::from("f"), MethodDescriptor::from("()I"));
		upgrade_method.code = Some(Code::new(1, 1));
		upgrade_method.code.as_mut().unwrap().instructions.push(Instruction::IntPush(2));
		upgrade_method.visible_annotations.push(Annotation::new(crate::annotation_names::UPGRADE));
		transformer.methods.push(upgrade_method);

		let mut id_map = IdentifierMap::default();
		apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map }).unwrap();

		assert!(transformer.methods.is_empty());
		let replaced = target.find_method("f", "()I").unwrap();
		assert_eq!(replaced.code.as_ref().unwrap().instructions, vec![Instruction::IntPush(2)]);
		assert_eq!(target.methods.len(), 1);
	}
}
