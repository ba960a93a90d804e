//! Step 12 of §4.2: copies every transformer field and method still left in `ctx.transformer`
//! (everything the earlier steps didn't consume or strip) into the target class, rewriting
//! `transformer.*` self-references to `target.*` — both the class's own identity and any member
//! that an earlier handler (`Shadow`) recorded a rename for in `ctx.id_map` — via `weave-remap`.

use weave_remap::Remapper;

use crate::context::HandlerCtx;
use crate::error::WeaveError;

pub fn apply(ctx: &mut HandlerCtx) -> Result<(), WeaveError> {
	let mut remapper = Remapper::new();
	remapper.add_class(ctx.transformer.name.clone(), ctx.target.name.clone());
	for (from, to) in ctx.id_map.methods() {
		remapper.add_method(ctx.transformer.name.clone(), from.name.clone(), from.desc.clone(), to.name.clone(), to.desc.clone());
	}
	for (from, to) in ctx.id_map.fields() {
		remapper.add_field(ctx.transformer.name.clone(), from.name.clone(), Some(from.desc.clone()), to.name.clone(), to.desc.clone());
	}

	let remapped = weave_remap::rewrite::remap_class(&remapper, ctx.transformer);

	for field in remapped.fields {
		if ctx.target.find_field(field.name.as_str(), field.descriptor.as_str()).is_some() {
			return Err(WeaveError::fault("MemberCopy", &ctx.target.name, &ctx.transformer.name, format!("field {} already exists on target", field.name.as_str())));
		}
		ctx.target.fields.push(field);
	}

	for method in remapped.methods {
		if ctx.target.find_method(method.name.as_str(), method.descriptor.as_str()).is_some() {
			return Err(WeaveError::fault("MemberCopy", &ctx.target.name, &ctx.transformer.name, format!("method {}{} already exists on target", method.name.as_str(), method.descriptor.as_str())));
		}
		ctx.target.methods.push(method);
	}

	ctx.transformer.fields.clear();
	ctx.transformer.methods.clear();

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::IdentifierMap;
	use weave_ast::tree::class::{ClassAccess, ClassName};
	use weave_ast::tree::code::{Code, FieldOp, Instruction, MethodOp};
	use weave_ast::tree::field::{FieldAccess, FieldName, FieldNode, FieldDescriptor, FieldRef};
	use weave_ast::tree::method::{MethodAccess, MethodDescriptor, MethodName, MethodNameAndDesc, MethodNode, MethodRef};
	use weave_ast::ClassNode;

	#[test]
	fn copies_remaining_members_and_rewrites_self_references() {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());

		transformer.fields.push(FieldNode::new(FieldAccess::default(), FieldName::from("helper_field"), FieldDescriptor::from("I")));

		let mut helper = MethodNode::new(MethodAccess::default(), MethodName::from("helper"), MethodDescriptor::from("()V"));
		let mut code = Code::new(1, 1);
		code.instructions.push(Instruction::Field(
			FieldOp::GetField,
			FieldRef { class: ClassName::from("pkg/Mixin"), name: FieldName::from("helper_field"), desc: FieldDescriptor::from("I") },
		));
		code.instructions.push(Instruction::Method(
			MethodOp::InvokeVirtual,
			MethodRef { class: ClassName::from("pkg/Mixin"), name: MethodName::from("other"), desc: MethodDescriptor::from("()V") },
			false,
		));
		helper.code = Some(code);
		transformer.methods.push(helper);

		let mut id_map = IdentifierMap::default();
		id_map.map_method(
			MethodNameAndDesc { name: MethodName::from("other"), desc: MethodDescriptor::from("()V") },
			MethodNameAndDesc { name: MethodName::from("realOther"), desc: MethodDescriptor::from("()V") },
		);

		apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map }).unwrap();

		assert!(transformer.fields.is_empty());
		assert!(transformer.methods.is_empty());
		assert!(target.find_field("helper_field", "I").is_some());

		let copied = target.find_method("helper", "()V").unwrap();
		let code = copied.code.as_ref().unwrap();
		assert!(code.instructions.iter().any(|i| matches!(i, Instruction::Field(_, f) if f.class == ClassName::from("pkg/Target"))));
		assert!(code.instructions.iter().any(|i| matches!(i, Instruction::Method(_, m, _) if m.name.as_str() == "realOther" && m.class == ClassName::from("pkg/Target"))));
	}
}
