//! Step 6 of §4.2: `@CWrapCatch` wraps a directive-selected region of a target method in a
//! try/catch that calls the transformer method with the caught throwable. The transformer method
//! stays in `ctx.transformer.methods` — it is only *referenced* here, and gets copied into the
//! target by `MemberCopy` (step 12) like any other handler-invoked member.

use weave_ast::tree::class::ClassName;
use weave_ast::tree::code::{Exception, Instruction, MethodOp, Op, VarOp};
use weave_ast::tree::method::{MethodNode, MethodRef};
use weave_target::resolve_directive;

use crate::context::HandlerCtx;
use crate::directive::{method_directive, MethodDirective};
use crate::error::WeaveError;

pub fn apply(ctx: &mut HandlerCtx) -> Result<(), WeaveError> {
	let mut directives = Vec::new();
	for method in &ctx.transformer.methods {
		let directive = method_directive(method).map_err(|e| WeaveError::Target { transformer: ctx.transformer.name.clone(), method: method.name.clone(), desc: method.descriptor.clone(), source: e })?;
		if let Some(MethodDirective::WrapCatch(spec)) = directive {
			directives.push((method.clone(), spec));
		}
	}

	for (handler_method, spec) in directives {
		apply_one(ctx.target, &ctx.transformer.name, &handler_method, &spec)?;
	}

	Ok(())
}

fn apply_one(target: &mut weave_ast::ClassNode, transformer_name: &ClassName, handler: &MethodNode, spec: &crate::directive::WrapCatchSpec) -> Result<(), WeaveError> {
	let target_name = spec.method.name.clone();
	let target_desc = spec.method.desc.clone();

	let target_method = target
		.methods
		.iter_mut()
		.find(|m| m.name.as_str() == target_name && target_desc.as_ref().map_or(true, |d| d == &m.descriptor))
		.ok_or_else(|| WeaveError::shape(transformer_name, &handler.name, &handler.descriptor, format!("@CWrapCatch target method {target_name} not found"), "check the `method` pattern"))?;

	let args = handler.args();
	let [exc_ty] = args.as_slice() else {
		return Err(WeaveError::shape(transformer_name, &handler.name, &handler.descriptor, "@CWrapCatch handler must take exactly one argument (the caught throwable)", "give the handler a single Throwable-typed parameter"));
	};
	let exc_class = match exc_ty {
		weave_ast::tree::descriptor::Type::Object(c) => c.clone(),
		_ => return Err(WeaveError::shape(transformer_name, &handler.name, &handler.descriptor, "@CWrapCatch handler's argument must be a reference type", "the caught value is always an object reference")),
	};

	let target_is_static = target_method.access.is_static;
	let code = target_method.code_mut().map_err(|e| WeaveError::fault("WrapCatch", &target.name, transformer_name, e.to_string()))?;
	let anchors = resolve_directive(code, &spec.target).map_err(|e| WeaveError::Target { transformer: transformer_name.clone(), method: handler.name.clone(), desc: handler.descriptor.clone(), source: e })?;
	let (Some(&from), Some(&to)) = (anchors.first(), anchors.last()) else {
		return Ok(());
	};

	let start_label = code.fresh_label();
	let end_label = code.fresh_label();
	let handler_label = code.fresh_label();

	code.insert_before(from, [Instruction::Label(start_label)]);
	let to = to + 1; // shifted by the inserted start label
	code.insert_after(to, [Instruction::Label(end_label)]);

	let exc_slot = code.allocate_local(1);
	let instance_prefix = if target_is_static { Vec::new() } else { vec![Instruction::Var(VarOp::ALoad, weave_ast::tree::code::LvIndex(0))] };

	let ret_ty = handler.return_type();
	let invoke_owner = target.name.clone();
	let method_ref = MethodRef { class: invoke_owner, name: handler.name.clone(), desc: handler.descriptor.clone() };

	let mut body = vec![Instruction::Label(handler_label), Instruction::Var(VarOp::AStore, exc_slot)];
	body.extend(instance_prefix);
	body.push(Instruction::Var(VarOp::ALoad, exc_slot));
	body.push(Instruction::Method(MethodOp::InvokeVirtual, method_ref, false));

	if matches!(ret_ty, weave_ast::tree::descriptor::Type::Void) {
		body.push(Instruction::Var(VarOp::ALoad, exc_slot));
		body.push(Instruction::Insn(Op::AThrow));
	} else {
		let result_slot = code.allocate_local(1);
		body.push(Instruction::Var(VarOp::AStore, result_slot));
		body.push(Instruction::Var(VarOp::ALoad, result_slot));
		body.push(Instruction::Insn(Op::AThrow));
	}

	let insertion = code.instructions.len();
	code.instructions.splice(insertion..insertion, body);

	code.exception_table.push(Exception { start: start_label, end: end_label, handler: handler_label, catch_type: Some(exc_class), framework_inserted: true });

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::{HandlerCtx, IdentifierMap};
	use weave_ast::tree::annotation::{Annotation, ElementValue};
	use weave_ast::tree::class::ClassAccess;
	use weave_ast::tree::code::Code;
	use weave_ast::tree::method::{MethodAccess, MethodDescriptor, MethodName};
	use weave_ast::ClassNode;

	#[test]
	fn wraps_region_and_invokes_handler_on_exception() {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		let mut f = MethodNode::new(MethodAccess::default(), MethodName::from("f"), MethodDescriptor::from("()V"));
		let mut code = Code::new(1, 1);
		code.instructions.push(Instruction::Insn(Op::Nop));
		code.instructions.push(Instruction::Insn(Op::Return));
		f.code = Some(code);
		target.methods.push(f);

		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		let mut handler = MethodNode::new(MethodAccess::default(), MethodName::from("onError"), MethodDescriptor::from("(Ljava/lang/Exception;)V"));
		let target_ann = Annotation::new(crate::annotation_names::TARGET).with("value", ElementValue::String("HEAD".to_owned()));
		handler.visible_annotations.push(
			Annotation::new(crate::annotation_names::WRAP_CATCH)
				.with("method", ElementValue::String("f".to_owned()))
				.with("target", ElementValue::Annotation(Box::new(target_ann))),
		);
		transformer.methods.push(handler);

		let mut id_map = IdentifierMap::default();
		apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map }).unwrap();

		let f = target.find_method("f", "()V").unwrap();
		let code = f.code.as_ref().unwrap();
		assert_eq!(code.exception_table.len(), 1);
		assert!(code.exception_table[0].framework_inserted);
		assert!(code.instructions.iter().any(|i| matches!(i, Instruction::Method(MethodOp::InvokeVirtual, m, _) if m.name.as_str() == "onError")));
	}
}
