//! Step 9 of §4.2: `@CModifyConstant` inserts a call to the transformer method right after each
//! matching constant load, passing the loaded constant as the sole argument and leaving the
//! method's return value on the stack in its place.

use weave_ast::tree::code::{Instruction, MethodOp, Op, VarOp};
use weave_ast::tree::method::{MethodNode, MethodRef};
use weave_target::{ConstantArg, TargetKind, TargetSpec};

use crate::context::HandlerCtx;
use crate::directive::{method_directive, ModifyConstantSpec, MethodDirective};
use crate::error::WeaveError;

pub fn apply(ctx: &mut HandlerCtx) -> Result<(), WeaveError> {
	let mut directives = Vec::new();
	for method in &ctx.transformer.methods {
		let directive = method_directive(method).map_err(|e| WeaveError::Target { transformer: ctx.transformer.name.clone(), method: method.name.clone(), desc: method.descriptor.clone(), source: e })?;
		if let Some(MethodDirective::ModifyConstant(spec)) = directive {
			directives.push((method.clone(), spec));
		}
	}

	for (handler, spec) in directives {
		apply_one(ctx.target, &ctx.transformer.name, &handler, &spec)?;
	}

	Ok(())
}

fn apply_one(target: &mut weave_ast::ClassNode, transformer_name: &weave_ast::tree::class::ClassName, handler: &MethodNode, spec: &ModifyConstantSpec) -> Result<(), WeaveError> {
	let args = handler.args();
	let ret = handler.return_type();
	if args.len() != 1 || args[0] != ret {
		return Err(WeaveError::shape(transformer_name, &handler.name, &handler.descriptor, "@CModifyConstant method must take and return exactly one value of the same type", "give the method signature `(T) -> T`"));
	}

	let target_owner = target.name.clone();
	let method_ref = MethodRef { class: target_owner.clone(), name: handler.name.clone(), desc: handler.descriptor.clone() };
	let handler_is_static = handler.access.is_static;

	let target_method = target
		.methods
		.iter_mut()
		.find(|m| spec.method.matches(m))
		.ok_or_else(|| WeaveError::shape(transformer_name, &handler.name, &handler.descriptor, format!("@CModifyConstant target method {} not found", spec.method.name), "check the `method` pattern"))?;

	let target_spec = {
		let mut spec_builder = TargetSpec::new(TargetKind::Constant(spec.constant.clone()));
		if spec.optional {
			spec_builder = spec_builder.optional();
		}
		spec_builder
	};

	let code = target_method.code_mut().map_err(|e| WeaveError::fault("ModifyConstant", &target_owner, transformer_name, e.to_string()))?;
	let anchors = weave_target::resolve_directive(code, &target_spec).map_err(|e| WeaveError::Target { transformer: transformer_name.clone(), method: handler.name.clone(), desc: handler.descriptor.clone(), source: e })?;

	let constant_is_wide = matches!(spec.constant, ConstantArg::Long(_) | ConstantArg::Double(_));

	for &anchor in anchors.iter().rev() {
		let invoke_op = if handler_is_static { MethodOp::InvokeStatic } else { MethodOp::InvokeVirtual };
		let mut call = Vec::new();
		if !handler_is_static {
			call.push(Instruction::Var(VarOp::ALoad, weave_ast::tree::code::LvIndex(0)));
			if constant_is_wide {
				// `SWAP` only reorders two category-1 words; a long/double constant occupies two
				// slots, so reordering `this` below it needs `DUP_X2` (duplicate `this` three
				// slots down) followed by a `POP` of the now-redundant copy on top.
				call.push(Instruction::Insn(Op::DupX2));
				call.push(Instruction::Insn(Op::Pop));
			} else {
				call.push(Instruction::Insn(Op::Swap));
			}
		}
		call.push(Instruction::Method(invoke_op, method_ref.clone(), false));
		code.insert_after(anchor, call);
	}

	Ok(())
}
