//! §4.3: `@Inject`, the central annotation handler. At each anchor the directive's `@CTarget`
//! resolves, emits a call to the transformer method carrying (in order): the target method's own
//! arguments (if the transformer opted in), a `Callback` instance (if it did), and any captured
//! `@CLocalVariable` values. Modifiable locals round-trip through a boxed `Object[]` the transformer
//! reads back from after the call.

use weave_ast::tree::class::ClassName;
use weave_ast::tree::code::{Code, Instruction, JumpOp, LvIndex, MethodOp, Op, TypeOp, VarOp};
use weave_ast::tree::descriptor::Type;
use weave_ast::tree::method::{MethodDescriptor, MethodNode, MethodRef};
use weave_ast::util::{box_instructions, load_op, store_op, unbox_instructions};
use weave_target::{insertion_point, resolve_directive};

use crate::callback;
use crate::context::HandlerCtx;
use crate::directive::{local_variable_spec, method_directive, InjectSpec, LocalVariableSpec, MethodDirective};
use crate::error::WeaveError;

pub fn apply(ctx: &mut HandlerCtx) -> Result<(), WeaveError> {
	let mut indices = Vec::new();
	for (i, method) in ctx.transformer.methods.iter().enumerate() {
		let directive = method_directive(method).map_err(|e| WeaveError::Target { transformer: ctx.transformer.name.clone(), method: method.name.clone(), desc: method.descriptor.clone(), source: e })?;
		if matches!(directive, Some(MethodDirective::Inject(_))) {
			indices.push(i);
		}
	}

	for i in indices {
		let spec = match method_directive(&ctx.transformer.methods[i]).ok().flatten() {
			Some(MethodDirective::Inject(spec)) => spec,
			_ => unreachable!("filtered above"),
		};
		apply_one(ctx, i, &spec)?;
	}

	Ok(())
}

fn callback_type() -> Type {
	Type::Object(callback::class_name())
}

/// A `@CLocalVariable` resolved against the target method's own locals, plus where its captured
/// value lands as a trailing parameter in the handler method's own frame.
struct ResolvedLocal {
	slot: LvIndex,
	ty: Type,
	load_op: VarOp,
	modifiable: bool,
	handler_slot: LvIndex,
}

fn apply_one(ctx: &mut HandlerCtx, handler_index: usize, spec: &InjectSpec) -> Result<(), WeaveError> {
	let transformer_name = ctx.transformer.name.clone();
	let handler = ctx.transformer.methods[handler_index].clone();

	let target_name = spec.method.name.clone();
	let target_desc = spec.method.desc.clone();
	let target_index = ctx
		.target
		.methods
		.iter()
		.position(|m| m.name.as_str() == target_name && target_desc.as_ref().map_or(true, |d| d == &m.descriptor))
		.ok_or_else(|| WeaveError::shape(&transformer_name, &handler.name, &handler.descriptor, format!("@Inject target method {target_name} not found"), "check the `method` pattern"))?;

	if handler.access.is_static != ctx.target.methods[target_index].access.is_static {
		return Err(WeaveError::shape(
			&transformer_name,
			&handler.name,
			&handler.descriptor,
			"@Inject method's staticness must match its target",
			"add or remove `static` on the injector to match the target method",
		));
	}
	if !matches!(handler.return_type(), Type::Void) {
		return Err(WeaveError::shape(&transformer_name, &handler.name, &handler.descriptor, "@Inject method must return void", "move any result into the Callback instead"));
	}

	let all_args = handler.args();
	let mut local_specs = Vec::new();
	let mut l_start = all_args.len();
	while l_start > 0 {
		let Some(spec) = local_variable_spec(&handler, l_start - 1) else { break };
		local_specs.push(spec);
		l_start -= 1;
	}
	local_specs.reverse();
	let h_args = &all_args[..l_start];

	let target_args = ctx.target.methods[target_index].args();
	let callback_ty = callback_type();
	let (has_args, has_callback) = if h_args.is_empty() {
		(false, false)
	} else if h_args.len() == 1 && h_args[0] == callback_ty {
		(false, true)
	} else if h_args == target_args.as_slice() {
		(true, false)
	} else if h_args.len() == target_args.len() + 1 && h_args[..target_args.len()] == target_args[..] && h_args[target_args.len()] == callback_ty {
		(true, true)
	} else {
		return Err(WeaveError::shape(
			&transformer_name,
			&handler.name,
			&handler.descriptor,
			"@Inject method's parameters don't match any of the accepted shapes",
			"use (), (Callback), the target's own arguments, or the target's arguments followed by a Callback — plus any trailing @CLocalVariable parameters",
		));
	};

	let target_code_for_resolve = ctx.target.methods[target_index].code_mut().map_err(|e| WeaveError::fault("Inject", &ctx.target.name, &transformer_name, e.to_string()))?;
	let mut resolved_locals = Vec::new();
	let mut handler_slot = handler.first_arg_slot() + width_sum(h_args);
	for (spec_idx, lv_spec) in local_specs.iter().enumerate() {
		let (slot, ty, load) = resolve_local(target_code_for_resolve, lv_spec, &transformer_name, &handler, spec_idx)?;
		resolved_locals.push(ResolvedLocal { slot, ty: ty.clone(), load_op: load, modifiable: lv_spec.modifiable, handler_slot: LvIndex(handler_slot) });
		handler_slot += ty.width() as u16;
	}

	let modifiable: Vec<usize> = resolved_locals.iter().enumerate().filter(|(_, l)| l.modifiable).map(|(i, _)| i).collect();
	let array_param_slot = if !modifiable.is_empty() { Some(rewrite_for_modifiable_locals(ctx, handler_index, h_args, &resolved_locals, &modifiable)?) } else { None };

	let handler = ctx.transformer.methods[handler_index].clone();
	let method_ref = MethodRef { class: ctx.target.name.clone(), name: handler.name.clone(), desc: handler.descriptor.clone() };
	let handler_is_static = handler.access.is_static;
	let cancellable = spec.cancellable;
	let target_is_static = ctx.target.methods[target_index].access.is_static;
	let target_return_type = ctx.target.methods[target_index].return_type();
	let captures = matches!(spec.target.kind, weave_target::TargetKind::Return | weave_target::TargetKind::Tail | weave_target::TargetKind::Throw);

	let code = ctx.target.methods[target_index].code_mut().map_err(|e| WeaveError::fault("Inject", &ctx.target.name, &transformer_name, e.to_string()))?;
	let anchors = resolve_directive(code, &spec.target).map_err(|e| WeaveError::Target { transformer: transformer_name.clone(), method: handler.name.clone(), desc: handler.descriptor.clone(), source: e })?;

	for &anchor in anchors.iter().rev() {
		let pos = insertion_point(anchor, spec.target.shift);
		let block = build_call_site(BuildCallSite {
			code,
			method_ref: &method_ref,
			handler_is_static,
			target_is_static,
			target_return_type: &target_return_type,
			target_args: &target_args,
			has_args,
			has_callback,
			cancellable,
			captures,
			resolved_locals: &resolved_locals,
			array_param_slot,
		});
		code.insert_before(pos, block);
	}

	Ok(())
}

fn width_sum(types: &[Type]) -> u16 {
	types.iter().map(|t| t.width() as u16).sum()
}

fn resolve_local(code: &Code, spec: &LocalVariableSpec, transformer_name: &ClassName, handler: &MethodNode, spec_idx: usize) -> Result<(LvIndex, Type, VarOp), WeaveError> {
	let slot = if let Some(index) = spec.index {
		LvIndex(index)
	} else if let Some(name) = &spec.name {
		let lv = code.local_variables.iter().find(|lv| &lv.name == name).ok_or_else(|| {
			WeaveError::shape(transformer_name, &handler.name, &handler.descriptor, format!("@CLocalVariable {name:?} not found in the target's local variable table"), "pass an explicit `index` instead, or check the name")
		})?;
		lv.index
	} else {
		return Err(WeaveError::shape(transformer_name, &handler.name, &handler.descriptor, format!("@CLocalVariable on parameter {spec_idx} names neither `index` nor `name`"), "specify exactly one of `index` or `name`"));
	};

	let load = if let Some(raw) = &spec.load_opcode {
		parse_load_opcode(raw).ok_or_else(|| WeaveError::shape(transformer_name, &handler.name, &handler.descriptor, format!("unrecognized loadOpcode {raw:?}"), "use one of ILOAD, LLOAD, FLOAD, DLOAD, ALOAD"))?
	} else {
		infer_load_opcode(code, slot).ok_or_else(|| {
			WeaveError::shape(transformer_name, &handler.name, &handler.descriptor, format!("can't infer the load opcode for local slot {}: no unambiguous store found", slot.0), "pass an explicit `loadOpcode`")
		})?
	};

	Ok((slot, load_to_type(load), load))
}

fn parse_load_opcode(raw: &str) -> Option<VarOp> {
	match raw.to_ascii_uppercase().as_str() {
		"ILOAD" => Some(VarOp::ILoad),
		"LLOAD" => Some(VarOp::LLoad),
		"FLOAD" => Some(VarOp::FLoad),
		"DLOAD" => Some(VarOp::DLoad),
		"ALOAD" => Some(VarOp::ALoad),
		_ => None,
	}
}

fn infer_load_opcode(code: &Code, slot: LvIndex) -> Option<VarOp> {
	let mut found = None;
	for instr in &code.instructions {
		if let Instruction::Var(op, s) = instr {
			if *s == slot && op.is_store() {
				let load = store_to_load(*op);
				match found {
					None => found = Some(load),
					Some(existing) if existing == load => {}
					Some(_) => return None,
				}
			}
		}
	}
	found
}

fn store_to_load(op: VarOp) -> VarOp {
	match op {
		VarOp::IStore => VarOp::ILoad,
		VarOp::LStore => VarOp::LLoad,
		VarOp::FStore => VarOp::FLoad,
		VarOp::DStore => VarOp::DLoad,
		VarOp::AStore => VarOp::ALoad,
		load => load,
	}
}

fn load_to_type(op: VarOp) -> Type {
	match op {
		VarOp::ILoad => Type::I,
		VarOp::LLoad => Type::J,
		VarOp::FLoad => Type::F,
		VarOp::DLoad => Type::D,
		VarOp::ALoad => Type::Object(ClassName::from("java/lang/Object")),
		_ => unreachable!("store opcode never returned from resolve_local"),
	}
}

/// Widens the handler method's descriptor with a trailing `Object[]` parameter, bumps every
/// `VarInsn`/`IInc` in its body that references a slot at or beyond the new parameter's slot, and
/// inserts the update-on-exit packing sequence before every return/throw. Returns the slot the new
/// array parameter occupies in the handler's own frame.
fn rewrite_for_modifiable_locals(ctx: &mut HandlerCtx, handler_index: usize, h_args: &[Type], resolved_locals: &[ResolvedLocal], modifiable: &[usize]) -> Result<u16, WeaveError> {
	let target_name = ctx.target.name.clone();
	let transformer_name = ctx.transformer.name.clone();
	let handler = &mut ctx.transformer.methods[handler_index];
	let array_ty = Type::Array(1, Box::new(Type::Object(ClassName::from("java/lang/Object"))));

	let mut new_args = h_args.to_vec();
	new_args.extend(resolved_locals.iter().map(|l| l.ty.clone()));
	let array_param_slot = handler.first_arg_slot() + width_sum(&new_args);
	new_args.push(array_ty);
	handler.descriptor = MethodDescriptor::from_parts(&new_args, &Type::Void);

	let code = handler.code_mut().map_err(|e| WeaveError::fault("Inject", &target_name, &transformer_name, e.to_string()))?;
	for instr in &mut code.instructions {
		match instr {
			Instruction::Var(_, LvIndex(idx)) if *idx >= array_param_slot => *idx += 1,
			Instruction::IInc(LvIndex(idx), _) if *idx >= array_param_slot => *idx += 1,
			_ => {}
		}
	}

	let mut pack = Vec::new();
	for (pos, &local_idx) in modifiable.iter().enumerate() {
		let local = &resolved_locals[local_idx];
		pack.push(Instruction::Var(VarOp::ALoad, LvIndex(array_param_slot)));
		pack.push(Instruction::IntPush(pos as i32));
		pack.push(Instruction::Var(load_op(&local.ty), local.handler_slot));
		pack.extend(box_instructions(&local.ty));
		pack.push(Instruction::Insn(Op::AAStore));
	}

	let mut return_sites: Vec<usize> = code
		.instructions
		.iter()
		.enumerate()
		.filter(|(_, i)| matches!(i, Instruction::Insn(op) if op.is_return()) || i.is_athrow())
		.map(|(i, _)| i)
		.collect();
	return_sites.sort_unstable();
	for &site in return_sites.iter().rev() {
		code.insert_before(site, pack.clone());
	}

	Ok(array_param_slot)
}

struct BuildCallSite<'a> {
	code: &'a mut Code,
	method_ref: &'a MethodRef,
	handler_is_static: bool,
	target_is_static: bool,
	target_return_type: &'a Type,
	target_args: &'a [Type],
	has_args: bool,
	has_callback: bool,
	cancellable: bool,
	captures: bool,
	resolved_locals: &'a [ResolvedLocal],
	array_param_slot: Option<u16>,
}

fn build_call_site(ctx: BuildCallSite) -> Vec<Instruction> {
	let BuildCallSite { code, method_ref, handler_is_static, target_is_static, target_return_type, target_args, has_args, has_callback, cancellable, captures, resolved_locals, array_param_slot } = ctx;

	let mut block = Vec::new();

	let return_var = if captures && !matches!(target_return_type, Type::Void) {
		let slot = code.allocate_local(target_return_type.width());
		block.push(Instruction::Var(store_op(target_return_type), slot));
		block.push(Instruction::Var(load_op(target_return_type), slot));
		Some(slot)
	} else {
		None
	};

	if !handler_is_static {
		block.push(Instruction::Var(VarOp::ALoad, LvIndex(0)));
	}

	if has_args {
		let mut slot = if target_is_static { 0u16 } else { 1u16 };
		for ty in target_args {
			block.push(Instruction::Var(load_op(ty), LvIndex(slot)));
			slot += ty.width() as u16;
		}
	}

	let callback_slot = if has_callback {
		let slot = code.allocate_local(1);
		let boxed_return = return_var
			.map(|rv| {
				let mut v = vec![Instruction::Var(load_op(target_return_type), rv)];
				v.extend(box_instructions(target_return_type));
				v
			})
			.unwrap_or_default();
		block.extend(callback::construct(cancellable, boxed_return));
		block.push(Instruction::Var(VarOp::AStore, slot));
		block.push(Instruction::Var(VarOp::ALoad, slot));
		Some(slot)
	} else {
		None
	};

	for local in resolved_locals {
		block.push(Instruction::Var(local.load_op, local.slot));
	}

	let call_array_slot = array_param_slot.map(|_| {
		let count = resolved_locals.iter().filter(|l| l.modifiable).count();
		let slot = code.allocate_local(1);
		block.push(Instruction::IntPush(count as i32));
		block.push(Instruction::Type(TypeOp::ANewArray, ClassName::from("java/lang/Object")));
		block.push(Instruction::Insn(Op::Dup));
		block.push(Instruction::Var(VarOp::AStore, slot));
		slot
	});

	let invoke_op = if handler_is_static { MethodOp::InvokeStatic } else { MethodOp::InvokeVirtual };
	block.push(Instruction::Method(invoke_op, method_ref.clone(), false));

	if let Some(array_local) = call_array_slot {
		for (idx, local) in resolved_locals.iter().filter(|l| l.modifiable).enumerate() {
			block.push(Instruction::Var(VarOp::ALoad, array_local));
			block.push(Instruction::IntPush(idx as i32));
			block.push(Instruction::Insn(Op::AALoad));
			block.push(Instruction::Type(TypeOp::CheckCast, local.ty.boxed_class()));
			block.extend(unbox_instructions(&local.ty));
			block.push(Instruction::Var(store_op(&local.ty), local.slot));
		}
	}

	if cancellable && has_callback {
		if let Some(slot) = callback_slot {
			block.push(Instruction::Var(VarOp::ALoad, slot));
			block.push(Instruction::Method(MethodOp::InvokeVirtual, callback::is_cancelled(), false));
			let after = code.fresh_label();
			block.push(Instruction::Jump(JumpOp::IfEq, after));
			if matches!(target_return_type, Type::Void) {
				block.push(Instruction::Insn(Op::Return));
			} else {
				block.push(Instruction::Var(VarOp::ALoad, slot));
				block.push(Instruction::Method(MethodOp::InvokeVirtual, callback::get_return_value(), false));
				block.push(Instruction::Type(TypeOp::CheckCast, target_return_type.boxed_class()));
				block.extend(unbox_instructions(target_return_type));
				block.push(Instruction::Insn(weave_ast::util::return_op(target_return_type)));
			}
			block.push(Instruction::Label(after));
		}
	}

	block
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::IdentifierMap;
	use weave_ast::tree::annotation::Annotation;
	use weave_ast::tree::class::ClassAccess;
	use weave_ast::tree::method::{MethodAccess, MethodDescriptor, MethodName};
	use weave_ast::ClassNode;

	#[test]
	fn injects_head_call_with_no_args_no_callback() {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		let mut f = MethodNode::new(MethodAccess::default(), MethodName::from("f"), MethodDescriptor::from("()V"));
		let mut code = Code::new(1, 1);
		code.instructions.push(Instruction::Insn(Op::Return));
		f.code = Some(code);
		target.methods.push(f);

		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		let mut handler = MethodNode::new(MethodAccess::default(), MethodName::from("onHead"), MethodDescriptor::from("()V"));
		let target_ann = Annotation::new(crate::annotation_names::TARGET).with("value", weave_ast::tree::annotation::ElementValue::String("HEAD".to_owned()));
		handler.visible_annotations.push(
			Annotation::new(crate::annotation_names::INJECT)
				.with("method", weave_ast::tree::annotation::ElementValue::String("f".to_owned()))
				.with("target", weave_ast::tree::annotation::ElementValue::Annotation(Box::new(target_ann))),
		);
		transformer.methods.push(handler);

		let mut id_map = IdentifierMap::default();
		apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map }).unwrap();

		let f = target.find_method("f", "()V").unwrap();
		let code = f.code.as_ref().unwrap();
		assert!(code.instructions.iter().any(|i| matches!(i, Instruction::Method(MethodOp::InvokeVirtual, m, _) if m.name.as_str() == "onHead")));
	}

	#[test]
	fn injects_cancellable_callback_and_checks_is_cancelled() {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		let mut f = MethodNode::new(MethodAccess::default(), MethodName::from("f"), MethodDescriptor::from("()I"));
		let mut code = Code::new(1, 1);
		code.instructions.push(Instruction::IntPush(1));
		code.instructions.push(Instruction::Insn(Op::IReturn));
		f.code = Some(code);
		target.methods.push(f);

		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		let mut handler = MethodNode::new(MethodAccess::default(), MethodName::from("onHead"), MethodDescriptor::from("(Lweave/runtime/Callback;)V"));
		let target_ann = Annotation::new(crate::annotation_names::TARGET).with("value", weave_ast::tree::annotation::ElementValue::String("HEAD".to_owned()));
		handler.visible_annotations.push(
			Annotation::new(crate::annotation_names::INJECT)
				.with("method", weave_ast::tree::annotation::ElementValue::String("f".to_owned()))
				.with("target", weave_ast::tree::annotation::ElementValue::Annotation(Box::new(target_ann)))
				.with("cancellable", weave_ast::tree::annotation::ElementValue::Bool(true)),
		);
		transformer.methods.push(handler);

		let mut id_map = IdentifierMap::default();
		apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map }).unwrap();

		let f = target.find_method("f", "()I").unwrap();
		let code = f.code.as_ref().unwrap();
		assert!(code.instructions.iter().any(|i| matches!(i, Instruction::Method(MethodOp::InvokeVirtual, m, _) if m.name.as_str() == "isCancelled")));
		assert!(code.instructions.iter().any(|i| matches!(i, Instruction::Type(TypeOp::New, c) if c == &callback::class_name())));
	}

	/// Scenario 2 of §8: a `RETURN`-anchored cancellable inject that overrides the return value
	/// must, once cancelled, read it back via `Callback::getReturnValue` and return early with it.
	#[test]
	fn return_inject_cancellable_reads_back_override_value() {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		let mut add = MethodNode::new(MethodAccess::default(), MethodName::from("add"), MethodDescriptor::from("(II)I"));
		let mut code = Code::new(2, 3);
		code.instructions.push(Instruction::Var(VarOp::ILoad, weave_ast::tree::code::LvIndex(1)));
		code.instructions.push(Instruction::Var(VarOp::ILoad, weave_ast::tree::code::LvIndex(2)));
		code.instructions.push(Instruction::Insn(Op::IAdd));
		code.instructions.push(Instruction::Insn(Op::IReturn));
		add.code = Some(code);
		target.methods.push(add);

		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		let mut handler = MethodNode::new(MethodAccess::default(), MethodName::from("onReturn"), MethodDescriptor::from("(Lweave/runtime/Callback;)V"));
		let target_ann = Annotation::new(crate::annotation_names::TARGET).with("value", weave_ast::tree::annotation::ElementValue::String("RETURN".to_owned()));
		handler.visible_annotations.push(
			Annotation::new(crate::annotation_names::INJECT)
				.with("method", weave_ast::tree::annotation::ElementValue::String("add".to_owned()))
				.with("target", weave_ast::tree::annotation::ElementValue::Annotation(Box::new(target_ann)))
				.with("cancellable", weave_ast::tree::annotation::ElementValue::Bool(true)),
		);
		transformer.methods.push(handler);

		let mut id_map = IdentifierMap::default();
		apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map }).unwrap();

		let add = target.find_method("add", "(II)I").unwrap();
		let code = add.code.as_ref().unwrap();
		let is_cancelled_at = code.instructions.iter().position(|i| matches!(i, Instruction::Method(MethodOp::InvokeVirtual, m, _) if m.name.as_str() == "isCancelled")).expect("isCancelled call present");
		let get_return_at = code.instructions.iter().position(|i| matches!(i, Instruction::Method(MethodOp::InvokeVirtual, m, _) if m.name.as_str() == "getReturnValue")).expect("getReturnValue call present");
		assert!(get_return_at > is_cancelled_at, "override value must be fetched after the cancellation check");
		let return_after_get = code.instructions[get_return_at..].iter().position(|i| matches!(i, Instruction::Insn(Op::IReturn)));
		assert!(return_after_get.is_some(), "the overridden value must be returned, not fallen through to the original add");
	}

	/// §8 invariant: "after `@Inject` with `n` modifiable locals, the resulting method uses
	/// exactly `originalMax + n + 2` local slots (array slot + callback slot) or fewer."
	#[test]
	fn modifiable_local_inject_stays_within_slot_budget() {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		let mut f = MethodNode::new(MethodAccess::default(), MethodName::from("f"), MethodDescriptor::from("()V"));
		let mut code = Code::new(1, 2);
		code.local_variables.push(weave_ast::tree::code::Lv { start: 0, end: 1, name: "x".to_owned(), descriptor: Some("I".to_owned()), index: LvIndex(1) });
		code.instructions.push(Instruction::Var(VarOp::IStore, LvIndex(1)));
		code.instructions.push(Instruction::Insn(Op::Return));
		f.code = Some(code);
		let original_max = f.code.as_ref().unwrap().max_locals;
		target.methods.push(f);

		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		let mut handler = MethodNode::new(MethodAccess::default(), MethodName::from("onHead"), MethodDescriptor::from("(Lweave/runtime/Callback;I)V"));
		handler.parameter_annotations = vec![
			Vec::new(),
			vec![Annotation::new(crate::annotation_names::LOCAL_VARIABLE)
				.with("name", weave_ast::tree::annotation::ElementValue::String("x".to_owned()))
				.with("modifiable", weave_ast::tree::annotation::ElementValue::Bool(true))],
		];
		let target_ann = Annotation::new(crate::annotation_names::TARGET).with("value", weave_ast::tree::annotation::ElementValue::String("HEAD".to_owned()));
		handler.visible_annotations.push(
			Annotation::new(crate::annotation_names::INJECT)
				.with("method", weave_ast::tree::annotation::ElementValue::String("f".to_owned()))
				.with("target", weave_ast::tree::annotation::ElementValue::Annotation(Box::new(target_ann)))
				.with("cancellable", weave_ast::tree::annotation::ElementValue::Bool(true)),
		);
		let mut code = Code::new(1, 2);
		code.instructions.push(Instruction::Insn(Op::Return));
		handler.code = Some(code);
		transformer.methods.push(handler);

		let mut id_map = IdentifierMap::default();
		apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map }).unwrap();

		let f = target.find_method("f", "()V").unwrap();
		let new_max = f.code.as_ref().unwrap().max_locals;
		// one modifiable local (n = 1): array slot + callback slot is the "+2", n itself needs no
		// extra target slot since the local already occupied one.
		assert!(new_max <= original_max + 1 + 2, "max_locals grew from {original_max} to {new_max}, exceeding the n+2 budget");
	}
}
