//! Step 8 of §4.2: `@CRedirect` replaces the instruction(s) at a directive's anchors with a call
//! to the transformer method, in one of four shapes depending on what kind of instruction the
//! anchor resolved to. `INVOKEDYNAMIC` call sites are never matched by `weave-target`'s `INVOKE`
//! resolution (it only looks at `Instruction::Method`), so they fall out naturally unsupported.

use weave_ast::tree::code::{Code, FieldOp, Instruction, LvIndex, MethodOp, TypeOp, VarOp};
use weave_ast::tree::descriptor::Type;
use weave_ast::tree::method::MethodRef;
use weave_ast::util::{load_op, store_op};
use weave_target::resolve_directive;

use crate::context::HandlerCtx;
use crate::directive::{method_directive, MethodDirective};
use crate::error::WeaveError;

pub fn apply(ctx: &mut HandlerCtx) -> Result<(), WeaveError> {
	let mut directives = Vec::new();
	for method in &ctx.transformer.methods {
		let directive = method_directive(method).map_err(|e| WeaveError::Target { transformer: ctx.transformer.name.clone(), method: method.name.clone(), desc: method.descriptor.clone(), source: e })?;
		if let Some(MethodDirective::Redirect(spec)) = directive {
			directives.push((method.clone(), spec));
		}
	}

	for (handler, spec) in directives {
		apply_one(ctx.target, &ctx.transformer.name, &handler, &spec)?;
	}

	Ok(())
}

fn apply_one(target: &mut weave_ast::ClassNode, transformer_name: &weave_ast::tree::class::ClassName, handler: &weave_ast::MethodNode, spec: &crate::directive::RedirectSpec) -> Result<(), WeaveError> {
	let target_name = spec.method.name.clone();
	let target_desc = spec.method.desc.clone();
	let target_owner = target.name.clone();
	let method_ref = MethodRef { class: target_owner.clone(), name: handler.name.clone(), desc: handler.descriptor.clone() };
	let handler_is_static = handler.access.is_static;

	let target_method = target
		.methods
		.iter_mut()
		.find(|m| m.name.as_str() == target_name && target_desc.as_ref().map_or(true, |d| d == &m.descriptor))
		.ok_or_else(|| WeaveError::shape(transformer_name, &handler.name, &handler.descriptor, format!("@CRedirect target method {target_name} not found"), "check the `method` pattern"))?;

	let code = target_method.code_mut().map_err(|e| WeaveError::fault("Redirect", &target_owner, transformer_name, e.to_string()))?;
	let anchors = resolve_directive(code, &spec.target).map_err(|e| WeaveError::Target { transformer: transformer_name.clone(), method: handler.name.clone(), desc: handler.descriptor.clone(), source: e })?;

	// Process anchors back-to-front so earlier indices stay valid as later ones are rewritten.
	for &anchor in anchors.iter().rev() {
		match code.instructions[anchor].clone() {
			Instruction::Field(op, _) => redirect_field(code, anchor, op, &method_ref, handler_is_static),
			Instruction::Method(op, method_ref_site, _) => {
				let has_receiver = !matches!(op, MethodOp::InvokeStatic);
				let (arg_types, _) = method_ref_site.desc.parse().expect("descriptor was validated at construction");
				redirect_invoke(code, anchor, anchor, &arg_types, has_receiver, &method_ref, handler_is_static);
			}
			Instruction::Type(TypeOp::New, owner) => redirect_new(code, anchor, &owner, transformer_name, &method_ref, handler_is_static)?,
			other => return Err(WeaveError::fault("Redirect", &target_owner, transformer_name, format!("unsupported redirect anchor instruction {other:?}"))),
		}
	}

	Ok(())
}

fn redirect_field(code: &mut Code, anchor: usize, op: FieldOp, method_ref: &MethodRef, handler_is_static: bool) {
	let mut prologue = Vec::new();
	if op.is_get() {
		if !handler_is_static {
			prologue.push(Instruction::Var(VarOp::ALoad, LvIndex(0)));
			if !op.is_static() {
				prologue.push(Instruction::Insn(weave_ast::tree::code::Op::Swap));
			}
		}
		let invoke_op = if handler_is_static { MethodOp::InvokeStatic } else { MethodOp::InvokeVirtual };
		prologue.push(Instruction::Method(invoke_op, method_ref.clone(), false));
		code.replace_at(anchor, prologue);
	} else {
		// PUTFIELD/PUTSTATIC: stack is [owner?, value] with value on top.
		let value_ty = field_value_type(code, anchor);
		let value_slot = code.allocate_local(value_ty.width());
		let mut store = vec![Instruction::Var(store_op(&value_ty), value_slot)];
		let owner_slot = if !op.is_static() {
			let slot = code.allocate_local(1);
			store.push(Instruction::Var(VarOp::AStore, slot));
			Some(slot)
		} else {
			None
		};

		let mut reload = Vec::new();
		if !handler_is_static {
			reload.push(Instruction::Var(VarOp::ALoad, LvIndex(0)));
		}
		if let Some(slot) = owner_slot {
			reload.push(Instruction::Var(VarOp::ALoad, slot));
		}
		reload.push(Instruction::Var(load_op(&value_ty), value_slot));
		let invoke_op = if handler_is_static { MethodOp::InvokeStatic } else { MethodOp::InvokeVirtual };
		reload.push(Instruction::Method(invoke_op, method_ref.clone(), false));

		store.extend(reload);
		code.replace_at(anchor, store);
	}
}

fn field_value_type(code: &Code, anchor: usize) -> Type {
	match &code.instructions[anchor] {
		Instruction::Field(_, f) => f.desc.parse().expect("field descriptor was validated at construction"),
		_ => unreachable!(),
	}
}

#[allow(clippy::too_many_arguments)]
fn redirect_invoke(code: &mut Code, from: usize, to: usize, arg_types: &[Type], has_receiver: bool, method_ref: &MethodRef, handler_is_static: bool) {
	let slots = allocate_arg_slots(code, arg_types);
	let receiver_slot = if has_receiver { Some(code.allocate_local(1)) } else { None };

	let mut store = build_store_instrs(arg_types, &slots);
	if let Some(slot) = receiver_slot {
		store.push(Instruction::Var(VarOp::AStore, slot));
	}

	let mut reload = Vec::new();
	if !handler_is_static {
		reload.push(Instruction::Var(VarOp::ALoad, LvIndex(0)));
	}
	if let Some(slot) = receiver_slot {
		reload.push(Instruction::Var(VarOp::ALoad, slot));
	}
	reload.extend(build_load_instrs(arg_types, &slots));
	let invoke_op = if handler_is_static { MethodOp::InvokeStatic } else { MethodOp::InvokeVirtual };
	reload.push(Instruction::Method(invoke_op, method_ref.clone(), false));

	store.extend(reload);
	code.replace_range(from, to, store);
}

/// Redirects `NEW Owner; DUP; <ctor args>; INVOKESPECIAL <init>` to a call to the transformer
/// method. The constructor's own arg-push instructions sit between `DUP` and `INVOKESPECIAL` and
/// must be left in place — only the leading `NEW`/`DUP` pair and the trailing `INVOKESPECIAL` are
/// rewritten, so the args they already push land directly as the handler call's arguments.
fn redirect_new(code: &mut Code, anchor: usize, owner: &weave_ast::tree::class::ClassName, transformer_name: &weave_ast::tree::class::ClassName, method_ref: &MethodRef, handler_is_static: bool) -> Result<(), WeaveError> {
	let dup_idx = anchor + 1;
	if !matches!(code.instructions.get(dup_idx), Some(Instruction::Insn(weave_ast::tree::code::Op::Dup))) {
		return Err(WeaveError::fault("Redirect", owner, transformer_name, "`NEW` not immediately followed by `DUP`; cannot redirect"));
	}
	let ctor_idx = code.instructions[dup_idx + 1..]
		.iter()
		.position(|i| matches!(i, Instruction::Method(MethodOp::InvokeSpecial, m, _) if m.name.is_constructor() && &m.class == owner))
		.map(|offset| dup_idx + 1 + offset)
		.ok_or_else(|| WeaveError::fault("Redirect", owner, transformer_name, "no matching `<init>` found for `NEW` redirect"))?;

	// Replace the tail first: editing at `ctor_idx` doesn't disturb the earlier `anchor`/`dup_idx`
	// indices, whereas the reverse order would shift `ctor_idx` out from under us.
	let invoke_op = if handler_is_static { MethodOp::InvokeStatic } else { MethodOp::InvokeVirtual };
	code.replace_at(ctor_idx, [Instruction::Method(invoke_op, method_ref.clone(), false)]);

	// `NEW`/`DUP` pushed the (still-uninitialized) receiver the constructor call consumed; the
	// handler call needs `this` in that same leading position instead (or nothing, if static).
	let prologue = if handler_is_static { Vec::new() } else { vec![Instruction::Var(VarOp::ALoad, LvIndex(0))] };
	code.replace_range(anchor, dup_idx, prologue);

	Ok(())
}

fn allocate_arg_slots(code: &mut Code, arg_types: &[Type]) -> Vec<LvIndex> {
	let mut slots = vec![LvIndex(0); arg_types.len()];
	for (i, ty) in arg_types.iter().enumerate() {
		slots[i] = code.allocate_local(ty.width());
	}
	slots
}

/// Stores values currently on the stack (top = last arg) into `slots`, in reverse argument order.
fn build_store_instrs(arg_types: &[Type], slots: &[LvIndex]) -> Vec<Instruction> {
	arg_types.iter().zip(slots).enumerate().rev().map(|(i, (ty, _))| Instruction::Var(store_op(ty), slots[i])).collect()
}

/// Reloads `slots` in original argument order, ready for an invoke.
fn build_load_instrs(arg_types: &[Type], slots: &[LvIndex]) -> Vec<Instruction> {
	arg_types.iter().zip(slots).map(|(ty, slot)| Instruction::Var(load_op(ty), *slot)).collect()
}
