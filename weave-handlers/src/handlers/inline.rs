//! Step 10 of §4.2: `@CInline` splices a transformer method's body directly into every call site
//! that invokes it, instead of letting it be copied into the target as a standalone method by
//! `MemberCopy` (step 12). Call sites only exist because an earlier handler (`Inject`, `Redirect`,
//! `WrapCatch`, `ModifyConstant`) already emitted an `INVOKE` whose owner is `target.name` in
//! anticipation of the method being carried along — `Inline` intercepts that before it happens.

use weave_ast::tree::code::{Code, Instruction, LvIndex, MethodOp, VarOp};
use weave_ast::tree::method::MethodNode;
use weave_ast::util::{clone_relabeled, store_op};

use crate::context::HandlerCtx;
use crate::directive::{method_directive, MethodDirective};
use crate::error::WeaveError;

pub fn apply(ctx: &mut HandlerCtx) -> Result<(), WeaveError> {
	let mut inline_indices = Vec::new();
	for (i, method) in ctx.transformer.methods.iter().enumerate() {
		let directive = method_directive(method).map_err(|e| WeaveError::Target { transformer: ctx.transformer.name.clone(), method: method.name.clone(), desc: method.descriptor.clone(), source: e })?;
		if matches!(directive, Some(MethodDirective::Inline)) {
			inline_indices.push(i);
		}
	}

	for i in inline_indices.into_iter().rev() {
		let method = ctx.transformer.methods[i].clone();
		for target_method in &mut ctx.target.methods {
			let Some(code) = target_method.code.as_mut() else { continue };
			inline_into(code, &ctx.transformer.name, &ctx.target.name, &method)?;
		}
		ctx.transformer.methods.remove(i);
	}

	Ok(())
}

fn inline_into(code: &mut Code, transformer_name: &weave_ast::tree::class::ClassName, target_name: &weave_ast::tree::class::ClassName, inline_method: &MethodNode) -> Result<(), WeaveError> {
	loop {
		let site = code.instructions.iter().position(|i| {
			matches!(i, Instruction::Method(_, m, _) if m.class == *target_name && m.name == inline_method.name && m.desc == inline_method.descriptor)
		});
		let Some(site) = site else { break };
		splice_call(code, site, transformer_name, inline_method)?;
	}
	Ok(())
}

fn splice_call(code: &mut Code, site: usize, transformer_name: &weave_ast::tree::class::ClassName, inline_method: &MethodNode) -> Result<(), WeaveError> {
	let op = match &code.instructions[site] {
		Instruction::Method(op, ..) => *op,
		_ => unreachable!("matched above"),
	};
	let handler_is_static = inline_method.access.is_static;
	if matches!(op, MethodOp::InvokeStatic) != handler_is_static {
		return Err(WeaveError::fault("Inline", transformer_name, transformer_name, "@CInline method's staticness doesn't match its call site's invoke opcode"));
	}

	let body = inline_method.code.as_ref().ok_or_else(|| WeaveError::shape(transformer_name, &inline_method.name, &inline_method.descriptor, "@CInline method has no code to inline", "an abstract or native method can't be inlined"))?;

	let base = code.allocate_local(body.max_locals as u8).0;

	let arg_types = inline_method.args();
	// Store call-site arguments (and receiver, if any) into the shifted slot block; the inlined
	// body already addresses its own params at their original (now-shifted) indices.
	let mut slot_for_param = Vec::new();
	let mut next = if handler_is_static { 0u16 } else { 1u16 };
	for ty in &arg_types {
		slot_for_param.push(base + next);
		next += ty.width() as u16;
	}
	let mut store = Vec::new();
	for (i, ty) in arg_types.iter().enumerate().rev() {
		store.push(Instruction::Var(store_op(ty), LvIndex(slot_for_param[i])));
	}
	if !handler_is_static {
		store.push(Instruction::Var(VarOp::AStore, LvIndex(base)));
	}

	let mut spliced = clone_relabeled(&body.instructions, code);
	shift_locals(&mut spliced, base);
	strip_trailing_returns(&mut spliced);

	let mut replacement = store;
	replacement.extend(spliced);
	code.replace_at(site, replacement);
	Ok(())
}

fn shift_locals(instructions: &mut [Instruction], base: u16) {
	for instr in instructions.iter_mut() {
		match instr {
			Instruction::Var(_, LvIndex(idx)) => *idx += base,
			Instruction::IInc(LvIndex(idx), _) => *idx += base,
			_ => {}
		}
	}
}

/// Strips a single trailing return, leaving its value (if any) on the stack for the call site to
/// consume. Inline bodies with internal early returns aren't supported — `MemberCopy` is the
/// fallback for anything with control flow that doesn't reduce to straight-line code.
fn strip_trailing_returns(instructions: &mut Vec<Instruction>) {
	while matches!(instructions.last(), Some(Instruction::Insn(op)) if op.is_return()) {
		instructions.pop();
	}
}
