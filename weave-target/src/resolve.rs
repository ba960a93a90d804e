use weave_ast::tree::class::ClassName;
use weave_ast::tree::code::{Code, Constant, Instruction, TypeOp};
use weave_ast::tree::field::{FieldDescriptor, FieldName};
use weave_ast::tree::method::{MethodDescriptor, MethodName};

use crate::error::TargetError;
use crate::kind::{ConstantArg, Shift, TargetKind, TargetSpec};
use crate::mnemonic::matches_opcode_arg;

/// Resolves a directive's full target spec (kind, optional slice, optional-empty flag) against a
/// method body, returning the anchor instruction indices in program order.
pub fn resolve_directive(code: &Code, spec: &TargetSpec) -> Result<Vec<usize>, TargetError> {
	let mut anchors = resolve_kind(code, &spec.kind);

	if let Some(slice) = &spec.slice {
		let from = resolve_kind(code, &slice.from);
		let to = resolve_kind(code, &slice.to);
		anchors = match (from.first(), to.last()) {
			(Some(&from_idx), Some(&to_idx)) if from_idx <= to_idx => {
				anchors.into_iter().filter(|idx| *idx >= from_idx && *idx <= to_idx).collect()
			}
			_ => Vec::new(),
		};
	}

	if anchors.is_empty() && !spec.optional {
		return Err(TargetError::TargetNotFound);
	}

	Ok(anchors)
}

/// The insertion position for a given anchor under `shift`: the index to insert new instructions
/// before.
pub fn insertion_point(anchor: usize, shift: Shift) -> usize {
	match shift {
		Shift::Before => anchor,
		Shift::After => anchor + 1,
	}
}

pub fn resolve_kind(code: &Code, kind: &TargetKind) -> Vec<usize> {
	match kind {
		TargetKind::Head => code.first_real_instruction().into_iter().collect(),
		TargetKind::Return => code.return_indices(),
		TargetKind::Tail => code.return_indices().last().copied().into_iter().collect(),
		TargetKind::Throw => throws(code),
		TargetKind::Invoke { owner, name, desc } => invokes(code, owner, name, desc),
		TargetKind::Field { owner, name, desc } => fields(code, owner, name, desc.as_ref(), None),
		TargetKind::GetField { owner, name, desc } => fields(code, owner, name, desc.as_ref(), Some(true)),
		TargetKind::PutField { owner, name, desc } => fields(code, owner, name, desc.as_ref(), Some(false)),
		TargetKind::New { owner } => news(code, owner),
		TargetKind::Opcode(arg) => opcodes(code, arg),
		TargetKind::Constant(arg) => constants(code, arg),
	}
}

/// `ATHROW`s inside a framework-inserted (`WrapCatch`) handler block are excluded: we treat the
/// block as running from the handler's label up to (not including) the next `Label` instruction
/// in program order, which is how this crate's own codegen always terminates a generated handler
/// body. A hand-built `Code` that doesn't follow that convention falls back to matching every
/// `ATHROW`, which is the approximation the spec explicitly permits.
fn throws(code: &Code) -> Vec<usize> {
	let excluded: std::collections::HashSet<usize> = code
		.exception_table
		.iter()
		.filter(|e| e.framework_inserted)
		.filter_map(|e| code.index_of_label(e.handler))
		.flat_map(|start| {
			let end = code.instructions[start..]
				.iter()
				.position(|i| matches!(i, Instruction::Label(_)))
				.map(|offset| start + offset)
				.unwrap_or(code.instructions.len());
			start..end
		})
		.collect();

	code.instructions
		.iter()
		.enumerate()
		.filter(|(idx, instr)| instr.is_athrow() && !excluded.contains(idx))
		.map(|(idx, _)| idx)
		.collect()
}

fn invokes(code: &Code, owner: &ClassName, name: &MethodName, desc: &MethodDescriptor) -> Vec<usize> {
	code.instructions
		.iter()
		.enumerate()
		.filter(|(_, instr)| matches!(instr, Instruction::Method(_, m, _) if &m.class == owner && &m.name == name && &m.desc == desc))
		.map(|(idx, _)| idx)
		.collect()
}

fn fields(code: &Code, owner: &ClassName, name: &FieldName, desc: Option<&FieldDescriptor>, want_get: Option<bool>) -> Vec<usize> {
	code.instructions
		.iter()
		.enumerate()
		.filter(|(_, instr)| match instr {
			Instruction::Field(op, f) => {
				&f.class == owner
					&& &f.name == name
					&& desc.map_or(true, |d| d == &f.desc)
					&& want_get.map_or(true, |get| op.is_get() == get)
			}
			_ => false,
		})
		.map(|(idx, _)| idx)
		.collect()
}

fn news(code: &Code, owner: &ClassName) -> Vec<usize> {
	code.instructions
		.iter()
		.enumerate()
		.filter(|(_, instr)| matches!(instr, Instruction::Type(TypeOp::New, c) if c == owner))
		.map(|(idx, _)| idx)
		.collect()
}

fn opcodes(code: &Code, arg: &str) -> Vec<usize> {
	code.instructions
		.iter()
		.enumerate()
		.filter(|(_, instr)| matches_opcode_arg(instr, arg))
		.map(|(idx, _)| idx)
		.collect()
}

fn constants(code: &Code, arg: &ConstantArg) -> Vec<usize> {
	code.instructions
		.iter()
		.enumerate()
		.filter(|(_, instr)| constant_matches(instr, arg))
		.map(|(idx, _)| idx)
		.collect()
}

fn constant_matches(instr: &Instruction, arg: &ConstantArg) -> bool {
	match (instr, arg) {
		(Instruction::IntPush(v), ConstantArg::Int(want)) => v == want,
		(Instruction::Ldc(Constant::Int(v)), ConstantArg::Int(want)) => v == want,
		(Instruction::Ldc(Constant::Long(v)), ConstantArg::Long(want)) => v == want,
		(Instruction::Ldc(Constant::Float(v)), ConstantArg::Float(want)) => v == want,
		(Instruction::Ldc(Constant::Double(v)), ConstantArg::Double(want)) => v == want,
		(Instruction::Ldc(Constant::String(v)), ConstantArg::String(want)) => v == want,
		_ => false,
	}
}
