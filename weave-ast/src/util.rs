//! Free-standing helpers that turn a [`Type`] into the right opcode family, and that clone
//! instruction runs across label spaces. `weave-handlers` leans on these heavily: `Inject` picks
//! load opcodes for captured locals by type, `ModifyConstant`/`Redirect` box and unbox values
//! crossing the transformer boundary, and `Inline`/`MemberCopy` duplicate instruction runs that
//! must not alias the labels of the code they came from.

use std::collections::HashMap;

use crate::tree::code::{Code, Instruction, JumpOp, LabelId, MethodOp, Op, VarOp};
use crate::tree::descriptor::{OpCategory, Type};
use crate::tree::method::{MethodDescriptor, MethodName};

/// The `xLOAD` for `ty`'s category.
pub fn load_op(ty: &Type) -> VarOp {
	match ty.op_category() {
		OpCategory::Int => VarOp::ILoad,
		OpCategory::Long => VarOp::LLoad,
		OpCategory::Float => VarOp::FLoad,
		OpCategory::Double => VarOp::DLoad,
		OpCategory::Ref => VarOp::ALoad,
		OpCategory::Void => panic!("void has no load opcode"),
	}
}

/// The `xSTORE` for `ty`'s category.
pub fn store_op(ty: &Type) -> VarOp {
	match ty.op_category() {
		OpCategory::Int => VarOp::IStore,
		OpCategory::Long => VarOp::LStore,
		OpCategory::Float => VarOp::FStore,
		OpCategory::Double => VarOp::DStore,
		OpCategory::Ref => VarOp::AStore,
		OpCategory::Void => panic!("void has no store opcode"),
	}
}

/// The `xRETURN` (or plain `RETURN` for `void`) for `ty`.
pub fn return_op(ty: &Type) -> Op {
	match ty.op_category() {
		OpCategory::Int => Op::IReturn,
		OpCategory::Long => Op::LReturn,
		OpCategory::Float => Op::FReturn,
		OpCategory::Double => Op::DReturn,
		OpCategory::Ref => Op::AReturn,
		OpCategory::Void => Op::Return,
	}
}

/// The `xALOAD`/`xASTORE` opcodes are not modelled here since `weave-handlers` never needs to
/// synthesize array element access; only local-variable and return-family opcode selection is.

/// Bytecode that boxes a value of primitive type `ty` sitting on top of the stack into its
/// wrapper class, via `Wrapper.valueOf(prim)`. Reference types are left alone (returns an empty
/// sequence): a caller that always calls this when crossing an `Object`-typed boundary doesn't
/// need to special-case reference types itself.
pub fn box_instructions(ty: &Type) -> Vec<Instruction> {
	if ty.is_reference() {
		return Vec::new();
	}
	let wrapper = ty.boxed_class();
	let desc = MethodDescriptor::from_parts(std::slice::from_ref(ty), &Type::Object(wrapper.clone()));
	vec![Instruction::Method(
		MethodOp::InvokeStatic,
		crate::tree::method::MethodRef { class: wrapper, name: MethodName::from("valueOf"), desc },
		false,
	)]
}

/// Bytecode that unboxes a wrapper reference on top of the stack back down to primitive `ty`, via
/// `Wrapper.xValue()`. No-op for reference types.
pub fn unbox_instructions(ty: &Type) -> Vec<Instruction> {
	if ty.is_reference() {
		return Vec::new();
	}
	let wrapper = ty.boxed_class();
	let method_name = match ty {
		Type::B => "byteValue",
		Type::C => "charValue",
		Type::D => "doubleValue",
		Type::F => "floatValue",
		Type::I => "intValue",
		Type::J => "longValue",
		Type::S => "shortValue",
		Type::Z => "booleanValue",
		_ => unreachable!("reference types returned above"),
	};
	let desc = MethodDescriptor::from_parts(&[], ty);
	vec![Instruction::Method(
		MethodOp::InvokeVirtual,
		crate::tree::method::MethodRef { class: wrapper, name: MethodName::from(method_name), desc },
		false,
	)]
}

/// Clones `instructions` into `dest`, minting a fresh label in `dest` for every distinct
/// [`LabelId`] encountered so the copy can be spliced in without colliding with (or silently
/// aliasing) the labels of the code it's copied from. Jump targets, `LineNumber` markers and
/// `TableSwitch`/`LookupSwitch` targets are rewritten to the fresh labels; everything else is
/// cloned as-is. Used by `Inline` (splicing a target method's body in) and `MemberCopy`
/// (duplicating a copied member's code, if it has any control flow of its own to preserve).
pub fn clone_relabeled(instructions: &[Instruction], dest: &mut Code) -> Vec<Instruction> {
	let mut remap: HashMap<LabelId, LabelId> = HashMap::new();
	let fresh = |remap: &mut HashMap<LabelId, LabelId>, dest: &mut Code, label: LabelId| -> LabelId {
		*remap.entry(label).or_insert_with(|| dest.fresh_label())
	};

	instructions
		.iter()
		.map(|instr| match instr {
			Instruction::Label(l) => Instruction::Label(fresh(&mut remap, dest, *l)),
			Instruction::LineNumber(line, l) => Instruction::LineNumber(*line, fresh(&mut remap, dest, *l)),
			Instruction::Jump(op, l) => Instruction::Jump(*op, fresh(&mut remap, dest, *l)),
			Instruction::TableSwitch { default, low, high, table } => Instruction::TableSwitch {
				default: fresh(&mut remap, dest, *default),
				low: *low,
				high: *high,
				table: table.iter().map(|l| fresh(&mut remap, dest, *l)).collect(),
			},
			Instruction::LookupSwitch { default, pairs } => Instruction::LookupSwitch {
				default: fresh(&mut remap, dest, *default),
				pairs: pairs.iter().map(|(k, l)| (*k, fresh(&mut remap, dest, *l))).collect(),
			},
			other => other.clone(),
		})
		.collect()
}

pub fn is_field_access(instr: &Instruction, get: bool, static_: bool) -> bool {
	matches!(instr, Instruction::Field(op, _) if op.is_get() == get && op.is_static() == static_)
}

pub fn jump_is_unconditional(op: JumpOp) -> bool {
	matches!(op, JumpOp::Goto)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tree::class::ClassName;

	#[test]
	fn load_store_return_pick_right_family() {
		assert_eq!(load_op(&Type::J), VarOp::LLoad);
		assert_eq!(store_op(&Type::Object(ClassName::from("java/lang/String"))), VarOp::AStore);
		assert_eq!(return_op(&Type::Void), Op::Return);
		assert_eq!(return_op(&Type::D), Op::DReturn);
	}

	#[test]
	fn box_unbox_roundtrip_on_int() {
		let boxed = box_instructions(&Type::I);
		assert_eq!(boxed.len(), 1);
		match &boxed[0] {
			Instruction::Method(MethodOp::InvokeStatic, m, false) => {
				assert_eq!(m.class.as_str(), "java/lang/Integer");
				assert_eq!(m.name.as_str(), "valueOf");
			}
			_ => panic!("expected invokestatic valueOf"),
		}

		let unboxed = unbox_instructions(&Type::I);
		match &unboxed[0] {
			Instruction::Method(MethodOp::InvokeVirtual, m, false) => assert_eq!(m.name.as_str(), "intValue"),
			_ => panic!("expected invokevirtual intValue"),
		}
	}

	#[test]
	fn box_unbox_are_noop_on_reference_types() {
		let ty = Type::Object(ClassName::from("java/lang/String"));
		assert!(box_instructions(&ty).is_empty());
		assert!(unbox_instructions(&ty).is_empty());
	}

	#[test]
	fn clone_relabeled_rewrites_jump_targets_without_aliasing() {
		let mut src = Code::new(0, 0);
		let l0 = src.fresh_label();
		src.instructions = vec![
			Instruction::Jump(JumpOp::Goto, l0),
			Instruction::Label(l0),
			Instruction::Insn(Op::Return),
		];

		let mut dest = Code::new(0, 0);
		let dest_l0 = dest.fresh_label();
		let cloned = clone_relabeled(&src.instructions, &mut dest);

		let (jump_target, label_target) = match (&cloned[0], &cloned[1]) {
			(Instruction::Jump(JumpOp::Goto, j), Instruction::Label(l)) => (*j, *l),
			_ => panic!("unexpected shape"),
		};
		assert_eq!(jump_target, label_target);
		assert_ne!(jump_target, l0, "clone must mint fresh labels, not alias the source's");
		assert_ne!(jump_target, dest_l0, "clone must not collide with labels already present in dest");
	}
}
