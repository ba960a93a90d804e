//! Constants describing the `Callback` runtime class (SPEC_FULL.md §3 data model). The core
//! never generates this class's bytecode — only emits references to it, per the "external
//! collaborators" boundary in §1 — so this module is just the fixed vocabulary `Inject` codegen
//! needs: the class name and each member's name/descriptor.

use weave_ast::tree::class::ClassName;
use weave_ast::tree::code::{Instruction, MethodOp, Op, TypeOp};
use weave_ast::tree::method::{MethodDescriptor, MethodName, MethodRef};

pub fn class_name() -> ClassName {
	ClassName::from("weave/runtime/Callback")
}

fn method_ref(name: &str, desc: &str) -> MethodRef {
	MethodRef { class: class_name(), name: MethodName::from(name), desc: MethodDescriptor::from(desc) }
}

pub fn ctor_cancellable() -> MethodRef {
	method_ref("<init>", "(Z)V")
}

pub fn ctor_with_value() -> MethodRef {
	method_ref("<init>", "(ZLjava/lang/Object;)V")
}

pub fn is_cancelled() -> MethodRef {
	method_ref("isCancelled", "()Z")
}

pub fn get_return_value() -> MethodRef {
	method_ref("getReturnValue", "()Ljava/lang/Object;")
}

/// `NEW Callback; DUP; ICONST_{0,1}; [push boxed return value]; INVOKESPECIAL <init>` — builds a
/// fresh `Callback` instance on top of the stack. `boxed_return_value` is the (possibly empty)
/// instruction sequence that pushes the already-boxed current return value; empty means there's
/// no return-value slot to seed it from (e.g. a `HEAD` injection), so the single-arg constructor
/// is used instead.
pub fn construct(cancellable: bool, boxed_return_value: Vec<Instruction>) -> Vec<Instruction> {
	let mut out = vec![Instruction::Type(TypeOp::New, class_name()), Instruction::Insn(Op::Dup), Instruction::IntPush(if cancellable { 1 } else { 0 })];
	if boxed_return_value.is_empty() {
		out.push(Instruction::Method(MethodOp::InvokeSpecial, ctor_cancellable(), false));
	} else {
		out.extend(boxed_return_value);
		out.push(Instruction::Method(MethodOp::InvokeSpecial, ctor_with_value(), false));
	}
	out
}
