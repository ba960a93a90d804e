//! The rewrite pass: walks a cloned class node and rewrites every class/field/method reference
//! it contains — instructions, the exception table, and annotations (their `Type`-valued
//! attributes and their own annotation-interface descriptor) — through a [`Remapper`].

use weave_ast::tree::annotation::{Annotation, ElementValue};
use weave_ast::tree::class::ClassNode;
use weave_ast::tree::code::{Code, Constant, Instruction};
use weave_ast::tree::method::MethodNode;

use crate::Remapper;

/// Clones `class` and rewrites every reference inside it through `remapper`. The class's own
/// identity (its `name` field) is left untouched — callers that also rename the class itself do
/// so separately, after this pass, the same way `MemberCopy`/hotswap redefinition do.
pub fn remap_class(remapper: &Remapper, class: &ClassNode) -> ClassNode {
	let mut cloned = class.clone();
	remap_class_in_place(remapper, &mut cloned);
	cloned
}

pub fn remap_class_in_place(remapper: &Remapper, class: &mut ClassNode) {
	if let Some(super_class) = &class.super_class {
		class.super_class = Some(remapper.map_class_name(super_class));
	}
	for iface in &mut class.interfaces {
		*iface = remapper.map_class_name(iface);
	}

	for field in &mut class.fields {
		field.descriptor = remapper.map_field_desc(&field.descriptor);
		remap_annotations(remapper, &mut field.visible_annotations);
		remap_annotations(remapper, &mut field.invisible_annotations);
	}

	for method in &mut class.methods {
		remap_method(remapper, method);
	}

	for inner in &mut class.inner_classes {
		inner.inner_class = remapper.map_class_name(&inner.inner_class);
		if let Some(outer) = &inner.outer_class {
			inner.outer_class = Some(remapper.map_class_name(outer));
		}
	}

	remap_annotations(remapper, &mut class.visible_annotations);
	remap_annotations(remapper, &mut class.invisible_annotations);
}

fn remap_method(remapper: &Remapper, method: &mut MethodNode) {
	method.descriptor = remapper.map_method_desc(&method.descriptor);
	for exc in &mut method.exceptions {
		*exc = remapper.map_class_name(exc);
	}
	remap_annotations(remapper, &mut method.visible_annotations);
	remap_annotations(remapper, &mut method.invisible_annotations);

	if let Some(code) = &mut method.code {
		remap_code(remapper, code);
	}
}

fn remap_code(remapper: &Remapper, code: &mut Code) {
	for instr in &mut code.instructions {
		match instr {
			Instruction::Field(_, field_ref) => {
				let owner = field_ref.class.clone();
				let mapped = remapper.map_field_name(&owner, &field_ref.name, &field_ref.desc);
				field_ref.class = remapper.map_class_name(&owner);
				field_ref.name = mapped.name;
				field_ref.desc = mapped.desc;
			}
			Instruction::Method(_, method_ref, _) => {
				let owner = method_ref.class.clone();
				let mapped = remapper.map_method_name(&owner, &method_ref.name, &method_ref.desc);
				method_ref.class = remapper.map_class_name(&owner);
				method_ref.name = mapped.name;
				method_ref.desc = mapped.desc;
			}
			Instruction::Type(_, class_name) => *class_name = remapper.map_class_name(class_name),
			Instruction::MultiANewArray(class_name, _) => *class_name = remapper.map_class_name(class_name),
			Instruction::Ldc(constant) => remap_constant(remapper, constant),
			Instruction::InvokeDynamic(indy) => indy.descriptor = remapper.map_method_desc(&indy.descriptor),
			_ => {}
		}
	}

	for exception in &mut code.exception_table {
		if let Some(catch_type) = &exception.catch_type {
			exception.catch_type = Some(remapper.map_class_name(catch_type));
		}
	}
}

fn remap_constant(remapper: &Remapper, constant: &mut Constant) {
	match constant {
		Constant::Class(class_name) => *class_name = remapper.map_class_name(class_name),
		Constant::MethodType(desc) => *desc = remapper.map_method_desc(desc),
		Constant::Int(_) | Constant::Long(_) | Constant::Float(_) | Constant::Double(_) | Constant::String(_) => {}
	}
}

fn remap_annotations(remapper: &Remapper, annotations: &mut [Annotation]) {
	for annotation in annotations {
		remap_annotation(remapper, annotation);
	}
}

fn remap_annotation(remapper: &Remapper, annotation: &mut Annotation) {
	annotation.descriptor = remapper.map_desc(&annotation.descriptor);
	for pair in &mut annotation.values {
		remap_element_value(remapper, &mut pair.value);
	}
}

fn remap_element_value(remapper: &Remapper, value: &mut ElementValue) {
	match value {
		ElementValue::Class(class_name) => *class_name = remapper.map_class_name(class_name),
		ElementValue::Enum { descriptor, .. } => *descriptor = remapper.map_desc(descriptor),
		ElementValue::Array(items) => {
			for item in items {
				remap_element_value(remapper, item);
			}
		}
		ElementValue::Annotation(inner) => remap_annotation(remapper, inner),
		ElementValue::Bool(_) | ElementValue::Int(_) | ElementValue::Long(_) | ElementValue::Float(_) | ElementValue::Double(_) | ElementValue::String(_) => {}
	}
}
