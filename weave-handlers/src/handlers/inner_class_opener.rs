//! Step 2 of §4.2: strips `private`/`protected` off inner classes the transformer references so
//! member bodies copied into the target later can still link against them.

use crate::context::HandlerCtx;

pub fn apply(ctx: &mut HandlerCtx) {
	for inner in &ctx.transformer.inner_classes {
		let mut opened = inner.clone();
		opened.flags.open();

		match ctx.target.inner_classes.iter_mut().find(|i| i.inner_class == opened.inner_class) {
			Some(existing) => existing.flags.open(),
			None => ctx.target.inner_classes.push(opened),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use weave_ast::tree::class::{ClassAccess, ClassName, InnerClass, InnerClassFlags};

	fn class(name: &str) -> weave_ast::ClassNode {
		weave_ast::ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from(name), None, Vec::new())
	}

	#[test]
	fn opens_inner_class_private_flag_and_copies_into_target() {
		let mut target = class("pkg/Target");
		let mut transformer = class("pkg/Mixin");
		transformer.inner_classes.push(InnerClass {
			inner_class: ClassName::from("pkg/Mixin$Helper"),
			outer_class: Some(ClassName::from("pkg/Mixin")),
			inner_name: Some("Helper".to_owned()),
			flags: InnerClassFlags { is_private: true, ..Default::default() },
		});
		let mut id_map = crate::context::IdentifierMap::default();

		apply(&mut HandlerCtx { target: &mut target, transformer: &mut transformer, id_map: &mut id_map });

		let copied = &target.inner_classes[0];
		assert!(!copied.flags.is_private);
		assert!(copied.flags.is_public);
	}
}
