//! Step 3 of §4.2: renames synthetic members on the transformer class to globally-unique names,
//! so copying them into the target later (step 12, `MemberCopy`) can't collide with an existing
//! member the target (or some other transformer already applied to it) happens to carry.
//!
//! The actual rename happens here, on the transformer's own clone; the old->new mapping is
//! recorded in the identifier map so any other transformer member's body that still calls the
//! synthetic member under its old name gets rewritten by `MemberCopy`.

use weave_ast::tree::field::FieldName;
use weave_ast::tree::method::MethodName;

use crate::context::HandlerCtx;

pub fn apply(ctx: &mut HandlerCtx) {
	let transformer_name = ctx.transformer.name.get_simple_name().to_owned();

	for i in 0..ctx.transformer.methods.len() {
		if !ctx.transformer.methods[i].access.is_synthetic || ctx.transformer.methods[i].name.is_constructor() {
			continue;
		}
		let old = ctx.transformer.methods[i].as_name_and_desc();
		let fresh = ctx.transformer.fresh_member_name(&format!("{}$synthetic${}", transformer_name, old.name));
		ctx.transformer.methods[i].name = MethodName::from(fresh.as_str());
		ctx.id_map.map_method(old, ctx.transformer.methods[i].as_name_and_desc());
	}

	for i in 0..ctx.transformer.fields.len() {
		if !ctx.transformer.fields[i].access.is_synthetic {
			continue;
		}
		let old = weave_ast::tree::field::FieldNameAndDesc { name: ctx.transformer.fields[i].name.clone(), desc: ctx.transformer.fields[i].descriptor.clone() };
		let fresh = ctx.transformer.fresh_member_name(&format!("{}$synthetic${}", transformer_name, old.name));
		ctx.transformer.fields[i].name = FieldName::from(fresh.as_str());
		ctx.id_map.map_field(old, weave_ast::tree::field::FieldNameAndDesc { name: ctx.transformer.fields[i].name.clone(), desc: ctx.transformer.fields[i].descriptor.clone() });
	}
}
