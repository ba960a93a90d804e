//! The transformer manager's per-class-load orchestration (§2 data flow, §5, §7): given a
//! registry snapshot and a target class, clones and remaps every registered transformer, runs the
//! fixed §4.2 handler chain against it, and folds per-pair faults through the configured fail
//! strategy.
//!
//! §9 models handler outcomes as a tagged result instead of the source's exceptions-for-control-
//! flow; [`HandlerOutcome`] is that tag, recorded per transformer (or raw transformer) so the
//! caller can log or assert on exactly what happened without re-deriving it from the final bytes.

use weave_ast::ClassNode;
use weave_handlers::context::{HandlerCtx, IdentifierMap};
use weave_handlers::error::WeaveError;
use weave_remap::rewrite::remap_class_in_place;
use weave_remap::Remapper;

use crate::fail::FailStrategy;
use crate::raw::RawPhase;
use crate::registry::Registry;

/// The result of applying one transformer (or raw transformer) to a target, per §9's tagged-result
/// design note.
#[derive(Debug)]
pub enum HandlerOutcome {
	Applied,
	Skipped(String),
	Failed(WeaveError),
}

/// The outcome of one `transform_target` call. `class` is `None` when nothing changed the class —
/// either no transformer was registered for it (Invariant 4) or the fail strategy was `Cancel`.
#[derive(Debug)]
pub struct TransformOutcome {
	pub class: Option<ClassNode>,
	pub outcomes: Vec<(String, HandlerOutcome)>,
}

enum FaultAction {
	Continue,
	CancelAll,
}

fn handle_fault(strategy: FailStrategy, err: WeaveError) -> Result<(FaultAction, WeaveError), WeaveError> {
	if err.always_aborts_pair() {
		return Ok((FaultAction::Continue, err));
	}
	match strategy {
		FailStrategy::Continue => Ok((FaultAction::Continue, err)),
		FailStrategy::Cancel => Ok((FaultAction::CancelAll, err)),
		FailStrategy::Exit => Err(err),
	}
}

/// Runs the full per-class-load pipeline for `target_name`/`target` against everything `registry`
/// has registered for it, as of whatever snapshot the caller took (§5: the caller is expected to
/// have already dropped its registry lock by this point, per the "Rust mapping" guidance).
/// `mappings` is the obfuscation remapper (identity `Remapper::new()` if none is configured).
///
/// Returns `Err` only when a fault is neither a shape/target error nor absorbed by `Continue`/
/// `Cancel` — i.e. when the fail strategy is `Exit`. The caller is expected to log and terminate.
pub fn transform_target(registry: &Registry, target_name: &weave_ast::tree::class::ClassName, target: ClassNode, mappings: &Remapper, fail_strategy: FailStrategy) -> Result<TransformOutcome, WeaveError> {
	if !registry.has_transformers_for(target_name) {
		return Ok(TransformOutcome { class: None, outcomes: Vec::new() });
	}

	let mut current = target;
	let mut outcomes = Vec::new();

	for raw in registry.raw_transformers_for(target_name).iter().filter(|r| r.phase == RawPhase::Pre) {
		match (raw.hook)(&mut current) {
			Ok(()) => outcomes.push((raw.name.clone(), HandlerOutcome::Applied)),
			Err(err) => {
				let (action, err) = handle_fault(fail_strategy, err)?;
				outcomes.push((raw.name.clone(), HandlerOutcome::Failed(err)));
				if matches!(action, FaultAction::CancelAll) {
					return Ok(TransformOutcome { class: None, outcomes });
				}
			}
		}
	}

	for entry in registry.transformers_for(target_name) {
		let name = entry.class.name.as_str().to_owned();
		let mut transformer = entry.class.clone();
		remap_class_in_place(mappings, &mut transformer);

		let mut id_map = IdentifierMap::default();
		let mut ctx = HandlerCtx { target: &mut current, transformer: &mut transformer, id_map: &mut id_map };
		match weave_handlers::apply_pipeline(&mut ctx, &entry.top_hooks, &entry.bottom_hooks) {
			Ok(()) => outcomes.push((name, HandlerOutcome::Applied)),
			Err(err) => {
				let (action, err) = handle_fault(fail_strategy, err)?;
				outcomes.push((name, HandlerOutcome::Failed(err)));
				if matches!(action, FaultAction::CancelAll) {
					return Ok(TransformOutcome { class: None, outcomes });
				}
			}
		}
	}

	for raw in registry.raw_transformers_for(target_name).iter().filter(|r| r.phase == RawPhase::Post) {
		match (raw.hook)(&mut current) {
			Ok(()) => outcomes.push((raw.name.clone(), HandlerOutcome::Applied)),
			Err(err) => {
				let (action, err) = handle_fault(fail_strategy, err)?;
				outcomes.push((raw.name.clone(), HandlerOutcome::Failed(err)));
				if matches!(action, FaultAction::CancelAll) {
					return Ok(TransformOutcome { class: None, outcomes });
				}
			}
		}
	}

	Ok(TransformOutcome { class: Some(current), outcomes })
}

#[cfg(test)]
mod tests {
	use super::*;
	use weave_ast::tree::annotation::{Annotation, ElementValue};
	use weave_ast::tree::class::{ClassAccess, ClassName};
	use weave_ast::tree::code::{Code, Instruction, Op};
	use weave_ast::tree::method::{MethodAccess, MethodDescriptor, MethodName, MethodNode};
	use weave_ast::ClassNode;

	use crate::entry::TransformerEntry;

	fn target_with_add() -> ClassNode {
		let mut target = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Target"), None, Vec::new());
		let mut add = MethodNode::new(MethodAccess::default(), MethodName::from("add"), MethodDescriptor::from("(II)I"));
		let mut code = Code::new(2, 2);
		code.instructions.push(Instruction::Var(weave_ast::tree::code::VarOp::ILoad, weave_ast::tree::code::LvIndex(0)));
		code.instructions.push(Instruction::Var(weave_ast::tree::code::VarOp::ILoad, weave_ast::tree::code::LvIndex(1)));
		code.instructions.push(Instruction::Insn(Op::IAdd));
		code.instructions.push(Instruction::Insn(Op::IReturn));
		add.code = Some(code);
		target.methods.push(add);
		target
	}

	#[test]
	fn no_registration_leaves_target_untouched() {
		let registry = Registry::new();
		let outcome = transform_target(&registry, &ClassName::from("pkg/Target"), target_with_add(), &Remapper::new(), FailStrategy::Continue).unwrap();
		assert!(outcome.class.is_none());
	}

	#[test]
	fn head_inject_runs_and_records_applied() {
		let mut registry = Registry::new();
		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		let mut hook = MethodNode::new(MethodAccess::default(), MethodName::from("hook"), MethodDescriptor::from("()V"));
		let target_ann = Annotation::new("Lweave/CTarget;").with("value", ElementValue::String("HEAD".to_owned()));
		hook.visible_annotations.push(
			Annotation::new("Lweave/Inject;")
				.with("method", ElementValue::String("add".to_owned()))
				.with("target", ElementValue::Annotation(Box::new(target_ann))),
		);
		hook.code = Some(Code::new(0, 1));
		transformer.methods.push(hook);

		registry.register_transformer(ClassName::from("pkg/Target"), TransformerEntry::new(transformer));

		let outcome = transform_target(&registry, &ClassName::from("pkg/Target"), target_with_add(), &Remapper::new(), FailStrategy::Continue).unwrap();
		let class = outcome.class.unwrap();
		let add = class.find_method("add", "(II)I").unwrap();
		let code = add.code.as_ref().unwrap();
		assert!(code.instructions.iter().any(|i| matches!(i, Instruction::Method(_, m, _) if m.name.as_str() == "hook")));
		assert!(matches!(outcome.outcomes.as_slice(), [(_, HandlerOutcome::Applied)]));
	}

	#[test]
	fn shape_error_aborts_only_offending_transformer_under_continue() {
		let mut registry = Registry::new();
		let mut transformer = ClassNode::new(ClassAccess { is_public: true, ..Default::default() }, ClassName::from("pkg/Mixin"), None, Vec::new());
		// @Inject on a method whose target doesn't exist -> TransformerShape/Target error, not a HandlerFault.
		let target_ann = Annotation::new("Lweave/CTarget;").with("value", ElementValue::String("HEAD".to_owned()));
		let mut hook = MethodNode::new(MethodAccess::default(), MethodName::from("hook"), MethodDescriptor::from("()V"));
		hook.visible_annotations.push(
			Annotation::new("Lweave/Inject;")
				.with("method", ElementValue::String("missing".to_owned()))
				.with("target", ElementValue::Annotation(Box::new(target_ann))),
		);
		transformer.methods.push(hook);
		registry.register_transformer(ClassName::from("pkg/Target"), TransformerEntry::new(transformer));

		let outcome = transform_target(&registry, &ClassName::from("pkg/Target"), target_with_add(), &Remapper::new(), FailStrategy::Continue).unwrap();
		assert!(outcome.class.is_some());
		assert!(matches!(outcome.outcomes.as_slice(), [(_, HandlerOutcome::Failed(_))]));
	}
}
