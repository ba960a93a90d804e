use weave_ast::tree::class::ClassName;
use weave_ast::tree::method::{MethodDescriptor, MethodName};
use weave_target::TargetError;

/// The error taxonomy of SPEC_FULL.md §7, minus `ParseError` (never constructed by the core
/// itself — it is the shape a `ClassProvider` implementation is expected to report through its
/// own `anyhow::Error`, see `weave-registry::provider`).
#[derive(Debug, thiserror::Error)]
pub enum WeaveError {
	/// A directive's target string does not parse, or it resolved to an empty anchor set while
	/// not marked `optional`. Both are surfaced through `weave-target`'s own taxonomy.
	#[error("{transformer}.{method}{desc}: {source}")]
	Target {
		transformer: ClassName,
		method: MethodName,
		desc: MethodDescriptor,
		#[source]
		source: TargetError,
	},

	/// A transformer method's signature, staticness or return type doesn't match what its
	/// directive requires.
	#[error("{transformer}.{method}{desc}: {message} (hint: {hint})")]
	TransformerShape {
		transformer: ClassName,
		method: MethodName,
		desc: MethodDescriptor,
		message: String,
		hint: String,
	},

	/// Remapping hit a reference it could not resolve against the target. Surfaced as a warning
	/// by the pipeline; the reference is left as-is (identity fallback) rather than aborting.
	#[error("could not remap {class}.{member}: {reason}")]
	Mapping { class: ClassName, member: String, reason: String },

	/// Any other unexpected failure raised by a handler, tagged with enough context for the
	/// pipeline's fail-strategy decision and for logging.
	#[error("handler {handler} faulted on {target} <- {transformer}: {message}")]
	HandlerFault { handler: &'static str, target: ClassName, transformer: ClassName, message: String },
}

impl WeaveError {
	pub fn shape(transformer: &ClassName, method: &MethodName, desc: &MethodDescriptor, message: impl Into<String>, hint: impl Into<String>) -> WeaveError {
		WeaveError::TransformerShape {
			transformer: transformer.clone(),
			method: method.clone(),
			desc: desc.clone(),
			message: message.into(),
			hint: hint.into(),
		}
	}

	pub fn fault(handler: &'static str, target: &ClassName, transformer: &ClassName, message: impl Into<String>) -> WeaveError {
		WeaveError::HandlerFault { handler, target: target.clone(), transformer: transformer.clone(), message: message.into() }
	}

	/// Shape errors and target errors abort only the offending transformer-on-target pair per the
	/// spec's propagation policy; everything else goes through the configured fail strategy.
	pub fn always_aborts_pair(&self) -> bool {
		matches!(self, WeaveError::Target { .. } | WeaveError::TransformerShape { .. })
	}
}
