//! The fail strategy (§6/§7): the process-wide policy applied when a handler reports a fault that
//! isn't a shape/target contract violation (those always abort just the offending pair regardless
//! of strategy, per `WeaveError::always_aborts_pair`).

/// `Config` in the `weave` crate holds one of these and threads it into every `transform` call;
/// it lives here, next to the pipeline code that actually consults it, rather than in `weave`
/// itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FailStrategy {
	/// Log the fault and proceed with the remaining handlers/transformers.
	#[default]
	Continue,
	/// Abandon the whole class's transformation; the original bytes are returned unchanged.
	Cancel,
	/// Terminate the process. The actual `std::process::exit` call lives in `weave`'s `fatal!`
	/// macro, one layer up, so this crate's own tests can observe the decision being made without
	/// killing the test process.
	Exit,
}
