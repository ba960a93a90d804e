//! `Config` (§2, §6): the settings a host supplies when standing up a [`crate::WeaveEngine`] —
//! the fail strategy, whether hotswap redefinition is enabled, and which wildcard patterns to
//! scan for transformer classes at startup. `serde`-derived the way the rest of the corpus
//! configures long-lived processes (see e.g. `quill`'s mapping-format configs), so a host can load
//! it from a config file rather than constructing it by hand.

use serde::{Deserialize, Serialize};
use weave_registry::FailStrategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub fail_strategy: FailStrategy,
	/// Whether a transformer class redefinition should trigger re-registration and redefinition of
	/// its already-loaded targets (§6 "Hotswap").
	#[serde(default)]
	pub hotswap_enabled: bool,
	/// Dot-form `addTransformer` patterns (`"pkg.*"`, `"pkg.**"`, bare class names) scanned against
	/// a `ClassProvider` at startup.
	#[serde(default)]
	pub wildcard_scan_roots: Vec<String>,
}

impl Default for Config {
	fn default() -> Config {
		Config { fail_strategy: FailStrategy::default(), hotswap_enabled: false, wildcard_scan_roots: Vec::new() }
	}
}
