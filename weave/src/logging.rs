//! The four-level Logger contract of §6, over the `log` facade. `info!`/`warn!`/`error!` are
//! `log`'s own macros, used directly throughout this crate and `weave-registry`; `fatal!` is the
//! one addition this subsystem needs — it logs at error level and then applies the `Exit` fail
//! strategy by terminating the process, matching "errors are either logged+null or logged+exit"
//! (§7) for the one case that isn't a plain return value.

/// Logs `$($arg)*` at error level, then terminates the process. The only place `EXIT` fail
/// strategy decisions are actually carried out — `weave-registry`'s pipeline only ever reports
/// that `Exit` was hit, as a `WeaveError`, so it stays testable without ending the test process.
#[macro_export]
macro_rules! fatal {
	($($arg:tt)*) => {{
		log::error!($($arg)*);
		std::process::exit(1);
	}};
}
