//! The transformer registry and per-class-load pipeline (§2, §3): maps target class names to the
//! transformer classes and raw transformers registered against them, resolves wildcard
//! registration against a `ClassProvider`, and drives one target's transformation through
//! `weave-handlers`'s fixed thirteen-step chain. Concurrency (the `RwLock<Registry>` of §5) and
//! hotswap orchestration live one level up, in `WeaveEngine` (`weave` crate) — this crate owns the
//! data and the single-call transformation logic, not the lock or the process-wide singleton.

pub mod entry;
pub mod fail;
pub mod mixin;
pub mod pipeline;
pub mod provider;
pub mod raw;
pub mod registry;
pub mod wildcard;

pub use entry::TransformerEntry;
pub use fail::FailStrategy;
pub use pipeline::{transform_target, HandlerOutcome, TransformOutcome};
pub use provider::ClassProvider;
pub use raw::{RawHook, RawPhase, RawTransformer};
pub use registry::Registry;
