//! The crate users actually depend on: `WeaveEngine`, the facade that wires the registry
//! (`weave-registry`), the handler pipeline (`weave-handlers`) and the mapping engine
//! (`weave-remap`) together behind a lock, plus `Config` and the `fatal!` logging macro (§2).

pub mod config;
pub mod engine;
pub mod logging;

pub use config::Config;
pub use engine::WeaveEngine;
pub use weave_handlers::error::WeaveError;
pub use weave_registry::{ClassProvider, FailStrategy, RawHook, RawPhase, RawTransformer, TransformerEntry};
