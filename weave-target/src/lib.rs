//! The injection target resolver: turns a directive's symbolic target (`HEAD`, `RETURN`,
//! `INVOKE owner.name desc`, ...) into anchor instruction indices inside a method body.
//!
//! Grounded on `duke`'s `Code`/`Instruction` shapes (reused from `weave-ast`) and on `quill`'s
//! habit of splitting "parse the textual form" from "resolve it against a tree" into separate
//! modules ([`parse`] vs [`resolve`]).

pub mod error;
pub mod kind;
pub mod mnemonic;
pub mod parse;
pub mod resolve;

pub use error::TargetError;
pub use kind::{ConstantArg, Shift, Slice, TargetKind, TargetSpec};
pub use parse::parse_target;
pub use resolve::{insertion_point, resolve_directive, resolve_kind};
