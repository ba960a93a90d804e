//! A typed, mutable AST over JVM class files.
//!
//! This crate plays the role the spec calls "the bytecode reader/writer library" — an
//! externally-owned tree the transformation core is handed and mutates in place. Nothing here
//! parses or writes the binary `.class` container; a [`tree::class::ClassNode`] is assumed to
//! already exist (constructed by a host, a test fixture, or some future `weave-classfile` crate).

pub mod tree;
pub mod util;

pub use tree::class::ClassNode;
pub use tree::field::FieldNode;
pub use tree::method::MethodNode;
