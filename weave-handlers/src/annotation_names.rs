//! Descriptor strings for the directive annotations a transformer class and its members carry.
//!
//! The spec treats "the specific annotation-parsing reflection glue" as out of scope (§1); these
//! constants are this crate's concrete stand-in for that glue's vocabulary, named after the
//! literal annotation names the spec's own scenarios use (`@Inject`, `@CRedirect`, `@CTarget`,
//! `@CModifyConstant`, `@CConstant`), extended in the same `C`-prefixed style for the directive
//! kinds the scenarios don't spell out.

pub const MIXIN: &str = "Lweave/CMixin;";

pub const INJECT: &str = "Lweave/Inject;";
pub const REDIRECT: &str = "Lweave/CRedirect;";
pub const MODIFY_CONSTANT: &str = "Lweave/CModifyConstant;";
pub const WRAP_CATCH: &str = "Lweave/CWrapCatch;";
pub const OVERRIDE: &str = "Lweave/COverride;";
pub const SHADOW: &str = "Lweave/CShadow;";
pub const INLINE: &str = "Lweave/CInline;";
pub const UPGRADE: &str = "Lweave/CUpgrade;";

pub const TARGET: &str = "Lweave/CTarget;";
pub const SLICE: &str = "Lweave/CSlice;";
pub const CONSTANT: &str = "Lweave/CConstant;";
pub const LOCAL_VARIABLE: &str = "Lweave/CLocalVariable;";
