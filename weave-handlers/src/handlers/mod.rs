//! One module per step of the fixed §4.2 pipeline, in pipeline order. [`crate::apply_pipeline`]
//! is what actually sequences them; this module just groups the thirteen implementations.

pub mod asm;
pub mod inner_class_opener;
pub mod synthetic_renamer;
pub mod shadow;
pub mod override_handler;
pub mod wrap_catch;
pub mod inject;
pub mod redirect;
pub mod modify_constant;
pub mod inline;
pub mod upgrade;
pub mod member_copy;
