//! One handler per directive kind (§4.2), applied in a fixed order against a single
//! target/transformer class pair. `weave-registry` owns the transformer manager that drives
//! re-transformation and fail-strategy; this crate only knows how to apply one pass.

pub mod annotation_names;
pub mod callback;
pub mod context;
pub mod directive;
pub mod error;
pub mod handlers;

use context::HandlerCtx;
use error::WeaveError;
use handlers::asm::AsmHook;

/// Runs the full thirteen-step §4.2 pipeline against one target/transformer pair. `top`/`bottom`
/// are the `CASM(TOP)`/`CASM(BOTTOM)` hooks a transformer class registered for this application,
/// if any.
pub fn apply_pipeline(ctx: &mut HandlerCtx, top: &[Box<AsmHook>], bottom: &[Box<AsmHook>]) -> Result<(), WeaveError> {
	handlers::asm::apply_top(ctx, top)?;
	handlers::inner_class_opener::apply(ctx);
	handlers::synthetic_renamer::apply(ctx);
	handlers::shadow::apply(ctx)?;
	handlers::override_handler::apply(ctx)?;
	handlers::wrap_catch::apply(ctx)?;
	handlers::inject::apply(ctx)?;
	handlers::redirect::apply(ctx)?;
	handlers::modify_constant::apply(ctx)?;
	handlers::inline::apply(ctx)?;
	handlers::upgrade::apply(ctx)?;
	handlers::member_copy::apply(ctx)?;
	handlers::asm::apply_bottom(ctx, bottom)?;
	Ok(())
}
