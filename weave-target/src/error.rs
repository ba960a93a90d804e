use thiserror::Error;

#[derive(Debug, Error)]
pub enum TargetError {
	#[error("invalid injection target {arg:?}: {reason}")]
	InvalidTarget { arg: String, reason: String },

	#[error("target resolved to no instructions and is not marked optional")]
	TargetNotFound,
}
