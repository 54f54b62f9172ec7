//! Crate error type. Only parsing boundaries surface errors; rendering degrades instead.

/// Errors raised while decoding configuration, path data or workflow documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("path data must start with a move command: {0:?}")]
	PathData(String),
	#[error("unsupported path segment in {0:?}")]
	UnsupportedPathSegment(String),
	#[error("invalid workflow document: {0}")]
	InvalidWorkflow(String),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;
