//! Frontend error types

use thiserror::Error;

/// Errors raised while decoding a foreign class or method.
#[derive(Error, Debug)]
pub enum FrontendError {
    /// The JSON document did not match the foreign model
    #[error("malformed foreign class document: {0}")]
    Json(#[from] serde_json::Error),

    /// An instruction names a destination outside of its method's stream
    #[error("instruction {index} of '{method}' branches to {target}, but the stream has {len} instructions")]
    TargetOutOfRange {
        method: String,
        index: usize,
        target: usize,
        len: usize,
    },
}

/// Result type for frontend operations
pub type FrontendResult<T> = Result<T, FrontendError>;
