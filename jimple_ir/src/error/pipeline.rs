use super::BodyError;
use thiserror::Error;

/// Failure of a body pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("pass '{pass}' produced an invalid body for {method}: {source}")]
    InvalidBody {
        pass: String,
        method: String,
        #[source]
        source: BodyError,
    },

    #[error("pass '{pass}' failed on {method}: {message}")]
    PassFailed {
        pass: String,
        method: String,
        message: String,
    },
}
