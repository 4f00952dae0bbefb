use super::BodyError;
use thiserror::Error;

/// What went wrong while converting one method.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionErrorKind {
    /// A foreign type reference with no IR counterpart
    #[error("unsupported type reference '{0}'")]
    UnsupportedType(String),

    #[error("unsupported instruction '{opcode}' at index {index}")]
    UnsupportedInstruction { index: usize, opcode: String },

    #[error("unsupported operand at index {index}: {detail}")]
    UnsupportedOperand { index: usize, detail: String },

    #[error("instruction {index} branches to {target}, outside of the instruction stream")]
    InvalidBranchTarget { index: usize, target: usize },

    #[error("malformed exception table entry {entry}: {reason}")]
    MalformedExceptionTable { entry: usize, reason: String },

    #[error("invalid class name '{0}'")]
    InvalidClassName(String),

    #[error("converted body is invalid: {0}")]
    InvalidBody(#[from] BodyError),
}

/// Failure to convert a method; fatal to that method only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot convert {method}: {kind}")]
pub struct ConversionError {
    /// Method the failure belongs to, as `Class.name`
    pub method: String,
    pub kind: ConversionErrorKind,
}

impl ConversionError {
    pub fn new(method: impl Into<String>, kind: ConversionErrorKind) -> Self {
        Self {
            method: method.into(),
            kind,
        }
    }
}
