use crate::ir::{LocalId, StmtId};
use thiserror::Error;

/// A violated body invariant, reported by [`crate::ir::Body::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BodyError {
    #[error("statement {stmt} references local {local}, which the body does not declare")]
    UndeclaredLocal { stmt: StmtId, local: LocalId },

    #[error("statement {stmt} branches to {target}, which is not a statement of the body")]
    DanglingBranchTarget { stmt: StmtId, target: StmtId },

    #[error("trap {trap} refers to {target}, which is not a statement of the body")]
    DanglingTrapTarget { trap: usize, target: StmtId },

    #[error("trap {trap} begins at {begin}, after its end {end}")]
    InvertedTrapRange {
        trap: usize,
        begin: StmtId,
        end: StmtId,
    },

    #[error("statement {stmt} is last in the body but falls through")]
    FallsOffEnd { stmt: StmtId },

    #[error("local name '{0}' is declared more than once")]
    DuplicateLocalName(String),
}
