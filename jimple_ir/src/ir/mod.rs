//! Statement IR: bodies, statements, values and locals.
//!
//! # Module Organization
//!
//! - `local.rs`: Local variables and their arena ids
//! - `value.rs`: Expressions, operands and constants
//! - `stmt.rs`: Statements, statement ids and positions
//! - `signature.rs`: Method/field signatures and modifiers
//! - `body.rs`: Body, Trap and invariant checks
//! - `graph.rs`: Statement-level control flow graph
//! - `printer.rs`: Jimple-like Display for Body
//! - `tests.rs`: Tests

mod body;
mod graph;
mod local;
mod printer;
mod signature;
mod stmt;
mod value;
#[cfg(test)]
mod tests;

pub use body::{Body, Trap};
pub use graph::StmtGraph;
pub use local::{Local, LocalId};
pub use signature::{FieldSignature, MethodSignature, Modifier, Modifiers};
pub use stmt::{PositionInfo, Stmt, StmtId, StmtKind, SwitchCase};
pub use value::{
    BinaryOp, Condition, ConditionOp, Constant, IdentityRef, Immediate, InvokeExpr, InvokeKind,
    Place, Value,
};
