use super::local::LocalId;
use super::value::{Condition, IdentityRef, Immediate, InvokeExpr, Place, Value};
use jimple_ir_frontend::SourcePosition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a [`Stmt`] in its body's statement sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StmtId(pub u32);

impl StmtId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Source position a statement (or body) was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PositionInfo {
    pub position: Option<SourcePosition>,
}

impl PositionInfo {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn at(position: SourcePosition) -> Self {
        Self {
            position: Some(position),
        }
    }
}

impl From<Option<SourcePosition>> for PositionInfo {
    fn from(position: Option<SourcePosition>) -> Self {
        Self { position }
    }
}

/// One arm of a switch statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub value: i32,
    pub target: StmtId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    /// `local := @this | @parameterN | @caughtexception`
    Identity { local: LocalId, value: IdentityRef },
    /// `target = value`
    Assign { target: Place, value: Value },
    /// Invoke whose result is discarded
    Invoke(InvokeExpr),
    If { condition: Condition, target: StmtId },
    Goto { target: StmtId },
    Switch {
        key: Immediate,
        cases: Vec<SwitchCase>,
        default: StmtId,
    },
    Return(Immediate),
    ReturnVoid,
    Throw(Immediate),
}

/// A statement with its source position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub position: PositionInfo,
}

impl Stmt {
    pub fn new(kind: StmtKind, position: PositionInfo) -> Self {
        Self { kind, position }
    }

    /// The local this statement defines, if any
    pub fn def(&self) -> Option<LocalId> {
        match &self.kind {
            StmtKind::Identity { local, .. } => Some(*local),
            StmtKind::Assign { target, .. } => target.defined_local(),
            _ => None,
        }
    }

    pub fn def_slot_mut(&mut self) -> Option<&mut LocalId> {
        match &mut self.kind {
            StmtKind::Identity { local, .. } => Some(local),
            StmtKind::Assign {
                target: Place::Local(local),
                ..
            } => Some(local),
            _ => None,
        }
    }

    /// Locals read by this statement, in operand order (duplicates kept)
    pub fn uses(&self) -> Vec<LocalId> {
        match &self.kind {
            StmtKind::Identity { .. } | StmtKind::Goto { .. } | StmtKind::ReturnVoid => Vec::new(),
            StmtKind::Assign { target, value } => {
                let mut uses = target.locals();
                uses.extend(value.locals());
                uses
            }
            StmtKind::Invoke(expr) => expr.locals(),
            StmtKind::If { condition, .. } => condition.locals(),
            StmtKind::Switch { key, .. } | StmtKind::Return(key) | StmtKind::Throw(key) => {
                key.local().into_iter().collect()
            }
        }
    }

    /// Use-boxes: one mutable slot per local read, owned by this statement.
    pub fn use_slots_mut(&mut self) -> Vec<&mut LocalId> {
        match &mut self.kind {
            StmtKind::Identity { .. } | StmtKind::Goto { .. } | StmtKind::ReturnVoid => Vec::new(),
            StmtKind::Assign { target, value } => {
                let mut slots = target.local_slots_mut();
                slots.extend(value.local_slots_mut());
                slots
            }
            StmtKind::Invoke(expr) => expr.local_slots_mut(),
            StmtKind::If { condition, .. } => condition.local_slots_mut(),
            StmtKind::Switch { key, .. } | StmtKind::Return(key) | StmtKind::Throw(key) => {
                key.local_mut().into_iter().collect()
            }
        }
    }

    /// Branch destinations in operand order (switch: cases, then default)
    pub fn targets(&self) -> Vec<StmtId> {
        match &self.kind {
            StmtKind::If { target, .. } | StmtKind::Goto { target } => vec![*target],
            StmtKind::Switch { cases, default, .. } => cases
                .iter()
                .map(|c| c.target)
                .chain(std::iter::once(*default))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn targets_mut(&mut self) -> Vec<&mut StmtId> {
        match &mut self.kind {
            StmtKind::If { target, .. } | StmtKind::Goto { target } => vec![target],
            StmtKind::Switch { cases, default, .. } => cases
                .iter_mut()
                .map(|c| &mut c.target)
                .chain(std::iter::once(default))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether control may continue with the next statement in sequence
    pub fn falls_through(&self) -> bool {
        !matches!(
            self.kind,
            StmtKind::Goto { .. }
                | StmtKind::Switch { .. }
                | StmtKind::Return(_)
                | StmtKind::ReturnVoid
                | StmtKind::Throw(_)
        )
    }

    pub fn is_branch(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::If { .. } | StmtKind::Goto { .. } | StmtKind::Switch { .. }
        )
    }

    /// The invoke expression of an invoke statement or an assignment from an invoke
    pub fn invoke_expr(&self) -> Option<&InvokeExpr> {
        match &self.kind {
            StmtKind::Invoke(expr) => Some(expr),
            StmtKind::Assign { value, .. } => value.as_invoke(),
            _ => None,
        }
    }
}
