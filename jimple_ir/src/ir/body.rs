use super::local::{Local, LocalId};
use super::signature::MethodSignature;
use super::stmt::{PositionInfo, Stmt, StmtId};
use crate::error::BodyError;
use crate::types::ClassType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Exception handler covering the statements `begin..=end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trap {
    pub exception: ClassType,
    pub begin: StmtId,
    pub end: StmtId,
    pub handler: StmtId,
}

impl Trap {
    pub fn covers(&self, stmt: StmtId) -> bool {
        self.begin <= stmt && stmt <= self.end
    }
}

/// A method body: locals, statements in order, traps and the body position.
///
/// Bodies are validated on construction and never mutated afterwards; passes
/// produce new bodies through [`Body::with_locals`], [`Body::with_stmts`] and
/// [`Body::with_parts`].
///
/// Invariants:
/// 1. every local a statement references is declared in the body
/// 2. every branch and trap target is a statement of the body
/// 3. a non-empty body does not fall off its last statement
/// 4. local names are unique
///
/// Deserialization goes through [`Body::new`], so a decoded body is validated too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBody")]
pub struct Body {
    signature: MethodSignature,
    locals: Vec<Local>,
    stmts: Vec<Stmt>,
    traps: Vec<Trap>,
    position: PositionInfo,
}

/// Unvalidated wire form of [`Body`].
#[derive(Deserialize)]
struct RawBody {
    signature: MethodSignature,
    locals: Vec<Local>,
    stmts: Vec<Stmt>,
    traps: Vec<Trap>,
    position: PositionInfo,
}

impl TryFrom<RawBody> for Body {
    type Error = BodyError;

    fn try_from(raw: RawBody) -> Result<Self, Self::Error> {
        Body::new(raw.signature, raw.locals, raw.stmts, raw.traps, raw.position)
    }
}

impl Body {
    /// Assemble and validate a body
    pub fn new(
        signature: MethodSignature,
        locals: Vec<Local>,
        stmts: Vec<Stmt>,
        traps: Vec<Trap>,
        position: PositionInfo,
    ) -> Result<Body, BodyError> {
        let body = Body {
            signature,
            locals,
            stmts,
            traps,
            position,
        };
        body.validate()?;
        Ok(body)
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn locals(&self) -> &[Local] {
        &self.locals
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn traps(&self) -> &[Trap] {
        &self.traps
    }

    pub fn position(&self) -> PositionInfo {
        self.position
    }

    pub fn local(&self, id: LocalId) -> &Local {
        &self.locals[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn local_ids(&self) -> impl Iterator<Item = LocalId> {
        (0..self.locals.len() as u32).map(LocalId)
    }

    pub fn stmt_ids(&self) -> impl Iterator<Item = StmtId> {
        (0..self.stmts.len() as u32).map(StmtId)
    }

    pub fn local_by_name(&self, name: &str) -> Option<LocalId> {
        self.locals
            .iter()
            .position(|l| l.name() == name)
            .map(|i| LocalId(i as u32))
    }

    pub fn first_stmt(&self) -> Option<StmtId> {
        (!self.stmts.is_empty()).then_some(StmtId(0))
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Statements defining `local`
    pub fn defs_of(&self, local: LocalId) -> Vec<StmtId> {
        self.stmt_ids()
            .filter(|id| self.stmt(*id).def() == Some(local))
            .collect()
    }

    /// Statements reading `local`
    pub fn uses_of(&self, local: LocalId) -> Vec<StmtId> {
        self.stmt_ids()
            .filter(|id| self.stmt(*id).uses().contains(&local))
            .collect()
    }

    /// Statements targeted by a branch or a trap, in statement order
    pub fn branch_targets(&self) -> Vec<StmtId> {
        let mut targets: Vec<StmtId> = self
            .stmts
            .iter()
            .flat_map(Stmt::targets)
            .chain(
                self.traps
                    .iter()
                    .flat_map(|t| [t.begin, t.end, t.handler]),
            )
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }

    /// New body with replaced locals
    pub fn with_locals(&self, locals: Vec<Local>) -> Result<Body, BodyError> {
        self.with_parts(locals, self.stmts.clone(), self.traps.clone())
    }

    /// New body with replaced statements
    pub fn with_stmts(&self, stmts: Vec<Stmt>) -> Result<Body, BodyError> {
        self.with_parts(self.locals.clone(), stmts, self.traps.clone())
    }

    /// New body with replaced locals, statements and traps
    pub fn with_parts(
        &self,
        locals: Vec<Local>,
        stmts: Vec<Stmt>,
        traps: Vec<Trap>,
    ) -> Result<Body, BodyError> {
        Body::new(self.signature.clone(), locals, stmts, traps, self.position)
    }

    /// Check all body invariants, reporting the first violation.
    pub fn validate(&self) -> Result<(), BodyError> {
        let mut names = HashSet::new();
        for local in &self.locals {
            if !names.insert(local.name()) {
                return Err(BodyError::DuplicateLocalName(local.name().to_string()));
            }
        }

        let local_count = self.locals.len();
        let stmt_count = self.stmts.len();
        for (id, stmt) in self.stmt_ids().zip(&self.stmts) {
            for local in stmt.def().into_iter().chain(stmt.uses()) {
                if local.index() >= local_count {
                    return Err(BodyError::UndeclaredLocal { stmt: id, local });
                }
            }
            for target in stmt.targets() {
                if target.index() >= stmt_count {
                    return Err(BodyError::DanglingBranchTarget { stmt: id, target });
                }
            }
        }

        for (index, trap) in self.traps.iter().enumerate() {
            for target in [trap.begin, trap.end, trap.handler] {
                if target.index() >= stmt_count {
                    return Err(BodyError::DanglingTrapTarget {
                        trap: index,
                        target,
                    });
                }
            }
            if trap.begin > trap.end {
                return Err(BodyError::InvertedTrapRange {
                    trap: index,
                    begin: trap.begin,
                    end: trap.end,
                });
            }
        }

        if let Some(last) = self.stmts.last() {
            if last.falls_through() {
                return Err(BodyError::FallsOffEnd {
                    stmt: StmtId(stmt_count as u32 - 1),
                });
            }
        }
        Ok(())
    }
}
