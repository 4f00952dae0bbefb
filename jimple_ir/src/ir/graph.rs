//! Statement-level control flow graph.

use super::body::Body;
use super::stmt::StmtId;

/// Successor and predecessor edges between the statements of a [`Body`].
///
/// Normal edges are fall-through and branch edges. Every statement inside a trap's
/// range also gets an exceptional edge to the trap's handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StmtGraph {
    successors: Vec<Vec<StmtId>>,
    exceptional: Vec<Vec<StmtId>>,
    predecessors: Vec<Vec<StmtId>>,
}

impl StmtGraph {
    pub fn new(body: &Body) -> Self {
        let count = body.stmts().len();
        let mut successors = vec![Vec::new(); count];
        let mut exceptional = vec![Vec::new(); count];
        let mut predecessors = vec![Vec::new(); count];

        for id in body.stmt_ids() {
            let stmt = body.stmt(id);
            let out = &mut successors[id.index()];
            if stmt.falls_through() && id.index() + 1 < count {
                out.push(StmtId(id.0 + 1));
            }
            for target in stmt.targets() {
                if !out.contains(&target) {
                    out.push(target);
                }
            }
        }

        for trap in body.traps() {
            for index in trap.begin.index()..=trap.end.index() {
                let out = &mut exceptional[index];
                if !out.contains(&trap.handler) {
                    out.push(trap.handler);
                }
            }
        }

        for index in 0..count {
            let from = StmtId(index as u32);
            for to in successors[index].iter().chain(&exceptional[index]) {
                let preds = &mut predecessors[to.index()];
                if !preds.contains(&from) {
                    preds.push(from);
                }
            }
        }

        Self {
            successors,
            exceptional,
            predecessors,
        }
    }

    /// Fall-through and branch successors
    pub fn successors(&self, stmt: StmtId) -> &[StmtId] {
        &self.successors[stmt.index()]
    }

    /// Handlers of the traps covering `stmt`
    pub fn exceptional_successors(&self, stmt: StmtId) -> &[StmtId] {
        &self.exceptional[stmt.index()]
    }

    pub fn all_successors(&self, stmt: StmtId) -> impl Iterator<Item = StmtId> + '_ {
        self.successors(stmt)
            .iter()
            .chain(self.exceptional_successors(stmt))
            .copied()
    }

    /// Predecessors over normal and exceptional edges
    pub fn predecessors(&self, stmt: StmtId) -> &[StmtId] {
        &self.predecessors[stmt.index()]
    }

    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Statements reachable from the first statement
    pub fn reachable(&self) -> Vec<bool> {
        let mut seen = vec![false; self.len()];
        let mut stack = Vec::new();
        if !self.is_empty() {
            stack.push(StmtId(0));
        }
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            stack.extend(self.all_successors(id));
        }
        seen
    }
}
