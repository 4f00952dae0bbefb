//! Static type assignment for body locals.
//!
//! The assigner derives, for every local, the most specific type consistent with its
//! definitions and uses:
//!
//! 1. Every local with definitions starts at bottom; one without keeps its declared type.
//! 2. A worklist joins the types produced by each local's definitions until nothing
//!    changes. Hitting `max_iterations` returns the input body unchanged with a
//!    divergence diagnostic.
//! 3. Locals that only ever hold `null` take the most specific reference type their
//!    uses require.
//! 4. Locals whose type is `<unknown>` or that violate a use constraint are split
//!    along their def-use webs, and only the affected locals are re-typed.
//! 5. Remaining conflicts become diagnostics; the body is still produced.
//!
//! # Module Organization
//!
//! - `typing.rs`: Typing state, definition types and fixed-point propagation
//! - `constraints.rs`: Use requirements and definition dependencies
//! - `splitting.rs`: Reaching definitions, def-use webs and local splitting
//! - `diagnostics.rs`: Diagnostics for unresolved typings
//! - `tests.rs`: Tests

mod constraints;
mod diagnostics;
mod splitting;
mod typing;
#[cfg(test)]
mod tests;

pub use diagnostics::{Diagnostic, DiagnosticKind};

use crate::config::TypeAssignerConfig;
use crate::error::{BodyError, PipelineError};
use crate::ir::{Body, LocalId};
use crate::pipeline::{BodyInterceptor, InterceptOutcome};
use crate::types::{Type, TypeHierarchy};
use splitting::split_locals;
use typing::{Solver, Typing};

/// A typed body and the diagnostics produced while typing it.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAssignment {
    pub body: Body,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct TypeAssigner {
    config: TypeAssignerConfig,
}

impl TypeAssigner {
    pub fn new(config: TypeAssignerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TypeAssignerConfig {
        &self.config
    }

    /// Type every local of `body`, splitting locals used with incompatible types.
    #[tracing::instrument(level = "debug", skip_all, fields(method = %body.signature()))]
    pub fn assign(
        &self,
        body: &Body,
        hierarchy: &dyn TypeHierarchy,
    ) -> Result<TypeAssignment, BodyError> {
        let method = body.signature().to_string();
        let max_iterations = self.config.max_iterations;

        let solver = Solver::new(body, hierarchy, max_iterations);
        let mut typing = solver.initial_typing();
        let all: Vec<LocalId> = body.local_ids().collect();
        let mut converged = solver.solve(&mut typing, &all);

        let conflicted = if self.config.split_conflicts && converged {
            let mut locals: Vec<LocalId> = solver.conflicts(&typing).iter().map(|c| c.local).collect();
            locals.sort();
            locals.dedup();
            locals
        } else {
            Vec::new()
        };

        let input = body;
        let (body, splits) = split_locals(body, &conflicted)?;
        if !splits.is_empty() {
            let solver = Solver::new(&body, hierarchy, max_iterations);
            let touched: Vec<LocalId> = splits
                .iter()
                .flat_map(|s| std::iter::once(s.original).chain(s.created.iter().copied()))
                .collect();
            let affected = solver.dependent_closure(&touched);
            typing = solver.extend_typing(&typing);
            for &local in &affected {
                typing.set(local, solver.initial_type(local));
            }
            converged &= solver.solve(&mut typing, &affected);
        }

        if !converged {
            // Partial typings are never written back.
            let diagnostic = Diagnostic::new(&method, DiagnosticKind::FixedPointDivergence).emit();
            return Ok(TypeAssignment {
                body: input.clone(),
                diagnostics: vec![diagnostic],
            });
        }

        let solver = Solver::new(&body, hierarchy, max_iterations);
        let diagnostics = self.diagnose(&method, &body, &solver, &typing);
        let body = write_back(&body, &typing)?;
        Ok(TypeAssignment { body, diagnostics })
    }

    fn diagnose(
        &self,
        method: &str,
        body: &Body,
        solver: &Solver<'_>,
        typing: &Typing,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for conflict in solver.conflicts(typing) {
            let local = body.local(conflict.local);
            let ty = typing.get(conflict.local).clone();
            let diagnostic = match &conflict.requirement {
                None => Diagnostic::new(method, DiagnosticKind::Unresolved)
                    .with_local(local.name())
                    .with_type(ty),
                Some(requirement) => {
                    let mut diagnostic = Diagnostic::new(method, DiagnosticKind::IncompatibleUse)
                        .with_local(local.name())
                        .with_type(ty)
                        .with_stmt(requirement.stmt);
                    if let Some(expected) = conflict.expected(typing) {
                        diagnostic = diagnostic.with_expected(expected);
                    }
                    diagnostic
                }
            };
            diagnostics.push(diagnostic.emit());
        }
        diagnostics
    }
}

/// The body with every typed local's declared type replaced; bottom keeps the declaration.
fn write_back(body: &Body, typing: &Typing) -> Result<Body, BodyError> {
    let locals = body
        .local_ids()
        .map(|id| {
            let local = body.local(id);
            match typing.get(id) {
                Type::Bottom => local.clone(),
                ty => local.with_type(ty.clone()),
            }
        })
        .collect();
    body.with_locals(locals)
}

impl BodyInterceptor for TypeAssigner {
    fn name(&self) -> &str {
        "type-assigner"
    }

    fn intercept(
        &self,
        body: &Body,
        hierarchy: &dyn TypeHierarchy,
    ) -> Result<InterceptOutcome, PipelineError> {
        let assignment = self
            .assign(body, hierarchy)
            .map_err(|source| PipelineError::InvalidBody {
                pass: self.name().to_string(),
                method: body.signature().to_string(),
                source,
            })?;
        Ok(InterceptOutcome {
            body: assignment.body,
            diagnostics: assignment.diagnostics,
        })
    }
}
