//! Body passes and the pipeline that runs them.
//!
//! Converted body → pass 1 → pass 2 → ... → final body
//!
//! Every pass receives the body produced by the previous one and returns a new body;
//! no pass mutates its input. Diagnostics of all passes are collected in order.

use crate::config::AnalysisConfig;
use crate::error::PipelineError;
use crate::ir::Body;
use crate::type_assigner::{Diagnostic, TypeAssigner};
use crate::types::TypeHierarchy;

/// Result of one pass, or of a whole pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct InterceptOutcome {
    pub body: Body,
    pub diagnostics: Vec<Diagnostic>,
}

/// A body-rewriting pass.
pub trait BodyInterceptor: std::fmt::Debug {
    /// Name of this pass
    fn name(&self) -> &str;

    /// Produce a new body from `body`
    fn intercept(
        &self,
        body: &Body,
        hierarchy: &dyn TypeHierarchy,
    ) -> Result<InterceptOutcome, PipelineError>;
}

#[derive(Debug, Default)]
pub struct BodyPipeline {
    passes: Vec<Box<dyn BodyInterceptor>>,
}

impl BodyPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default pipeline: type assignment.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let mut pipeline = Self::new();
        pipeline.push(TypeAssigner::new(config.type_assigner.clone()));
        pipeline
    }

    pub fn push(&mut self, pass: impl BodyInterceptor + 'static) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in order; the first failing pass stops the pipeline.
    pub fn run(
        &self,
        body: &Body,
        hierarchy: &dyn TypeHierarchy,
    ) -> Result<InterceptOutcome, PipelineError> {
        let mut current = body.clone();
        let mut diagnostics = Vec::new();
        for pass in &self.passes {
            let _span = tracing::debug_span!("pass", name = pass.name()).entered();
            let outcome = pass.intercept(&current, hierarchy)?;
            outcome
                .body
                .validate()
                .map_err(|source| PipelineError::InvalidBody {
                    pass: pass.name().to_string(),
                    method: current.signature().to_string(),
                    source,
                })?;
            diagnostics.extend(outcome.diagnostics);
            current = outcome.body;
        }
        Ok(InterceptOutcome {
            body: current,
            diagnostics,
        })
    }
}
