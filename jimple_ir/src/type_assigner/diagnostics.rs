//! Typing diagnostics.
//!
//! A diagnostic never aborts type assignment: the body is still produced, with the
//! offending local left at the type the analysis reached.

use crate::ir::StmtId;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a local could not be given a satisfying type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The local's type is `<unknown>` after splitting
    Unresolved,
    /// A use of the local is not assignable from its type
    IncompatibleUse,
    /// The worklist hit `max_iterations` before reaching a fixed point
    FixedPointDivergence,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Unresolved => write!(f, "unresolved type"),
            DiagnosticKind::IncompatibleUse => write!(f, "incompatible use"),
            DiagnosticKind::FixedPointDivergence => write!(f, "fixed point not reached"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Method signature, as displayed
    pub method: String,
    pub kind: DiagnosticKind,
    pub local: Option<String>,
    /// Type the local ended up with
    pub ty: Option<Type>,
    /// Type required at the offending use
    pub expected: Option<Type>,
    pub stmt: Option<StmtId>,
}

impl Diagnostic {
    pub fn new(method: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            method: method.into(),
            kind,
            local: None,
            ty: None,
            expected: None,
            stmt: None,
        }
    }

    pub fn with_local(mut self, local: impl Into<String>) -> Self {
        self.local = Some(local.into());
        self
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_expected(mut self, expected: Type) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_stmt(mut self, stmt: StmtId) -> Self {
        self.stmt = Some(stmt);
        self
    }

    /// Log the diagnostic and hand it back.
    pub(crate) fn emit(self) -> Self {
        tracing::warn!(
            method = %self.method,
            local = self.local.as_deref().unwrap_or("-"),
            "{}",
            self
        );
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(local) = &self.local {
            write!(f, " of {}", local)?;
        }
        if let Some(ty) = &self.ty {
            write!(f, ": {}", ty)?;
        }
        if let Some(expected) = &self.expected {
            write!(f, " where {} is required", expected)?;
        }
        if let Some(stmt) = self.stmt {
            write!(f, " at {}", stmt)?;
        }
        write!(f, " in {}", self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new("<Demo: void run()>", DiagnosticKind::IncompatibleUse)
            .with_local("r1")
            .with_type(Type::INT)
            .with_expected(Type::string())
            .with_stmt(StmtId(3));
        assert_eq!(
            diagnostic.to_string(),
            "incompatible use of r1: int where java.lang.String is required at s3 in <Demo: void run()>"
        );

        let divergence = Diagnostic::new("<Demo: void run()>", DiagnosticKind::FixedPointDivergence);
        assert_eq!(
            divergence.to_string(),
            "fixed point not reached in <Demo: void run()>"
        );
    }
}
