//! jimple_ir
//!
//! Typed, Jimple-like statement IR for JVM method bodies.
//!
//! Foreign register-machine instruction streams (see `jimple_ir_frontend`) are turned
//! into validated [`Body`] values by a [`Converter`], then refined by a
//! [`BodyPipeline`] whose default pass, the [`TypeAssigner`], gives every local the
//! most specific static type consistent with its uses.
//!
//! # Example
//!
//! ```
//! use jimple_ir::{AnalysisConfig, BodyPipeline, ClassHierarchy, Converter};
//! use jimple_ir_frontend::ForeignClass;
//!
//! let class = ForeignClass::from_json(r#"{
//!     "name": "LDemo",
//!     "superclass": "Ljava/lang/Object",
//!     "methods": [{
//!         "declaring_class": "LDemo",
//!         "name": "answer",
//!         "modifiers": ["public", "static"],
//!         "return_type": "I",
//!         "code": { "instructions": [
//!             { "op": "constant", "def": 0, "value": { "int": 300 } },
//!             { "op": "return", "value": { "register": 0 } }
//!         ] }
//!     }]
//! }"#)?;
//!
//! let config = AnalysisConfig::default();
//! let mut converter = Converter::new(config.builder.clone());
//! let mut hierarchy = ClassHierarchy::new();
//! converter.register_class(&mut hierarchy, &class)?;
//!
//! let converted = converter.convert_class(&class)?;
//! let body = converted.methods[0].body().expect("method has code");
//! let typed = BodyPipeline::from_config(&config).run(body, &hierarchy)?;
//!
//! assert_eq!(
//!     typed.body.to_string(),
//!     "<Demo: int answer()> {\n    short i0;\n\n    i0 = 300;\n    return i0;\n}"
//! );
//! assert!(typed.diagnostics.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Library code reports through `tracing`, never through stdout/stderr.
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]

// Core IR
pub mod error;
pub mod ir;
pub mod local_generator;
pub mod types;

// Settings
pub mod config;

// Instruction stream → Body
pub mod builder;

// Body passes
pub mod pipeline;
pub mod type_assigner;

// Re-exports
pub use builder::{
    ClassNameTable, ConvertedClass, ConvertedField, ConvertedMethod, Converter, MethodBody,
};
pub use config::{AnalysisConfig, BuilderConfig, ConfigError, TypeAssignerConfig};
pub use error::{BodyError, ConversionError, ConversionErrorKind, PipelineError};
pub use ir::{Body, Local, LocalId, MethodSignature, Stmt, StmtId, StmtKind, Trap};
pub use local_generator::LocalGenerator;
pub use pipeline::{BodyInterceptor, BodyPipeline, InterceptOutcome};
pub use type_assigner::{Diagnostic, DiagnosticKind, TypeAssigner, TypeAssignment};
pub use types::{ClassHierarchy, ClassType, Type, TypeHierarchy};

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_results_are_send_and_sync() {
        assert_send_sync::<Body>();
        assert_send_sync::<TypeAssignment>();
        assert_send_sync::<ConversionError>();
        assert_send_sync::<PipelineError>();
        assert_send_sync::<MethodBody>();
    }

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
