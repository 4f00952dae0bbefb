//! jimple_ir_frontend
//!
//! Foreign, per-method instruction stream model consumed by the `jimple_ir` body builder.
//!
//! The model describes a register machine the way a bytecode front end hands it over:
//! an ordered list of instructions addressed by their position, each naming registers,
//! inline constants and branch destinations by instruction index, plus the method's
//! exception table and debug positions. Type and class names stay in the foreign
//! descriptor syntax (`Ljava/lang/String`, `[I`, `J`); translating them is the
//! builder's job.
//!
//! # Example
//!
//! ```
//! use jimple_ir_frontend::{ForeignClass, InstructionKind};
//!
//! let json = r#"{
//!     "name": "LDemo",
//!     "superclass": "Ljava/lang/Object",
//!     "methods": [{
//!         "declaring_class": "LDemo",
//!         "name": "run",
//!         "parameter_types": ["LDemo"],
//!         "return_type": "V",
//!         "code": { "instructions": [{ "op": "return" }] }
//!     }]
//! }"#;
//!
//! let class = ForeignClass::from_json(json).expect("valid class");
//! let code = class.methods[0].code.as_ref().expect("method has code");
//! assert!(matches!(code.instructions[0].kind, InstructionKind::Return { value: None }));
//! ```

pub mod error;
pub mod instruction;
pub mod method;
pub mod position;
pub mod type_ref;

// Re-exports
pub use error::{FrontendError, FrontendResult};
pub use instruction::{
    BinaryOperator, ConditionOperator, ForeignConstant, ForeignInstruction, InstructionKind,
    InvokeKind, Operand, Register, SwitchCase,
};
pub use method::{
    ExceptionHandlerEntry, FieldReference, ForeignClass, ForeignCode, ForeignField,
    ForeignMethod, ForeignModifier, MethodReference,
};
pub use position::SourcePosition;
pub use type_ref::{PrimitiveDescriptor, TypeReference, TypeShape};

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
