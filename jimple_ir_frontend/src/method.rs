//! Method and class metadata handed over by the front end.

use crate::error::{FrontendError, FrontendResult};
use crate::instruction::ForeignInstruction;
use crate::position::SourcePosition;
use crate::type_ref::TypeReference;
use serde::{Deserialize, Serialize};

/// Access and property flags as the front end reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignModifier {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Abstract,
    Synchronized,
    Native,
    Synthetic,
    Volatile,
    Transient,
    Interface,
    Bridge,
    Varargs,
    Strictfp,
}

/// Symbolic reference to a method, as named by an invoke.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodReference {
    pub declaring_class: TypeReference,
    pub name: String,
    /// Declared parameters only; never includes a receiver
    #[serde(default)]
    pub parameter_types: Vec<TypeReference>,
    pub return_type: TypeReference,
}

/// Symbolic reference to a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldReference {
    pub declaring_class: TypeReference,
    pub name: String,
    pub field_type: TypeReference,
}

/// One row of a method's exception table.
///
/// `start` and `end` are inclusive instruction indices. An entry without a
/// `handler` protects nothing; a missing `catch_type` catches everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionHandlerEntry {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub handler: Option<usize>,
    #[serde(default)]
    pub catch_type: Option<TypeReference>,
}

/// Instruction stream of a method that has code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForeignCode {
    pub instructions: Vec<ForeignInstruction>,
    #[serde(default)]
    pub exception_table: Vec<ExceptionHandlerEntry>,
    #[serde(default)]
    pub body_position: Option<SourcePosition>,
}

/// A method as the front end describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignMethod {
    pub declaring_class: TypeReference,
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<ForeignModifier>,
    /// Parameter types; for instance methods entry 0 is the receiver
    #[serde(default)]
    pub parameter_types: Vec<TypeReference>,
    pub return_type: TypeReference,
    #[serde(default)]
    pub declared_exceptions: Vec<TypeReference>,
    /// Absent for abstract and native methods
    #[serde(default)]
    pub code: Option<ForeignCode>,
}

impl ForeignMethod {
    pub fn has_modifier(&self, modifier: ForeignModifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier(ForeignModifier::Static)
    }

    pub fn is_abstract(&self) -> bool {
        self.has_modifier(ForeignModifier::Abstract)
    }

    pub fn is_native(&self) -> bool {
        self.has_modifier(ForeignModifier::Native)
    }

    /// Declared parameter types, with the receiver slot of instance methods skipped.
    pub fn declared_parameter_types(&self) -> &[TypeReference] {
        if self.is_static() || self.parameter_types.is_empty() {
            &self.parameter_types
        } else {
            &self.parameter_types[1..]
        }
    }

    /// Register holding declared parameter `index`.
    pub fn parameter_register(&self, index: usize) -> u32 {
        let slot = if self.is_static() { index } else { index + 1 };
        slot as u32
    }

    /// Check that every branch destination lies in the stream.
    ///
    /// Exception table indices are not checked here; the body builder rejects a
    /// malformed table for the one method that carries it.
    pub fn validate_targets(&self) -> FrontendResult<()> {
        let Some(code) = &self.code else {
            return Ok(());
        };
        let len = code.instructions.len();
        for (index, instruction) in code.instructions.iter().enumerate() {
            for target in instruction.kind.branch_targets() {
                if target >= len {
                    return Err(FrontendError::TargetOutOfRange {
                        method: self.name.clone(),
                        index,
                        target,
                        len,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A field declared by a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignField {
    pub name: String,
    pub field_type: TypeReference,
    #[serde(default)]
    pub modifiers: Vec<ForeignModifier>,
}

/// A class with the fields and methods the front end extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignClass {
    pub name: TypeReference,
    #[serde(default)]
    pub modifiers: Vec<ForeignModifier>,
    #[serde(default)]
    pub superclass: Option<TypeReference>,
    #[serde(default)]
    pub interfaces: Vec<TypeReference>,
    #[serde(default)]
    pub is_interface: bool,
    /// Enclosing class of an inner class
    #[serde(default)]
    pub outer_class: Option<TypeReference>,
    #[serde(default)]
    pub fields: Vec<ForeignField>,
    #[serde(default)]
    pub methods: Vec<ForeignMethod>,
    #[serde(default)]
    pub position: Option<SourcePosition>,
}

impl ForeignClass {
    /// A class with no supertypes, fields or methods
    pub fn new(name: TypeReference) -> Self {
        Self {
            name,
            modifiers: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            is_interface: false,
            outer_class: None,
            fields: Vec::new(),
            methods: Vec::new(),
            position: None,
        }
    }

    /// Decode a class document and check its branch destinations.
    pub fn from_json(json: &str) -> FrontendResult<Self> {
        let class: ForeignClass = serde_json::from_str(json)?;
        for method in &class.methods {
            method.validate_targets()?;
        }
        Ok(class)
    }

    /// Serialize back to pretty-printed JSON
    pub fn to_json(&self) -> FrontendResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn method(&self, name: &str) -> Option<&ForeignMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&ForeignField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
