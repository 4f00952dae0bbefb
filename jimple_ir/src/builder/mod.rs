//! Conversion of foreign classes and instruction streams into [`Body`] values.
//!
//! A [`Converter`] is one conversion session: it owns the class name table shared by
//! all methods it converts, and hands every method its own body builder. A failure
//! converting one method never affects another.
//!
//! # Module Organization
//!
//! - `body_builder.rs`: Per-method construction phases (identities, traps, branch resolution)
//! - `instruction.rs`: Per-instruction translation rules and register type hints
//! - `class_names.rs`: Foreign class name translation and memoization
//! - `types.rs`: Foreign type, member reference and modifier conversion
//! - `tests.rs`: Tests

mod body_builder;
mod class_names;
mod instruction;
mod types;

pub use class_names::ClassNameTable;

use crate::config::BuilderConfig;
use crate::error::{ConversionError, ConversionErrorKind};
use crate::ir::{Body, FieldSignature, MethodSignature, Modifier, Modifiers, PositionInfo};
use crate::types::{ClassHierarchy, ClassType, Type};
use body_builder::BodyBuilder;
use jimple_ir_frontend::{ForeignClass, ForeignField, ForeignMethod};
use types::{
    convert_class_type, convert_modifiers, convert_type, CLASS_MODIFIERS, FIELD_MODIFIERS,
    METHOD_MODIFIERS,
};

/// Name of the field an inner class uses to reach its enclosing instance.
pub const ENCLOSING_INSTANCE_FIELD: &str = "this$0";

/// A successfully converted method.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedMethod {
    pub signature: MethodSignature,
    pub declared_exceptions: Vec<ClassType>,
    /// `None` for methods without code (abstract, native)
    pub body: Option<Body>,
}

/// Per-method result of converting a class.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBody {
    /// `pkg.Class.name`
    pub method: String,
    pub modifiers: Modifiers,
    pub outcome: Result<ConvertedMethod, ConversionError>,
}

impl MethodBody {
    pub fn body(&self) -> Option<&Body> {
        self.outcome.as_ref().ok().and_then(|m| m.body.as_ref())
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// A declared or synthesized field.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedField {
    pub signature: FieldSignature,
    pub modifiers: Modifiers,
}

/// A converted class: its header, fields and per-method results.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedClass {
    pub class_type: ClassType,
    pub modifiers: Modifiers,
    pub superclass: Option<ClassType>,
    pub interfaces: Vec<ClassType>,
    pub outer_class: Option<ClassType>,
    /// Declared fields in order, then `this$0` for inner classes
    pub fields: Vec<ConvertedField>,
    pub methods: Vec<MethodBody>,
    pub position: PositionInfo,
}

impl ConvertedClass {
    pub fn field(&self, name: &str) -> Option<&ConvertedField> {
        self.fields.iter().find(|f| f.signature.name == name)
    }

    /// The result for the method called `name` (unqualified)
    pub fn method(&self, name: &str) -> Option<&MethodBody> {
        let suffix = format!(".{}", name);
        self.methods.iter().find(|m| m.method.ends_with(&suffix))
    }
}

/// Class name, superclass and interfaces of a foreign class.
struct ClassHeader {
    class_type: ClassType,
    superclass: Option<ClassType>,
    interfaces: Vec<ClassType>,
}

/// A conversion session.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: BuilderConfig,
    names: ClassNameTable,
}

impl Converter {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            names: ClassNameTable::new(),
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Class names translated so far in this session
    pub fn class_names(&self) -> &ClassNameTable {
        &self.names
    }

    /// Display name of a foreign method, `pkg.Class.name`
    fn method_name(&mut self, method: &ForeignMethod) -> String {
        match self.names.class_type(method.declaring_class.name()) {
            Ok(class) => format!("{}.{}", class, method.name),
            Err(_) => format!("{}.{}", method.declaring_class, method.name),
        }
    }

    pub fn method_signature(
        &mut self,
        method: &ForeignMethod,
    ) -> Result<MethodSignature, ConversionError> {
        let name = self.method_name(method);
        self.signature(method)
            .map_err(|kind| ConversionError::new(name, kind))
    }

    fn signature(&mut self, method: &ForeignMethod) -> Result<MethodSignature, ConversionErrorKind> {
        let declaring_class = convert_class_type(&mut self.names, &method.declaring_class)?;
        let parameter_types = method
            .declared_parameter_types()
            .iter()
            .map(|p| convert_type(&mut self.names, p))
            .collect::<Result<Vec<_>, _>>()?;
        let return_type = convert_type(&mut self.names, &method.return_type)?;
        Ok(MethodSignature::new(
            declaring_class,
            method.name.clone(),
            parameter_types,
            return_type,
        ))
    }

    /// Build the body of one method; `Ok(None)` when the method has no code.
    #[tracing::instrument(level = "debug", skip_all, fields(method = %method.name))]
    pub fn convert_method(&mut self, method: &ForeignMethod) -> Result<Option<Body>, ConversionError> {
        let name = self.method_name(method);
        let result = self.build(method);
        if let Err(kind) = &result {
            tracing::debug!(method = %name, error = %kind, "method conversion failed");
        }
        result.map_err(|kind| ConversionError::new(name, kind))
    }

    fn build(&mut self, method: &ForeignMethod) -> Result<Option<Body>, ConversionErrorKind> {
        let Some(code) = &method.code else {
            return Ok(None);
        };
        let signature = self.signature(method)?;
        let builder = BodyBuilder::new(method, code, &mut self.names, &self.config, signature);
        builder.build().map(Some)
    }

    fn convert_metadata(
        &mut self,
        method: &ForeignMethod,
    ) -> Result<ConvertedMethod, ConversionErrorKind> {
        let signature = self.signature(method)?;
        let declared_exceptions = method
            .declared_exceptions
            .iter()
            .map(|e| convert_class_type(&mut self.names, e))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConvertedMethod {
            signature,
            declared_exceptions,
            body: self.build(method)?,
        })
    }

    fn class_header(&mut self, class: &ForeignClass) -> Result<ClassHeader, ConversionErrorKind> {
        let class_type = convert_class_type(&mut self.names, &class.name)?;
        let superclass = class
            .superclass
            .as_ref()
            .map(|s| convert_class_type(&mut self.names, s))
            .transpose()?;
        let interfaces = class
            .interfaces
            .iter()
            .map(|i| convert_class_type(&mut self.names, i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ClassHeader {
            class_type,
            superclass,
            interfaces,
        })
    }

    fn convert_field(
        &mut self,
        class_type: &ClassType,
        field: &ForeignField,
    ) -> Result<ConvertedField, ConversionErrorKind> {
        let ty = convert_type(&mut self.names, &field.field_type)?;
        Ok(ConvertedField {
            signature: FieldSignature::new(class_type.clone(), field.name.clone(), ty),
            modifiers: convert_modifiers(&field.modifiers, FIELD_MODIFIERS),
        })
    }

    /// Convert a class header, its fields and every method.
    ///
    /// A bad class name, supertype or field fails the whole class; a failing method
    /// only fails its own entry in [`ConvertedClass::methods`].
    pub fn convert_class(&mut self, class: &ForeignClass) -> Result<ConvertedClass, ConversionError> {
        let _span = tracing::debug_span!("convert_class", class = %class.name).entered();
        let wrap = |kind: ConversionErrorKind| ConversionError::new(class.name.to_string(), kind);

        let header = self.class_header(class).map_err(wrap)?;
        let outer_class = class
            .outer_class
            .as_ref()
            .map(|o| convert_class_type(&mut self.names, o))
            .transpose()
            .map_err(wrap)?;

        let mut modifiers = convert_modifiers(&class.modifiers, CLASS_MODIFIERS);
        if class.is_interface {
            modifiers.insert(Modifier::Interface);
        }

        let mut fields = class
            .fields
            .iter()
            .map(|f| self.convert_field(&header.class_type, f))
            .collect::<Result<Vec<_>, _>>()
            .map_err(wrap)?;
        if let Some(outer) = &outer_class {
            if !fields.iter().any(|f| f.signature.name == ENCLOSING_INSTANCE_FIELD) {
                tracing::debug!(outer = %outer, "synthesizing enclosing instance field");
                fields.push(ConvertedField {
                    signature: FieldSignature::new(
                        header.class_type.clone(),
                        ENCLOSING_INSTANCE_FIELD,
                        Type::Class(outer.clone()),
                    ),
                    modifiers: std::iter::once(Modifier::Final).collect(),
                });
            }
        }

        let methods = class
            .methods
            .iter()
            .map(|method| {
                let name = self.method_name(method);
                let outcome = self
                    .convert_metadata(method)
                    .map_err(|kind| ConversionError::new(name.clone(), kind));
                if let Err(err) = &outcome {
                    tracing::debug!(error = %err, "skipping method");
                }
                MethodBody {
                    method: name,
                    modifiers: convert_modifiers(&method.modifiers, METHOD_MODIFIERS),
                    outcome,
                }
            })
            .collect();

        Ok(ConvertedClass {
            class_type: header.class_type,
            modifiers,
            superclass: header.superclass,
            interfaces: header.interfaces,
            outer_class,
            fields,
            methods,
            position: PositionInfo::from(class.position),
        })
    }

    /// Record a foreign class and its supertypes in `hierarchy`.
    pub fn register_class(
        &mut self,
        hierarchy: &mut ClassHierarchy,
        class: &ForeignClass,
    ) -> Result<ClassType, ConversionError> {
        let header = self
            .class_header(class)
            .map_err(|kind| ConversionError::new(class.name.to_string(), kind))?;
        let interface_names: Vec<&str> = header.interfaces.iter().map(ClassType::name).collect();
        if class.is_interface {
            hierarchy.add_interface(header.class_type.name(), &interface_names);
        } else {
            hierarchy.add_class(
                header.class_type.name(),
                header.superclass.as_ref().map(ClassType::name),
                &interface_names,
            );
        }
        Ok(header.class_type)
    }

    /// Translate a single foreign type reference within this session.
    pub fn convert_type(
        &mut self,
        ty: &jimple_ir_frontend::TypeReference,
    ) -> Result<Type, ConversionErrorKind> {
        convert_type(&mut self.names, ty)
    }
}
