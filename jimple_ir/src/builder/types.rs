//! Foreign type references and metadata → IR types.

use super::class_names::ClassNameTable;
use crate::error::ConversionErrorKind;
use crate::ir::{Constant, FieldSignature, MethodSignature, Modifier, Modifiers};
use crate::types::{ClassType, PrimitiveType, Type, JAVA_LANG_OBJECT};
use jimple_ir_frontend::{
    FieldReference, ForeignConstant, ForeignModifier, MethodReference, PrimitiveDescriptor,
    TypeReference, TypeShape,
};

pub(crate) fn convert_primitive(descriptor: PrimitiveDescriptor) -> PrimitiveType {
    match descriptor {
        PrimitiveDescriptor::Boolean => PrimitiveType::Boolean,
        PrimitiveDescriptor::Byte => PrimitiveType::Byte,
        PrimitiveDescriptor::Char => PrimitiveType::Char,
        PrimitiveDescriptor::Short => PrimitiveType::Short,
        PrimitiveDescriptor::Int => PrimitiveType::Int,
        PrimitiveDescriptor::Long => PrimitiveType::Long,
        PrimitiveDescriptor::Float => PrimitiveType::Float,
        PrimitiveDescriptor::Double => PrimitiveType::Double,
    }
}

pub(crate) fn convert_type(
    names: &mut ClassNameTable,
    ty: &TypeReference,
) -> Result<Type, ConversionErrorKind> {
    match ty.shape() {
        None => Err(ConversionErrorKind::UnsupportedType(ty.name().to_string())),
        Some(TypeShape::Primitive(p)) => Ok(Type::Primitive(convert_primitive(p))),
        Some(TypeShape::Void) => Ok(Type::Void),
        Some(TypeShape::Null) => Ok(Type::Null),
        Some(TypeShape::Class(name)) => names.class_type(name).map(Type::Class),
        Some(TypeShape::Array {
            dimensions,
            innermost,
        }) => {
            let base = convert_type(names, &TypeReference::new(innermost))?;
            Ok(Type::array(base, dimensions))
        }
    }
}

/// Class type for a declaring class; members of array types belong to `java.lang.Object`.
pub(crate) fn convert_class_type(
    names: &mut ClassNameTable,
    ty: &TypeReference,
) -> Result<ClassType, ConversionErrorKind> {
    match convert_type(names, ty)? {
        Type::Class(class) => Ok(class),
        Type::Array(_) => Ok(JAVA_LANG_OBJECT.clone()),
        _ => Err(ConversionErrorKind::UnsupportedType(ty.name().to_string())),
    }
}

pub(crate) fn convert_method_ref(
    names: &mut ClassNameTable,
    method: &MethodReference,
) -> Result<MethodSignature, ConversionErrorKind> {
    let declaring_class = convert_class_type(names, &method.declaring_class)?;
    let parameter_types = method
        .parameter_types
        .iter()
        .map(|p| convert_type(names, p))
        .collect::<Result<Vec<_>, _>>()?;
    let return_type = convert_type(names, &method.return_type)?;
    Ok(MethodSignature::new(
        declaring_class,
        method.name.clone(),
        parameter_types,
        return_type,
    ))
}

pub(crate) fn convert_field_ref(
    names: &mut ClassNameTable,
    field: &FieldReference,
) -> Result<FieldSignature, ConversionErrorKind> {
    Ok(FieldSignature::new(
        convert_class_type(names, &field.declaring_class)?,
        field.name.clone(),
        convert_type(names, &field.field_type)?,
    ))
}

pub(crate) fn convert_constant(
    names: &mut ClassNameTable,
    constant: &ForeignConstant,
) -> Result<Constant, ConversionErrorKind> {
    Ok(match constant {
        ForeignConstant::Int(v) => Constant::Int(*v),
        ForeignConstant::Long(v) => Constant::Long(*v),
        ForeignConstant::Float(v) => Constant::Float(*v),
        ForeignConstant::Double(v) => Constant::Double(*v),
        ForeignConstant::String(s) => Constant::String(s.clone()),
        ForeignConstant::Null => Constant::Null,
        ForeignConstant::Class(t) => Constant::Class(convert_type(names, t)?),
    })
}

/// Modifiers a method may carry.
pub(crate) const METHOD_MODIFIERS: &[Modifier] = &[
    Modifier::Public,
    Modifier::Private,
    Modifier::Protected,
    Modifier::Static,
    Modifier::Final,
    Modifier::Abstract,
    Modifier::Synchronized,
    Modifier::Native,
    Modifier::Synthetic,
];

/// Modifiers a field may carry.
pub(crate) const FIELD_MODIFIERS: &[Modifier] = &[
    Modifier::Public,
    Modifier::Private,
    Modifier::Protected,
    Modifier::Static,
    Modifier::Final,
    Modifier::Volatile,
    Modifier::Transient,
];

/// Modifiers a class may carry.
pub(crate) const CLASS_MODIFIERS: &[Modifier] = &[
    Modifier::Public,
    Modifier::Private,
    Modifier::Final,
    Modifier::Abstract,
    Modifier::Synthetic,
    Modifier::Interface,
];

fn convert_modifier(modifier: ForeignModifier) -> Option<Modifier> {
    match modifier {
        ForeignModifier::Public => Some(Modifier::Public),
        ForeignModifier::Private => Some(Modifier::Private),
        ForeignModifier::Protected => Some(Modifier::Protected),
        ForeignModifier::Static => Some(Modifier::Static),
        ForeignModifier::Final => Some(Modifier::Final),
        ForeignModifier::Abstract => Some(Modifier::Abstract),
        ForeignModifier::Synchronized => Some(Modifier::Synchronized),
        ForeignModifier::Native => Some(Modifier::Native),
        ForeignModifier::Synthetic => Some(Modifier::Synthetic),
        ForeignModifier::Volatile => Some(Modifier::Volatile),
        ForeignModifier::Transient => Some(Modifier::Transient),
        ForeignModifier::Interface => Some(Modifier::Interface),
        ForeignModifier::Bridge | ForeignModifier::Varargs | ForeignModifier::Strictfp => None,
    }
}

/// Keep the modifiers in `allowed`; bridge, varargs and strictfp are always dropped.
pub(crate) fn convert_modifiers(modifiers: &[ForeignModifier], allowed: &[Modifier]) -> Modifiers {
    modifiers
        .iter()
        .filter_map(|m| convert_modifier(*m))
        .filter(|m| allowed.contains(m))
        .collect()
}
