//! Static types of the statement IR.
//!
//! # Module Organization
//!
//! - `mod.rs`: Type representation (Type, PrimitiveType, ClassType, ArrayType) + Display
//! - `ops.rs`: Lattice operations (join, assignability, int-like classification)
//! - `hierarchy.rs`: Class hierarchy queries (TypeHierarchy trait, ClassHierarchy table)
//! - `tests.rs`: Tests

mod hierarchy;
mod ops;

pub use hierarchy::{ClassHierarchy, TypeHierarchy};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `java.lang.Object`, the root of every reference type.
pub static JAVA_LANG_OBJECT: Lazy<ClassType> = Lazy::new(|| ClassType::new("java.lang.Object"));
/// `java.lang.Throwable`, the catch-all exception type.
pub static JAVA_LANG_THROWABLE: Lazy<ClassType> =
    Lazy::new(|| ClassType::new("java.lang.Throwable"));
pub static JAVA_LANG_STRING: Lazy<ClassType> = Lazy::new(|| ClassType::new("java.lang.String"));
pub static JAVA_LANG_CLASS: Lazy<ClassType> = Lazy::new(|| ClassType::new("java.lang.Class"));
pub static JAVA_LANG_CLONEABLE: Lazy<ClassType> =
    Lazy::new(|| ClassType::new("java.lang.Cloneable"));
pub static JAVA_IO_SERIALIZABLE: Lazy<ClassType> =
    Lazy::new(|| ClassType::new("java.io.Serializable"));

/// JVM primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    /// Java keyword for this primitive
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Types the JVM stores in a single int slot.
    pub fn is_int_like(self) -> bool {
        matches!(
            self,
            PrimitiveType::Boolean
                | PrimitiveType::Byte
                | PrimitiveType::Char
                | PrimitiveType::Short
                | PrimitiveType::Int
        )
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A class or interface type, named by its fully-qualified dotted name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassType {
    name: String,
}

impl ClassType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Fully-qualified name (`java.lang.String`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without the package prefix
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Package part of the name, empty for the default package
    pub fn package_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }

    pub fn is_object(&self) -> bool {
        self == &*JAVA_LANG_OBJECT
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Array type with a non-array base and a dimension of at least one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArrayType {
    base: Box<Type>,
    dimension: usize,
}

impl ArrayType {
    /// Build an array type around `element`; an array element adds its own dimensions.
    ///
    /// A `dimension` of zero is treated as one.
    pub fn new(element: Type, dimension: usize) -> Self {
        let dimension = dimension.max(1);
        match element {
            Type::Array(inner) => Self {
                base: inner.base,
                dimension: inner.dimension + dimension,
            },
            base => Self {
                base: Box::new(base),
                dimension,
            },
        }
    }

    /// The innermost non-array type
    pub fn base(&self) -> &Type {
        &self.base
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Type of one element: the base for one-dimensional arrays, otherwise an array of one
    /// dimension less.
    pub fn element_type(&self) -> Type {
        if self.dimension == 1 {
            (*self.base).clone()
        } else {
            Type::Array(ArrayType {
                base: self.base.clone(),
                dimension: self.dimension - 1,
            })
        }
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for _ in 0..self.dimension {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// A static type.
///
/// `Bottom` means "no information yet" and is the identity of the join; `Unknown` is
/// the top element and marks a conflicting, unsatisfiable typing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(ArrayType),
    Null,
    Void,
    Bottom,
    Unknown,
}

impl Type {
    pub const BOOLEAN: Type = Type::Primitive(PrimitiveType::Boolean);
    pub const BYTE: Type = Type::Primitive(PrimitiveType::Byte);
    pub const CHAR: Type = Type::Primitive(PrimitiveType::Char);
    pub const SHORT: Type = Type::Primitive(PrimitiveType::Short);
    pub const INT: Type = Type::Primitive(PrimitiveType::Int);
    pub const LONG: Type = Type::Primitive(PrimitiveType::Long);
    pub const FLOAT: Type = Type::Primitive(PrimitiveType::Float);
    pub const DOUBLE: Type = Type::Primitive(PrimitiveType::Double);

    /// Class type from a fully-qualified dotted name
    pub fn class(name: impl Into<String>) -> Type {
        Type::Class(ClassType::new(name))
    }

    /// Array of `dimension` levels around `element`
    pub fn array(element: Type, dimension: usize) -> Type {
        Type::Array(ArrayType::new(element, dimension))
    }

    pub fn object() -> Type {
        Type::Class(JAVA_LANG_OBJECT.clone())
    }

    pub fn throwable() -> Type {
        Type::Class(JAVA_LANG_THROWABLE.clone())
    }

    pub fn string() -> Type {
        Type::Class(JAVA_LANG_STRING.clone())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Class, array and null types
    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Array(_) | Type::Null)
    }

    pub fn is_int_like(&self) -> bool {
        matches!(self, Type::Primitive(p) if p.is_int_like())
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            Type::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Whether this type carries usable information (neither bottom nor unknown)
    pub fn is_known(&self) -> bool {
        !matches!(self, Type::Bottom | Type::Unknown)
    }
}

impl From<PrimitiveType> for Type {
    fn from(p: PrimitiveType) -> Self {
        Type::Primitive(p)
    }
}

impl From<ClassType> for Type {
    fn from(c: ClassType) -> Self {
        Type::Class(c)
    }
}

impl From<ArrayType> for Type {
    fn from(a: ArrayType) -> Self {
        Type::Array(a)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", p),
            Type::Class(c) => write!(f, "{}", c),
            Type::Array(a) => write!(f, "{}", a),
            Type::Null => f.write_str("null_type"),
            Type::Void => f.write_str("void"),
            Type::Bottom => f.write_str("<bottom>"),
            Type::Unknown => f.write_str("<unknown>"),
        }
    }
}
