//! Type references in the foreign descriptor syntax.
//!
//! The front end names types the way the JVM class file format does, without the
//! trailing `;` on class names:
//!
//! ```text
//! Z B C S I J F D      primitives (boolean byte char short int long float double)
//! V                    void
//! Ljava/lang/String    class type
//! [I  [[Ljava/util/Map array types, one '[' per dimension
//! null                 the type of the null constant
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive descriptor characters of the foreign format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveDescriptor {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveDescriptor {
    /// Decode a single descriptor character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'Z' => Some(Self::Boolean),
            'B' => Some(Self::Byte),
            'C' => Some(Self::Char),
            'S' => Some(Self::Short),
            'I' => Some(Self::Int),
            'J' => Some(Self::Long),
            'F' => Some(Self::Float),
            'D' => Some(Self::Double),
            _ => None,
        }
    }

    /// The descriptor character for this primitive.
    pub fn as_char(self) -> char {
        match self {
            Self::Boolean => 'Z',
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Short => 'S',
            Self::Int => 'I',
            Self::Long => 'J',
            Self::Float => 'F',
            Self::Double => 'D',
        }
    }
}

/// Structural view of a [`TypeReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape<'a> {
    Primitive(PrimitiveDescriptor),
    Void,
    Null,
    /// Class name in foreign syntax, including the leading `L`.
    Class(&'a str),
    /// Array with `dimensions` levels around a non-array innermost element.
    Array {
        dimensions: usize,
        innermost: &'a str,
    },
}

/// A type named in foreign descriptor syntax.
///
/// The reference is kept verbatim; [`TypeReference::shape`] classifies it and returns
/// `None` for names this model does not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeReference(String);

impl TypeReference {
    /// Create a type reference from a raw foreign name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Class reference from a slash-separated internal name (`java/lang/String`)
    pub fn class(internal_name: &str) -> Self {
        Self(format!("L{}", internal_name))
    }

    /// Array reference with `dimensions` levels around `element`
    pub fn array_of(element: &TypeReference, dimensions: usize) -> Self {
        Self(format!("{}{}", "[".repeat(dimensions), element.0))
    }

    pub fn primitive(descriptor: PrimitiveDescriptor) -> Self {
        Self(descriptor.as_char().to_string())
    }

    pub fn void() -> Self {
        Self("V".to_string())
    }

    pub fn null() -> Self {
        Self("null".to_string())
    }

    /// The raw foreign name
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Classify this reference, or `None` if the name is not a known descriptor form.
    pub fn shape(&self) -> Option<TypeShape<'_>> {
        let name = self.0.as_str();
        if name == "null" {
            return Some(TypeShape::Null);
        }
        if name == "V" {
            return Some(TypeShape::Void);
        }
        let dimensions = name.bytes().take_while(|b| *b == b'[').count();
        let innermost = &name[dimensions..];
        let element_ok = match innermost.len() {
            0 => false,
            1 => innermost
                .chars()
                .next()
                .and_then(PrimitiveDescriptor::from_char)
                .is_some(),
            _ => innermost.starts_with('L'),
        };
        if !element_ok {
            return None;
        }
        if dimensions > 0 {
            return Some(TypeShape::Array {
                dimensions,
                innermost,
            });
        }
        if innermost.starts_with('L') {
            return Some(TypeShape::Class(innermost));
        }
        innermost
            .chars()
            .next()
            .and_then(PrimitiveDescriptor::from_char)
            .map(TypeShape::Primitive)
    }

    pub fn is_void(&self) -> bool {
        self.0 == "V"
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.shape(), Some(TypeShape::Primitive(_)))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.shape(), Some(TypeShape::Array { .. }))
    }

    /// Number of array dimensions (0 for non-array types)
    pub fn dimensionality(&self) -> usize {
        self.0.bytes().take_while(|b| *b == b'[').count()
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeReference {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
