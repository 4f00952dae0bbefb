//! Lattice operations on static types.
//!
//! - join (⊔): least upper bound, consulting the class hierarchy for class types
//! - is_assignable_from: whether a value of one type may be used where another is required
//!
//! ```text
//! Bottom ⊔ T         = T
//! Unknown ⊔ T        = Unknown
//! byte ⊔ short       = short       byte < short < int < long < float < double
//! char ⊔ short       = int
//! boolean ⊔ int      = Unknown
//! null ⊔ String      = String
//! A ⊔ B              = nearest common superclass (or Object)
//! Sub1[] ⊔ Sub2[]    = Super1[]
//! int[] ⊔ long[]     = Object
//! int ⊔ Object       = Unknown
//! ```

use super::{ArrayType, ClassType, PrimitiveType, Type, TypeHierarchy};
use super::{JAVA_IO_SERIALIZABLE, JAVA_LANG_CLONEABLE, JAVA_LANG_OBJECT};

/// Numeric rank used for primitive joins; `char` joins like `int`.
fn numeric_rank(p: PrimitiveType) -> Option<u8> {
    match p {
        PrimitiveType::Byte => Some(1),
        PrimitiveType::Short => Some(2),
        PrimitiveType::Char | PrimitiveType::Int => Some(3),
        PrimitiveType::Long => Some(4),
        PrimitiveType::Float => Some(5),
        PrimitiveType::Double => Some(6),
        PrimitiveType::Boolean => None,
    }
}

impl PrimitiveType {
    /// Join two primitives, or `None` when they have no common primitive supertype.
    pub fn join(self, other: PrimitiveType) -> Option<PrimitiveType> {
        if self == other {
            return Some(self);
        }
        let a = numeric_rank(self)?;
        let b = numeric_rank(other)?;
        let widest = if a >= b { self } else { other };
        Some(match widest {
            PrimitiveType::Char => PrimitiveType::Int,
            p => p,
        })
    }
}

/// Class types every array type is assignable to.
fn is_array_supertype(class: &ClassType) -> bool {
    class == &*JAVA_LANG_OBJECT
        || class == &*JAVA_LANG_CLONEABLE
        || class == &*JAVA_IO_SERIALIZABLE
}

impl Type {
    /// Join operation (⊔): the least type both `self` and `other` are assignable to.
    pub fn join(&self, other: &Type, hierarchy: &dyn TypeHierarchy) -> Type {
        match (self, other) {
            (Type::Bottom, t) | (t, Type::Bottom) => t.clone(),
            (Type::Unknown, _) | (_, Type::Unknown) => Type::Unknown,
            (a, b) if a == b => a.clone(),

            (Type::Primitive(a), Type::Primitive(b)) => {
                a.join(*b).map(Type::Primitive).unwrap_or(Type::Unknown)
            }

            // null is below every reference type
            (Type::Null, t @ (Type::Class(_) | Type::Array(_)))
            | (t @ (Type::Class(_) | Type::Array(_)), Type::Null) => t.clone(),

            (Type::Class(a), Type::Class(b)) => Type::Class(hierarchy.least_upper_bound(a, b)),

            (Type::Array(a), Type::Array(b)) => join_arrays(a, b, hierarchy),

            (Type::Array(_), Type::Class(c)) | (Type::Class(c), Type::Array(_)) => {
                if is_array_supertype(c) {
                    Type::Class(c.clone())
                } else {
                    Type::object()
                }
            }

            // primitive vs reference, void vs anything
            _ => Type::Unknown,
        }
    }

    /// Whether a value of type `source` may be used where `self` is required.
    ///
    /// All int-like primitives are mutually assignable, since the JVM keeps them in
    /// int slots. A `Bottom` source carries no information and is accepted.
    pub fn is_assignable_from(&self, source: &Type, hierarchy: &dyn TypeHierarchy) -> bool {
        match (self, source) {
            (_, Type::Bottom) => true,
            (Type::Unknown, _) | (_, Type::Unknown) => false,
            (a, b) if a == b => true,

            (Type::Primitive(a), Type::Primitive(b)) => a.is_int_like() && b.is_int_like(),

            (Type::Class(_) | Type::Array(_), Type::Null) => true,

            (Type::Class(target), Type::Class(src)) => hierarchy.is_subtype(src, target),

            (Type::Class(target), Type::Array(_)) => is_array_supertype(target),

            (Type::Array(target), Type::Array(src)) => {
                let target_elem = target.element_type();
                let src_elem = src.element_type();
                if target_elem.is_reference() && src_elem.is_reference() {
                    target_elem.is_assignable_from(&src_elem, hierarchy)
                } else {
                    target_elem == src_elem
                }
            }

            _ => false,
        }
    }

    /// Strict subtype-or-equal test (no int-like relaxation).
    pub fn is_subtype_of(&self, other: &Type, hierarchy: &dyn TypeHierarchy) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            _ => other.is_assignable_from(self, hierarchy),
        }
    }
}

fn join_arrays(a: &ArrayType, b: &ArrayType, hierarchy: &dyn TypeHierarchy) -> Type {
    let elem_a = a.element_type();
    let elem_b = b.element_type();
    if elem_a.is_reference() && elem_b.is_reference() {
        match elem_a.join(&elem_b, hierarchy) {
            Type::Unknown => Type::object(),
            elem => Type::array(elem, 1),
        }
    } else {
        // distinct primitive element types, or primitive vs reference element
        Type::object()
    }
}
