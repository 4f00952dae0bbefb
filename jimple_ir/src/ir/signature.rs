//! Method and field signatures plus class, field and method modifiers.

use crate::types::{ClassType, Type};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Fully resolved method signature, displayed as `<Decl: Ret name(P1,P2)>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodSignature {
    pub declaring_class: ClassType,
    pub name: String,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
}

impl MethodSignature {
    pub fn new(
        declaring_class: ClassType,
        name: impl Into<String>,
        parameter_types: Vec<Type>,
        return_type: Type,
    ) -> Self {
        Self {
            declaring_class,
            name: name.into(),
            parameter_types,
            return_type,
        }
    }

    /// `name(P1,P2)` without the declaring class and return type
    pub fn sub_signature(&self) -> String {
        let params: Vec<String> = self.parameter_types.iter().map(|t| t.to_string()).collect();
        format!("{}({})", self.name, params.join(","))
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == "<clinit>"
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}: {} {}>",
            self.declaring_class,
            self.return_type,
            self.sub_signature()
        )
    }
}

/// Fully resolved field signature, displayed as `<Decl: Type name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldSignature {
    pub declaring_class: ClassType,
    pub name: String,
    pub ty: Type,
}

impl FieldSignature {
    pub fn new(declaring_class: ClassType, name: impl Into<String>, ty: Type) -> Self {
        Self {
            declaring_class,
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for FieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {} {}>", self.declaring_class, self.ty, self.name)
    }
}

/// Class, field and method modifiers kept by the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
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
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modifier::Public => "public",
            Modifier::Private => "private",
            Modifier::Protected => "protected",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
            Modifier::Synchronized => "synchronized",
            Modifier::Native => "native",
            Modifier::Synthetic => "synthetic",
            Modifier::Volatile => "volatile",
            Modifier::Transient => "transient",
            Modifier::Interface => "interface",
        };
        f.write_str(s)
    }
}

/// Ordered set of [`Modifier`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers(BTreeSet<Modifier>);

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, modifier: Modifier) {
        self.0.insert(modifier);
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0.contains(&modifier)
    }

    pub fn is_static(&self) -> bool {
        self.contains(Modifier::Static)
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|m| m.to_string()).collect();
        f.write_str(&names.join(" "))
    }
}
