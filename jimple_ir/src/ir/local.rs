use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a [`Local`] in its body's local arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(pub u32);

impl LocalId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A named variable with its declared type. Names are unique within a body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Local {
    name: String,
    ty: Type,
}

impl Local {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Copy of this local with another declared type
    pub fn with_type(&self, ty: Type) -> Local {
        Local {
            name: self.name.clone(),
            ty,
        }
    }

    /// Stack locals are compiler temporaries, named with a leading `$`
    pub fn is_stack_local(&self) -> bool {
        self.name.starts_with('$')
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
