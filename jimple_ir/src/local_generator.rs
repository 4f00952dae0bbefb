//! Fresh, uniquely named locals for body construction and rewriting.
//!
//! Generated names follow the Jimple convention: an optional `$` for stack
//! temporaries, a one-letter prefix for the type, and a per-prefix counter
//! (`r0`, `i1`, `$z0`). Locals created by a pass from an existing local use
//! [`LocalGenerator::fresh`], which appends `#<n>` to the original name.

use crate::ir::{Local, LocalId};
use crate::types::{PrimitiveType, Type};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct LocalGenerator {
    locals: Vec<Local>,
    names: HashSet<String>,
    counters: HashMap<char, u32>,
    this_local: Option<LocalId>,
}

fn type_prefix(ty: &Type) -> char {
    match ty {
        Type::Primitive(PrimitiveType::Boolean) => 'z',
        Type::Primitive(PrimitiveType::Byte) => 'b',
        Type::Primitive(PrimitiveType::Char) => 'c',
        Type::Primitive(PrimitiveType::Short) => 's',
        Type::Primitive(PrimitiveType::Int) => 'i',
        Type::Primitive(PrimitiveType::Long) => 'l',
        Type::Primitive(PrimitiveType::Float) => 'f',
        Type::Primitive(PrimitiveType::Double) => 'd',
        Type::Class(_) | Type::Array(_) => 'r',
        Type::Null => 'n',
        Type::Void | Type::Bottom | Type::Unknown => 'e',
    }
}

impl LocalGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue generating into an existing local set (names already taken stay taken)
    pub fn from_locals(locals: &[Local]) -> Self {
        Self {
            locals: locals.to_vec(),
            names: locals.iter().map(|l| l.name().to_string()).collect(),
            counters: HashMap::new(),
            this_local: None,
        }
    }

    /// Generate a local named after `ty`; stack locals get a leading `$`.
    pub fn generate(&mut self, ty: &Type, is_stack: bool) -> LocalId {
        let prefix = type_prefix(ty);
        loop {
            let counter = self.counters.entry(prefix).or_insert(0);
            let n = *counter;
            *counter += 1;
            let name = if is_stack {
                format!("${}{}", prefix, n)
            } else {
                format!("{}{}", prefix, n)
            };
            if !self.names.contains(&name) {
                return self.push(Local::new(name, ty.clone()));
            }
        }
    }

    /// Generate the receiver local; it is remembered as [`LocalGenerator::this_local`].
    pub fn generate_this(&mut self, ty: &Type) -> LocalId {
        let id = self.generate(ty, false);
        self.this_local = Some(id);
        id
    }

    pub fn this_local(&self) -> Option<LocalId> {
        self.this_local
    }

    /// A local derived from `hint`, named `<hint>#<n>` with the smallest free `n >= 1`.
    pub fn fresh(&mut self, hint: &str, ty: &Type) -> LocalId {
        let mut n = 1;
        loop {
            let name = format!("{}#{}", hint, n);
            if !self.names.contains(&name) {
                return self.push(Local::new(name, ty.clone()));
            }
            n += 1;
        }
    }

    fn push(&mut self, local: Local) -> LocalId {
        let id = LocalId(self.locals.len() as u32);
        self.names.insert(local.name().to_string());
        self.locals.push(local);
        id
    }

    pub fn local(&self, id: LocalId) -> &Local {
        &self.locals[id.index()]
    }

    pub fn locals(&self) -> &[Local] {
        &self.locals
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    pub fn into_locals(self) -> Vec<Local> {
        self.locals
    }
}
