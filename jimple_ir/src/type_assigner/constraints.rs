//! Use constraints and definition dependencies.
//!
//! ```text
//! x.m(a0, a1)        x ⊑ declaring class of m, ai ⊑ parameter i
//! x.f / x.f = v      x ⊑ declaring class of f, v ⊑ type of f
//! a[i] / a[i] = v    a is an array, i int-like, v ⊑ element type of a
//! newarray (T)[n]    n int-like
//! lengthof a         a is an array
//! switch(k)          k int-like
//! return v           v ⊑ return type
//! throw v            v ⊑ java.lang.Throwable
//! x << n             n int-like
//! ```

use super::typing::Typing;
use crate::ir::{Body, Immediate, InvokeExpr, LocalId, Place, StmtId, StmtKind, Value};
use crate::types::{Type, TypeHierarchy};

/// What a use requires of a local.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expected {
    /// A type the local must be assignable to
    Type(Type),
    /// Any array type
    Array,
    /// The element type of another local's array type
    ElementOf(LocalId),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Requirement {
    pub stmt: StmtId,
    pub local: LocalId,
    pub expected: Expected,
}

impl Requirement {
    /// The concrete type required under `typing`, if the requirement names one
    pub fn required_type(&self, typing: &Typing) -> Option<Type> {
        match &self.expected {
            Expected::Type(ty) => Some(ty.clone()),
            Expected::Array => None,
            Expected::ElementOf(base) => typing
                .get(*base)
                .as_array()
                .map(|a| a.element_type())
                .filter(Type::is_known),
        }
    }

    pub fn is_satisfied(&self, typing: &Typing, hierarchy: &dyn TypeHierarchy) -> bool {
        let ty = typing.get(self.local);
        match &self.expected {
            Expected::Array => matches!(ty, Type::Array(_) | Type::Null | Type::Bottom),
            _ => match self.required_type(typing) {
                Some(required) => required.is_assignable_from(ty, hierarchy),
                // an unknown element type is reported on the array itself
                None => true,
            },
        }
    }
}

struct Collector<'a> {
    stmt: StmtId,
    out: &'a mut Vec<Requirement>,
}

impl Collector<'_> {
    fn require(&mut self, local: LocalId, expected: Expected) {
        self.out.push(Requirement {
            stmt: self.stmt,
            local,
            expected,
        });
    }

    fn require_type(&mut self, operand: &Immediate, ty: &Type) {
        if let Some(local) = operand.local() {
            self.require(local, Expected::Type(ty.clone()));
        }
    }

    fn invoke(&mut self, expr: &InvokeExpr) {
        if let Some(base) = expr.base {
            self.require(
                base,
                Expected::Type(Type::Class(expr.method.declaring_class.clone())),
            );
        }
        for (arg, ty) in expr.args.iter().zip(&expr.method.parameter_types) {
            self.require_type(arg, ty);
        }
    }

    fn value(&mut self, value: &Value) {
        match value {
            Value::Binary { op, right, .. } if op.is_shift() => {
                self.require_type(right, &Type::INT);
            }
            Value::NewArray { size, .. } => self.require_type(size, &Type::INT),
            Value::NewMultiArray { sizes, .. } => {
                for size in sizes {
                    self.require_type(size, &Type::INT);
                }
            }
            Value::Length(array) => {
                if let Some(local) = array.local() {
                    self.require(local, Expected::Array);
                }
            }
            Value::ArrayRef { base, index } => {
                self.require(*base, Expected::Array);
                self.require_type(index, &Type::INT);
            }
            Value::InstanceField { base, field } => {
                self.require(
                    *base,
                    Expected::Type(Type::Class(field.declaring_class.clone())),
                );
            }
            Value::Invoke(expr) => self.invoke(expr),
            _ => {}
        }
    }

    fn store(&mut self, target: &Place, value: &Value) {
        let stored = match value {
            Value::Immediate(Immediate::Local(local)) => Some(*local),
            _ => None,
        };
        match target {
            Place::Local(_) => {}
            Place::ArrayRef { base, index } => {
                self.require(*base, Expected::Array);
                self.require_type(index, &Type::INT);
                if let Some(local) = stored {
                    self.require(local, Expected::ElementOf(*base));
                }
            }
            Place::InstanceField { base, field } => {
                self.require(
                    *base,
                    Expected::Type(Type::Class(field.declaring_class.clone())),
                );
                if let Some(local) = stored {
                    self.require(local, Expected::Type(field.ty.clone()));
                }
            }
            Place::StaticField(field) => {
                if let Some(local) = stored {
                    self.require(local, Expected::Type(field.ty.clone()));
                }
            }
        }
    }
}

/// Every use constraint of the body, in statement order.
pub(crate) fn collect_requirements(body: &Body) -> Vec<Requirement> {
    let mut out = Vec::new();
    for id in body.stmt_ids() {
        let mut collector = Collector {
            stmt: id,
            out: &mut out,
        };
        match &body.stmt(id).kind {
            StmtKind::Identity { .. } | StmtKind::Goto { .. } | StmtKind::ReturnVoid => {}
            StmtKind::If { .. } => {}
            StmtKind::Assign { target, value } => {
                collector.store(target, value);
                collector.value(value);
            }
            StmtKind::Invoke(expr) => collector.invoke(expr),
            StmtKind::Switch { key, .. } => collector.require_type(key, &Type::INT),
            StmtKind::Return(value) => {
                collector.require_type(value, &body.signature().return_type);
            }
            StmtKind::Throw(value) => collector.require_type(value, &Type::throwable()),
        }
    }
    out
}

/// For every local, the locals whose definitions read it.
pub(crate) fn dependents(body: &Body) -> Vec<Vec<LocalId>> {
    let mut dependents: Vec<Vec<LocalId>> = vec![Vec::new(); body.locals().len()];
    for stmt in body.stmts() {
        let StmtKind::Assign {
            target: Place::Local(def),
            value,
        } = &stmt.kind
        else {
            continue;
        };
        for used in value.locals() {
            let entry = &mut dependents[used.index()];
            if !entry.contains(def) {
                entry.push(*def);
            }
        }
    }
    dependents
}

/// Definition sites of every local.
pub(crate) fn definitions(body: &Body) -> Vec<Vec<StmtId>> {
    let mut defs: Vec<Vec<StmtId>> = vec![Vec::new(); body.locals().len()];
    for id in body.stmt_ids() {
        if let Some(local) = body.stmt(id).def() {
            defs[local.index()].push(id);
        }
    }
    defs
}
