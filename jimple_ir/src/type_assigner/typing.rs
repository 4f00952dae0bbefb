//! Typing state and fixed-point propagation.

use super::constraints::{collect_requirements, definitions, dependents, Requirement};
use crate::ir::{Body, Constant, Immediate, LocalId, Place, Stmt, StmtId, StmtKind, Value};
use crate::types::{Type, TypeHierarchy};
use std::collections::VecDeque;

/// Current best type of every local, indexed by [`LocalId`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Typing {
    types: Vec<Type>,
}

impl Typing {
    pub fn get(&self, local: LocalId) -> &Type {
        &self.types[local.index()]
    }

    pub fn set(&mut self, local: LocalId, ty: Type) {
        self.types[local.index()] = ty;
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }
}

/// Narrowest of byte, short and int holding `value`.
pub(crate) fn int_constant_type(value: i32) -> Type {
    if i8::try_from(value).is_ok() {
        Type::BYTE
    } else if i16::try_from(value).is_ok() {
        Type::SHORT
    } else {
        Type::INT
    }
}

fn constant_type(constant: &Constant) -> Type {
    match constant {
        Constant::Int(v) => int_constant_type(*v),
        other => other.ty(),
    }
}

/// Binary numeric promotion: int-like operands compute in int.
fn promote(ty: Type) -> Type {
    if ty.is_int_like() && ty != Type::BOOLEAN {
        Type::INT
    } else {
        ty
    }
}

/// Join of two definitions of the same local.
///
/// A boolean joined with another int-like type is an int; both live in int slots
/// and constant `0`/`1` flags arrive as plain integers.
pub(crate) fn join_defs(a: &Type, b: &Type, hierarchy: &dyn TypeHierarchy) -> Type {
    if a.is_int_like() && b.is_int_like() && a != b && (*a == Type::BOOLEAN || *b == Type::BOOLEAN) {
        return Type::INT;
    }
    a.join(b, hierarchy)
}

/// Constraint system of one body.
pub(crate) struct Solver<'a> {
    body: &'a Body,
    hierarchy: &'a dyn TypeHierarchy,
    defs: Vec<Vec<StmtId>>,
    dependents: Vec<Vec<LocalId>>,
    requirements: Vec<Requirement>,
    max_iterations: usize,
}

impl<'a> Solver<'a> {
    pub fn new(body: &'a Body, hierarchy: &'a dyn TypeHierarchy, max_iterations: usize) -> Self {
        Self {
            body,
            hierarchy,
            defs: definitions(body),
            dependents: dependents(body),
            requirements: collect_requirements(body),
            max_iterations,
        }
    }

    /// Starting type of a local: bottom if it has definitions, else its declared type.
    pub fn initial_type(&self, local: LocalId) -> Type {
        if self.defs[local.index()].is_empty() {
            self.body.local(local).ty().clone()
        } else {
            Type::Bottom
        }
    }

    pub fn initial_typing(&self) -> Typing {
        Typing {
            types: self.body.local_ids().map(|l| self.initial_type(l)).collect(),
        }
    }

    /// Extend a typing of a smaller local set (before splitting) to this body.
    pub fn extend_typing(&self, typing: &Typing) -> Typing {
        let mut types = typing.types.clone();
        types.extend(
            self.body
                .local_ids()
                .skip(typing.len())
                .map(|l| self.initial_type(l)),
        );
        Typing { types }
    }

    /// `locals` plus every local whose definitions transitively read one of them.
    pub fn dependent_closure(&self, locals: &[LocalId]) -> Vec<LocalId> {
        let mut seen = vec![false; self.body.locals().len()];
        let mut stack: Vec<LocalId> = locals.to_vec();
        let mut closure = Vec::new();
        while let Some(local) = stack.pop() {
            if std::mem::replace(&mut seen[local.index()], true) {
                continue;
            }
            closure.push(local);
            stack.extend(self.dependents[local.index()].iter().copied());
        }
        closure.sort();
        closure
    }

    /// Type produced by a definition under `typing`.
    fn def_type(&self, stmt: &Stmt, typing: &Typing) -> Type {
        let immediate = |imm: &Immediate| match imm {
            Immediate::Local(l) => typing.get(*l).clone(),
            Immediate::Constant(c) => constant_type(c),
        };
        match &stmt.kind {
            StmtKind::Identity { value, .. } => value.ty().clone(),
            StmtKind::Assign {
                target: Place::Local(_),
                value,
            } => match value {
                Value::Immediate(imm) => immediate(imm),
                Value::Binary { op, left, right } => {
                    let (left, right) = (immediate(left), immediate(right));
                    if op.is_comparison() {
                        Type::INT
                    } else if op.is_shift() {
                        promote(left)
                    } else if left.is_int_like() && right.is_int_like() {
                        if left == Type::BOOLEAN && right == Type::BOOLEAN {
                            Type::BOOLEAN
                        } else {
                            Type::INT
                        }
                    } else {
                        promote(left.join(&right, self.hierarchy))
                    }
                }
                Value::Negate(operand) => promote(immediate(operand)),
                Value::Cast { ty, .. } => ty.clone(),
                Value::InstanceOf { .. } => Type::BOOLEAN,
                Value::New(class) => Type::Class(class.clone()),
                Value::NewArray { element, .. } => Type::array(element.clone(), 1),
                Value::NewMultiArray { ty, .. } => Type::Array(ty.clone()),
                Value::Length(_) => Type::INT,
                Value::ArrayRef { base, .. } => match typing.get(*base) {
                    Type::Array(array) => array.element_type(),
                    Type::Bottom | Type::Null => Type::Bottom,
                    _ => Type::Unknown,
                },
                Value::InstanceField { field, .. } | Value::StaticField(field) => field.ty.clone(),
                Value::Invoke(expr) => expr.method.return_type.clone(),
            },
            _ => Type::Bottom,
        }
    }

    /// Propagate from `seeds` to a fixed point; `false` if the iteration bound was hit.
    pub fn propagate(&self, typing: &mut Typing, seeds: &[LocalId]) -> bool {
        let mut queued = vec![false; typing.len()];
        let mut worklist = VecDeque::new();
        for &local in seeds {
            if !std::mem::replace(&mut queued[local.index()], true) {
                worklist.push_back(local);
            }
        }

        let mut iterations = 0;
        while let Some(local) = worklist.pop_front() {
            if iterations >= self.max_iterations {
                return false;
            }
            iterations += 1;
            queued[local.index()] = false;

            let current = typing.get(local).clone();
            let mut ty = current.clone();
            for def in &self.defs[local.index()] {
                let produced = self.def_type(self.body.stmt(*def), typing);
                ty = join_defs(&ty, &produced, self.hierarchy);
            }
            if ty != current {
                typing.set(local, ty);
                for &dependent in &self.dependents[local.index()] {
                    if !std::mem::replace(&mut queued[dependent.index()], true) {
                        worklist.push_back(dependent);
                    }
                }
            }
        }
        true
    }

    /// Give null-only locals the most specific reference type their uses require.
    pub fn resolve_null_locals(&self, typing: &mut Typing, locals: &[LocalId]) -> Vec<LocalId> {
        let mut resolved = Vec::new();
        for &local in locals {
            if *typing.get(local) != Type::Null {
                continue;
            }
            let required: Vec<Type> = self
                .requirements
                .iter()
                .filter(|r| r.local == local)
                .filter_map(|r| r.required_type(typing))
                .filter(|t| matches!(t, Type::Class(_) | Type::Array(_)))
                .collect();
            let most_specific = required.iter().find(|candidate| {
                required
                    .iter()
                    .all(|other| other.is_assignable_from(candidate, self.hierarchy))
            });
            if let Some(ty) = most_specific.or(required.first()) {
                typing.set(local, ty.clone());
                resolved.push(local);
            }
        }
        resolved
    }

    /// Propagate, then resolve null-only locals among `seeds` and propagate their effect.
    pub fn solve(&self, typing: &mut Typing, seeds: &[LocalId]) -> bool {
        let mut converged = self.propagate(typing, seeds);
        let resolved = self.resolve_null_locals(typing, seeds);
        if !resolved.is_empty() {
            let dependents: Vec<LocalId> = resolved
                .iter()
                .flat_map(|l| self.dependents[l.index()].iter().copied())
                .collect();
            converged &= self.propagate(typing, &dependents);
        }
        converged
    }

    /// Locals at `<unknown>` and the requirements `typing` violates.
    pub fn conflicts(&self, typing: &Typing) -> Vec<Conflict> {
        let mut conflicts: Vec<Conflict> = self
            .body
            .local_ids()
            .filter(|l| *typing.get(*l) == Type::Unknown)
            .map(|local| Conflict {
                local,
                requirement: None,
            })
            .collect();
        for requirement in &self.requirements {
            if *typing.get(requirement.local) == Type::Unknown {
                continue;
            }
            if !requirement.is_satisfied(typing, self.hierarchy) {
                conflicts.push(Conflict {
                    local: requirement.local,
                    requirement: Some(requirement.clone()),
                });
            }
        }
        conflicts
    }
}

/// A local whose type is unresolved, or a use it does not satisfy.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Conflict {
    pub local: LocalId,
    pub requirement: Option<Requirement>,
}

impl Conflict {
    pub fn expected(&self, typing: &Typing) -> Option<Type> {
        self.requirement.as_ref()?.required_type(typing)
    }
}
