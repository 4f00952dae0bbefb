//! Expression nodes of the statement IR.
//!
//! Operands are [`Immediate`]s: a local or a constant. Every local an expression
//! reads is reachable through [`Value::local_slots_mut`] so passes can rename
//! operands in place.

use super::local::LocalId;
use super::signature::{FieldSignature, MethodSignature};
use crate::types::{ArrayType, ClassType, Type, JAVA_LANG_CLASS};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Null,
    /// Class literal
    Class(Type),
}

impl Constant {
    /// Declared type of the constant (integers are `int` regardless of magnitude)
    pub fn ty(&self) -> Type {
        match self {
            Constant::Int(_) => Type::INT,
            Constant::Long(_) => Type::LONG,
            Constant::Float(_) => Type::FLOAT,
            Constant::Double(_) => Type::DOUBLE,
            Constant::String(_) => Type::string(),
            Constant::Null => Type::Null,
            Constant::Class(_) => Type::Class(JAVA_LANG_CLASS.clone()),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Long(v) => write!(f, "{}L", v),
            Constant::Float(v) => write!(f, "{:?}F", v),
            Constant::Double(v) => write!(f, "{:?}", v),
            Constant::String(s) => write!(f, "\"{}\"", s.escape_default()),
            Constant::Null => f.write_str("null"),
            Constant::Class(t) => write!(f, "class \"{}\"", t),
        }
    }
}

/// An operand: local or constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Immediate {
    Local(LocalId),
    Constant(Constant),
}

impl Immediate {
    pub fn local(&self) -> Option<LocalId> {
        match self {
            Immediate::Local(id) => Some(*id),
            Immediate::Constant(_) => None,
        }
    }

    pub fn local_mut(&mut self) -> Option<&mut LocalId> {
        match self {
            Immediate::Local(id) => Some(id),
            Immediate::Constant(_) => None,
        }
    }

    pub fn int(value: i32) -> Immediate {
        Immediate::Constant(Constant::Int(value))
    }
}

impl From<LocalId> for Immediate {
    fn from(id: LocalId) -> Self {
        Immediate::Local(id)
    }
}

impl From<Constant> for Immediate {
    fn from(c: Constant) -> Self {
        Immediate::Constant(c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
    Cmp,
    Cmpl,
    Cmpg,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Ushr => ">>>",
            BinaryOp::Cmp => "cmp",
            BinaryOp::Cmpl => "cmpl",
            BinaryOp::Cmpg => "cmpg",
        }
    }

    /// `cmp`, `cmpl` and `cmpg` produce an int regardless of operand types
    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOp::Cmp | BinaryOp::Cmpl | BinaryOp::Cmpg)
    }

    /// Shift distance is always an int
    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ushr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOp {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl ConditionOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConditionOp::Eq => "==",
            ConditionOp::Ne => "!=",
            ConditionOp::Lt => "<",
            ConditionOp::Ge => ">=",
            ConditionOp::Gt => ">",
            ConditionOp::Le => "<=",
        }
    }
}

/// Branch condition `left op right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub op: ConditionOp,
    pub left: Immediate,
    pub right: Immediate,
}

impl Condition {
    pub fn locals(&self) -> Vec<LocalId> {
        self.left.local().into_iter().chain(self.right.local()).collect()
    }

    pub fn local_slots_mut(&mut self) -> Vec<&mut LocalId> {
        self.left
            .local_mut()
            .into_iter()
            .chain(self.right.local_mut())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokeKind {
    Virtual,
    Special,
    Static,
    Interface,
}

impl InvokeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            InvokeKind::Virtual => "virtualinvoke",
            InvokeKind::Special => "specialinvoke",
            InvokeKind::Static => "staticinvoke",
            InvokeKind::Interface => "interfaceinvoke",
        }
    }
}

/// Method invocation. `base` is `None` exactly for static invokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeExpr {
    pub kind: InvokeKind,
    pub method: MethodSignature,
    pub base: Option<LocalId>,
    pub args: Vec<Immediate>,
}

impl InvokeExpr {
    pub fn locals(&self) -> Vec<LocalId> {
        self.base
            .into_iter()
            .chain(self.args.iter().filter_map(Immediate::local))
            .collect()
    }

    pub fn local_slots_mut(&mut self) -> Vec<&mut LocalId> {
        self.base
            .as_mut()
            .into_iter()
            .chain(self.args.iter_mut().filter_map(Immediate::local_mut))
            .collect()
    }
}

/// Right-hand side of an identity statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityRef {
    This(Type),
    Parameter { index: usize, ty: Type },
    CaughtException(Type),
}

impl IdentityRef {
    pub fn ty(&self) -> &Type {
        match self {
            IdentityRef::This(ty)
            | IdentityRef::Parameter { ty, .. }
            | IdentityRef::CaughtException(ty) => ty,
        }
    }
}

impl fmt::Display for IdentityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityRef::This(ty) => write!(f, "@this: {}", ty),
            IdentityRef::Parameter { index, ty } => write!(f, "@parameter{}: {}", index, ty),
            IdentityRef::CaughtException(_) => f.write_str("@caughtexception"),
        }
    }
}

/// An expression appearing on the right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Immediate(Immediate),
    Binary {
        op: BinaryOp,
        left: Immediate,
        right: Immediate,
    },
    Negate(Immediate),
    Cast {
        ty: Type,
        operand: Immediate,
    },
    InstanceOf {
        ty: Type,
        operand: Immediate,
    },
    New(ClassType),
    NewArray {
        element: Type,
        size: Immediate,
    },
    NewMultiArray {
        ty: ArrayType,
        sizes: Vec<Immediate>,
    },
    Length(Immediate),
    ArrayRef {
        base: LocalId,
        index: Immediate,
    },
    InstanceField {
        base: LocalId,
        field: FieldSignature,
    },
    StaticField(FieldSignature),
    Invoke(InvokeExpr),
}

impl Value {
    pub fn local(id: LocalId) -> Value {
        Value::Immediate(Immediate::Local(id))
    }

    pub fn constant(c: Constant) -> Value {
        Value::Immediate(Immediate::Constant(c))
    }

    /// Locals read by this expression, in operand order
    pub fn locals(&self) -> Vec<LocalId> {
        match self {
            Value::Immediate(op) | Value::Negate(op) | Value::Length(op) => {
                op.local().into_iter().collect()
            }
            Value::Binary { left, right, .. } => {
                left.local().into_iter().chain(right.local()).collect()
            }
            Value::Cast { operand, .. } | Value::InstanceOf { operand, .. } => {
                operand.local().into_iter().collect()
            }
            Value::New(_) | Value::StaticField(_) => Vec::new(),
            Value::NewArray { size, .. } => size.local().into_iter().collect(),
            Value::NewMultiArray { sizes, .. } => {
                sizes.iter().filter_map(Immediate::local).collect()
            }
            Value::ArrayRef { base, index } => {
                std::iter::once(*base).chain(index.local()).collect()
            }
            Value::InstanceField { base, .. } => vec![*base],
            Value::Invoke(expr) => expr.locals(),
        }
    }

    /// Mutable slots of every local read by this expression, in operand order
    pub fn local_slots_mut(&mut self) -> Vec<&mut LocalId> {
        match self {
            Value::Immediate(op) | Value::Negate(op) | Value::Length(op) => {
                op.local_mut().into_iter().collect()
            }
            Value::Binary { left, right, .. } => left
                .local_mut()
                .into_iter()
                .chain(right.local_mut())
                .collect(),
            Value::Cast { operand, .. } | Value::InstanceOf { operand, .. } => {
                operand.local_mut().into_iter().collect()
            }
            Value::New(_) | Value::StaticField(_) => Vec::new(),
            Value::NewArray { size, .. } => size.local_mut().into_iter().collect(),
            Value::NewMultiArray { sizes, .. } => {
                sizes.iter_mut().filter_map(Immediate::local_mut).collect()
            }
            Value::ArrayRef { base, index } => {
                std::iter::once(base).chain(index.local_mut()).collect()
            }
            Value::InstanceField { base, .. } => vec![base],
            Value::Invoke(expr) => expr.local_slots_mut(),
        }
    }

    pub fn as_invoke(&self) -> Option<&InvokeExpr> {
        match self {
            Value::Invoke(expr) => Some(expr),
            _ => None,
        }
    }
}

/// Left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Place {
    Local(LocalId),
    ArrayRef { base: LocalId, index: Immediate },
    InstanceField { base: LocalId, field: FieldSignature },
    StaticField(FieldSignature),
}

impl Place {
    /// The local defined by an assignment to this place, if it is a plain local
    pub fn defined_local(&self) -> Option<LocalId> {
        match self {
            Place::Local(id) => Some(*id),
            _ => None,
        }
    }

    /// Locals read when storing to this place (array base and index, field base)
    pub fn locals(&self) -> Vec<LocalId> {
        match self {
            Place::Local(_) | Place::StaticField(_) => Vec::new(),
            Place::ArrayRef { base, index } => std::iter::once(*base).chain(index.local()).collect(),
            Place::InstanceField { base, .. } => vec![*base],
        }
    }

    pub fn local_slots_mut(&mut self) -> Vec<&mut LocalId> {
        match self {
            Place::Local(_) | Place::StaticField(_) => Vec::new(),
            Place::ArrayRef { base, index } => {
                std::iter::once(base).chain(index.local_mut()).collect()
            }
            Place::InstanceField { base, .. } => vec![base],
        }
    }
}
