//! Foreign instructions.
//!
//! Instructions operate on numbered registers. For instance methods the receiver lives
//! in register 0 and declared parameter `k` in register `k + 1`; for static methods
//! parameter `k` lives in register `k`. Branch destinations are instruction indices
//! within the same method.

use crate::method::{FieldReference, MethodReference};
use crate::position::SourcePosition;
use crate::type_ref::TypeReference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A register slot of the foreign register machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Register(pub u32);

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Constant carried inline by an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignConstant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Null,
    /// A class literal (`Foo.class`)
    Class(TypeReference),
}

/// Instruction operand: a register or an inline constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Register(Register),
    Constant(ForeignConstant),
}

impl Operand {
    /// The register read by this operand, if any
    pub fn register(&self) -> Option<Register> {
        match self {
            Operand::Register(r) => Some(*r),
            Operand::Constant(_) => None,
        }
    }
}

impl From<Register> for Operand {
    fn from(register: Register) -> Self {
        Operand::Register(register)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
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
    /// long comparison
    Cmp,
    /// floating comparison, NaN yields -1
    Cmpl,
    /// floating comparison, NaN yields 1
    Cmpg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvokeKind {
    Virtual,
    Special,
    Static,
    Interface,
}

/// One `case value: goto target` arm of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub value: i32,
    pub target: usize,
}

/// Operation performed by a foreign instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InstructionKind {
    /// `def = constant`
    Constant {
        def: Register,
        value: ForeignConstant,
    },
    /// `def = source`
    Move { def: Register, source: Register },
    /// `def = left operator right`
    Binary {
        def: Register,
        operator: BinaryOperator,
        left: Operand,
        right: Operand,
    },
    /// `def = -operand`
    Negate { def: Register, operand: Operand },
    /// Primitive conversion (`i2l`, `d2f`, ...)
    Convert {
        def: Register,
        value: Operand,
        from: TypeReference,
        to: TypeReference,
    },
    /// Reference cast
    CheckCast {
        def: Register,
        value: Register,
        declared: TypeReference,
    },
    InstanceOf {
        def: Register,
        value: Register,
        checked: TypeReference,
    },
    /// Allocation of a class instance (constructor is a separate invoke)
    New { def: Register, class: TypeReference },
    /// Array allocation; one length per allocated dimension
    NewArray {
        def: Register,
        array_type: TypeReference,
        lengths: Vec<Operand>,
    },
    ArrayLength { def: Register, array: Register },
    ArrayLoad {
        def: Register,
        array: Register,
        index: Operand,
        element_type: TypeReference,
    },
    ArrayStore {
        array: Register,
        index: Operand,
        value: Operand,
        element_type: TypeReference,
    },
    /// Field read; `receiver` is absent for static fields
    GetField {
        def: Register,
        #[serde(default)]
        receiver: Option<Register>,
        field: FieldReference,
    },
    /// Field write; `receiver` is absent for static fields
    PutField {
        #[serde(default)]
        receiver: Option<Register>,
        field: FieldReference,
        value: Operand,
    },
    /// Method call; for non-static kinds `args[0]` is the receiver
    Invoke {
        #[serde(default)]
        def: Option<Register>,
        kind: InvokeKind,
        method: MethodReference,
        #[serde(default)]
        args: Vec<Operand>,
    },
    ConditionalBranch {
        condition: ConditionOperator,
        left: Operand,
        right: Operand,
        target: usize,
    },
    Goto { target: usize },
    Switch {
        key: Operand,
        cases: Vec<SwitchCase>,
        default: usize,
    },
    Return {
        #[serde(default)]
        value: Option<Operand>,
    },
    Throw { exception: Register },
    /// Handler entry: binds the in-flight exception
    GetCaughtException { def: Register },
    /// An opcode the front end passes through without a model (monitors, invokedynamic, ...)
    Unsupported { opcode: String },
}

impl InstructionKind {
    /// Instruction indices this instruction may transfer control to (besides falling through)
    pub fn branch_targets(&self) -> Vec<usize> {
        match self {
            InstructionKind::ConditionalBranch { target, .. } | InstructionKind::Goto { target } => {
                vec![*target]
            }
            InstructionKind::Switch { cases, default, .. } => {
                let mut targets: Vec<usize> = cases.iter().map(|c| c.target).collect();
                targets.push(*default);
                targets
            }
            _ => Vec::new(),
        }
    }

    /// Short opcode name used in diagnostics
    pub fn opcode(&self) -> &str {
        match self {
            InstructionKind::Constant { .. } => "constant",
            InstructionKind::Move { .. } => "move",
            InstructionKind::Binary { .. } => "binary",
            InstructionKind::Negate { .. } => "negate",
            InstructionKind::Convert { .. } => "convert",
            InstructionKind::CheckCast { .. } => "check_cast",
            InstructionKind::InstanceOf { .. } => "instance_of",
            InstructionKind::New { .. } => "new",
            InstructionKind::NewArray { .. } => "new_array",
            InstructionKind::ArrayLength { .. } => "array_length",
            InstructionKind::ArrayLoad { .. } => "array_load",
            InstructionKind::ArrayStore { .. } => "array_store",
            InstructionKind::GetField { .. } => "get_field",
            InstructionKind::PutField { .. } => "put_field",
            InstructionKind::Invoke { .. } => "invoke",
            InstructionKind::ConditionalBranch { .. } => "conditional_branch",
            InstructionKind::Goto { .. } => "goto",
            InstructionKind::Switch { .. } => "switch",
            InstructionKind::Return { .. } => "return",
            InstructionKind::Throw { .. } => "throw",
            InstructionKind::GetCaughtException { .. } => "get_caught_exception",
            InstructionKind::Unsupported { opcode } => opcode,
        }
    }
}

/// A foreign instruction with its optional debug position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignInstruction {
    #[serde(flatten)]
    pub kind: InstructionKind,
    #[serde(default)]
    pub position: Option<SourcePosition>,
}

impl ForeignInstruction {
    pub fn new(kind: InstructionKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    pub fn at(kind: InstructionKind, position: SourcePosition) -> Self {
        Self {
            kind,
            position: Some(position),
        }
    }
}

impl From<InstructionKind> for ForeignInstruction {
    fn from(kind: InstructionKind) -> Self {
        Self::new(kind)
    }
}
