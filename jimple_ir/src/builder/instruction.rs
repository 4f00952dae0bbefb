//! Translation of single foreign instructions into statements.

use super::body_builder::BodyBuilder;
use super::types::{convert_constant, convert_field_ref, convert_method_ref};
use crate::error::ConversionErrorKind;
use crate::ir::{
    BinaryOp, Condition, ConditionOp, IdentityRef, Immediate, InvokeExpr, InvokeKind, Place,
    PositionInfo, Stmt, StmtId, StmtKind, SwitchCase, Value,
};
use crate::types::Type;
use jimple_ir_frontend::{
    BinaryOperator, ConditionOperator, ForeignInstruction, InstructionKind,
    InvokeKind as ForeignInvokeKind, Operand, Register,
};
use std::collections::HashMap;

/// Placeholder target until branches are resolved
const UNRESOLVED: StmtId = StmtId(u32::MAX);

fn binary_op(op: BinaryOperator) -> BinaryOp {
    match op {
        BinaryOperator::Add => BinaryOp::Add,
        BinaryOperator::Sub => BinaryOp::Sub,
        BinaryOperator::Mul => BinaryOp::Mul,
        BinaryOperator::Div => BinaryOp::Div,
        BinaryOperator::Rem => BinaryOp::Rem,
        BinaryOperator::And => BinaryOp::And,
        BinaryOperator::Or => BinaryOp::Or,
        BinaryOperator::Xor => BinaryOp::Xor,
        BinaryOperator::Shl => BinaryOp::Shl,
        BinaryOperator::Shr => BinaryOp::Shr,
        BinaryOperator::Ushr => BinaryOp::Ushr,
        BinaryOperator::Cmp => BinaryOp::Cmp,
        BinaryOperator::Cmpl => BinaryOp::Cmpl,
        BinaryOperator::Cmpg => BinaryOp::Cmpg,
    }
}

fn condition_op(op: ConditionOperator) -> ConditionOp {
    match op {
        ConditionOperator::Eq => ConditionOp::Eq,
        ConditionOperator::Ne => ConditionOp::Ne,
        ConditionOperator::Lt => ConditionOp::Lt,
        ConditionOperator::Ge => ConditionOp::Ge,
        ConditionOperator::Gt => ConditionOp::Gt,
        ConditionOperator::Le => ConditionOp::Le,
    }
}

fn invoke_kind(kind: ForeignInvokeKind) -> InvokeKind {
    match kind {
        ForeignInvokeKind::Virtual => InvokeKind::Virtual,
        ForeignInvokeKind::Special => InvokeKind::Special,
        ForeignInvokeKind::Static => InvokeKind::Static,
        ForeignInvokeKind::Interface => InvokeKind::Interface,
    }
}

impl BodyBuilder<'_> {
    fn immediate(&mut self, operand: &Operand) -> Result<Immediate, ConversionErrorKind> {
        Ok(match operand {
            Operand::Register(r) => Immediate::Local(self.register_local(*r)),
            Operand::Constant(c) => Immediate::Constant(convert_constant(self.names, c)?),
        })
    }

    fn assign(&mut self, def: Register, value: Value, position: PositionInfo) {
        let local = self.register_local(def);
        self.stmts.push(Stmt::new(
            StmtKind::Assign {
                target: Place::Local(local),
                value,
            },
            position,
        ));
    }

    fn store(&mut self, target: Place, value: Value, position: PositionInfo) {
        self.stmts
            .push(Stmt::new(StmtKind::Assign { target, value }, position));
    }

    /// Translate one instruction, appending zero or more statements.
    pub(super) fn translate(
        &mut self,
        index: usize,
        instruction: &ForeignInstruction,
    ) -> Result<(), ConversionErrorKind> {
        let position = PositionInfo::from(instruction.position);
        match &instruction.kind {
            InstructionKind::Constant { def, value } => {
                let constant = convert_constant(self.names, value)?;
                self.assign(*def, Value::constant(constant), position);
            }
            InstructionKind::Move { def, source } => {
                if def != source {
                    let source = self.register_local(*source);
                    self.assign(*def, Value::local(source), position);
                }
            }
            InstructionKind::Binary {
                def,
                operator,
                left,
                right,
            } => {
                let left = self.immediate(left)?;
                let right = self.immediate(right)?;
                let value = Value::Binary {
                    op: binary_op(*operator),
                    left,
                    right,
                };
                self.assign(*def, value, position);
            }
            InstructionKind::Negate { def, operand } => {
                let operand = self.immediate(operand)?;
                self.assign(*def, Value::Negate(operand), position);
            }
            InstructionKind::Convert { def, value, to, .. } => {
                let ty = self.reference_type(to)?;
                if !ty.is_primitive() {
                    return Err(ConversionErrorKind::UnsupportedOperand {
                        index,
                        detail: format!("conversion to non-primitive type {}", ty),
                    });
                }
                let operand = self.immediate(value)?;
                self.assign(*def, Value::Cast { ty, operand }, position);
            }
            InstructionKind::CheckCast {
                def,
                value,
                declared,
            } => {
                let ty = self.reference_type(declared)?;
                let operand = Immediate::Local(self.register_local(*value));
                self.assign(*def, Value::Cast { ty, operand }, position);
            }
            InstructionKind::InstanceOf {
                def,
                value,
                checked,
            } => {
                let ty = self.reference_type(checked)?;
                let operand = Immediate::Local(self.register_local(*value));
                self.assign(*def, Value::InstanceOf { ty, operand }, position);
            }
            InstructionKind::New { def, class } => match self.reference_type(class)? {
                Type::Class(class) => self.assign(*def, Value::New(class), position),
                other => {
                    return Err(ConversionErrorKind::UnsupportedOperand {
                        index,
                        detail: format!("new of non-class type {}", other),
                    })
                }
            },
            InstructionKind::NewArray {
                def,
                array_type,
                lengths,
            } => {
                let Type::Array(ty) = self.reference_type(array_type)? else {
                    return Err(ConversionErrorKind::UnsupportedOperand {
                        index,
                        detail: format!("new_array of non-array type {}", array_type),
                    });
                };
                if lengths.is_empty() || lengths.len() > ty.dimension() {
                    return Err(ConversionErrorKind::UnsupportedOperand {
                        index,
                        detail: format!(
                            "{} lengths for a {}-dimensional array",
                            lengths.len(),
                            ty.dimension()
                        ),
                    });
                }
                let sizes = lengths
                    .iter()
                    .map(|l| self.immediate(l))
                    .collect::<Result<Vec<_>, _>>()?;
                let value = if sizes.len() == 1 {
                    Value::NewArray {
                        element: ty.element_type(),
                        size: sizes.into_iter().next().unwrap_or(Immediate::int(0)),
                    }
                } else {
                    Value::NewMultiArray { ty, sizes }
                };
                self.assign(*def, value, position);
            }
            InstructionKind::ArrayLength { def, array } => {
                let array = Immediate::Local(self.register_local(*array));
                self.assign(*def, Value::Length(array), position);
            }
            InstructionKind::ArrayLoad {
                def, array, index: element, ..
            } => {
                let base = self.register_local(*array);
                let index = self.immediate(element)?;
                self.assign(*def, Value::ArrayRef { base, index }, position);
            }
            InstructionKind::ArrayStore {
                array,
                index: element,
                value,
                ..
            } => {
                let base = self.register_local(*array);
                let index = self.immediate(element)?;
                let value = Value::Immediate(self.immediate(value)?);
                self.store(Place::ArrayRef { base, index }, value, position);
            }
            InstructionKind::GetField {
                def,
                receiver,
                field,
            } => {
                let field = convert_field_ref(self.names, field)?;
                let value = match receiver {
                    Some(r) => Value::InstanceField {
                        base: self.register_local(*r),
                        field,
                    },
                    None => Value::StaticField(field),
                };
                self.assign(*def, value, position);
            }
            InstructionKind::PutField {
                receiver,
                field,
                value,
            } => {
                let field = convert_field_ref(self.names, field)?;
                let target = match receiver {
                    Some(r) => Place::InstanceField {
                        base: self.register_local(*r),
                        field,
                    },
                    None => Place::StaticField(field),
                };
                let value = Value::Immediate(self.immediate(value)?);
                self.store(target, value, position);
            }
            InstructionKind::Invoke {
                def,
                kind,
                method,
                args,
            } => {
                let kind = invoke_kind(*kind);
                let method = convert_method_ref(self.names, method)?;
                if def.is_some() && method.return_type == Type::Void {
                    return Err(ConversionErrorKind::UnsupportedOperand {
                        index,
                        detail: format!("result of void method {} is assigned", method),
                    });
                }
                let (base, args) = if kind == InvokeKind::Static {
                    (None, args.as_slice())
                } else {
                    match args.split_first() {
                        Some((Operand::Register(r), rest)) => (Some(self.register_local(*r)), rest),
                        _ => {
                            return Err(ConversionErrorKind::UnsupportedOperand {
                                index,
                                detail: format!(
                                    "{} of {} has no receiver register",
                                    kind.keyword(),
                                    method
                                ),
                            })
                        }
                    }
                };
                let args = args
                    .iter()
                    .map(|a| self.immediate(a))
                    .collect::<Result<Vec<_>, _>>()?;
                let expr = InvokeExpr {
                    kind,
                    method,
                    base,
                    args,
                };
                match def {
                    Some(def) => self.assign(*def, Value::Invoke(expr), position),
                    None => self
                        .stmts
                        .push(Stmt::new(StmtKind::Invoke(expr), position)),
                }
            }
            InstructionKind::ConditionalBranch {
                condition,
                left,
                right,
                target,
            } => {
                let condition = Condition {
                    op: condition_op(*condition),
                    left: self.immediate(left)?,
                    right: self.immediate(right)?,
                };
                let kind = StmtKind::If {
                    condition,
                    target: UNRESOLVED,
                };
                self.push_branch(index, kind, vec![*target], position);
            }
            InstructionKind::Goto { target } => {
                let kind = StmtKind::Goto { target: UNRESOLVED };
                self.push_branch(index, kind, vec![*target], position);
            }
            InstructionKind::Switch {
                key,
                cases,
                default,
            } => {
                let key = self.immediate(key)?;
                let kind = StmtKind::Switch {
                    key,
                    cases: cases
                        .iter()
                        .map(|c| SwitchCase {
                            value: c.value,
                            target: UNRESOLVED,
                        })
                        .collect(),
                    default: UNRESOLVED,
                };
                let targets = instruction.kind.branch_targets();
                self.push_branch(index, kind, targets, position);
            }
            InstructionKind::Return { value } => {
                let kind = match value {
                    Some(v) => StmtKind::Return(self.immediate(v)?),
                    None => StmtKind::ReturnVoid,
                };
                self.stmts.push(Stmt::new(kind, position));
            }
            InstructionKind::Throw { exception } => {
                let exception = Immediate::Local(self.register_local(*exception));
                self.stmts
                    .push(Stmt::new(StmtKind::Throw(exception), position));
            }
            InstructionKind::GetCaughtException { def } => {
                let ty = self.handler_catch_type(index)?;
                let caught = self.locals.generate(&ty, true);
                self.stmts.push(Stmt::new(
                    StmtKind::Identity {
                        local: caught,
                        value: IdentityRef::CaughtException(ty),
                    },
                    position,
                ));
                self.assign(*def, Value::local(caught), position);
            }
            InstructionKind::Unsupported { opcode } => {
                return Err(ConversionErrorKind::UnsupportedInstruction {
                    index,
                    opcode: opcode.clone(),
                });
            }
        }
        Ok(())
    }

    /// Register defined by an instruction and the type it receives.
    pub(super) fn def_hint(
        &mut self,
        index: usize,
        kind: &InstructionKind,
        hints: &HashMap<Register, Type>,
    ) -> Result<Option<(Register, Type)>, ConversionErrorKind> {
        let operand_type = |this: &mut Self, operand: &Operand| -> Result<Type, ConversionErrorKind> {
            Ok(match operand {
                Operand::Register(r) => hints.get(r).cloned().unwrap_or(Type::Bottom),
                Operand::Constant(c) => convert_constant(this.names, c)?.ty(),
            })
        };
        let hint = match kind {
            InstructionKind::Constant { def, value } => {
                (*def, convert_constant(self.names, value)?.ty())
            }
            InstructionKind::Move { def, source } => {
                (*def, hints.get(source).cloned().unwrap_or(Type::Bottom))
            }
            InstructionKind::Binary {
                def,
                operator,
                left,
                right,
            } => {
                let ty = if binary_op(*operator).is_comparison() {
                    Type::INT
                } else {
                    match operand_type(self, left)? {
                        Type::Bottom => operand_type(self, right)?,
                        ty => ty,
                    }
                };
                (*def, ty)
            }
            InstructionKind::Negate { def, operand } => (*def, operand_type(self, operand)?),
            InstructionKind::Convert { def, to, .. } => (*def, self.reference_type(to)?),
            InstructionKind::CheckCast { def, declared, .. } => {
                (*def, self.reference_type(declared)?)
            }
            InstructionKind::InstanceOf { def, .. } => (*def, Type::BOOLEAN),
            InstructionKind::New { def, class } => (*def, self.reference_type(class)?),
            InstructionKind::NewArray { def, array_type, .. } => {
                (*def, self.reference_type(array_type)?)
            }
            InstructionKind::ArrayLength { def, .. } => (*def, Type::INT),
            InstructionKind::ArrayLoad {
                def, element_type, ..
            } => (*def, self.reference_type(element_type)?),
            InstructionKind::GetField { def, field, .. } => {
                (*def, self.reference_type(&field.field_type)?)
            }
            InstructionKind::Invoke {
                def: Some(def),
                method,
                ..
            } => (*def, self.reference_type(&method.return_type)?),
            InstructionKind::GetCaughtException { def } => (*def, self.handler_catch_type(index)?),
            _ => return Ok(None),
        };
        Ok(Some(hint))
    }
}
