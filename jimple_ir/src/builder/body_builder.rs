//! Per-method body construction.
//!
//! Construction runs in phases:
//! 1. identity statements for the receiver and the declared parameters
//! 2. translation of every foreign instruction, recording which statements each
//!    instruction produced; branch destinations are left pending
//! 3. a synthesized `return` for void methods that would fall off the end
//! 4. branch target resolution
//! 5. traps from the exception table
//! 6. assembly and validation of the body

use super::class_names::ClassNameTable;
use super::types::{convert_class_type, convert_type};
use crate::config::BuilderConfig;
use crate::error::ConversionErrorKind;
use crate::ir::{
    Body, IdentityRef, LocalId, MethodSignature, PositionInfo, Stmt, StmtId, StmtKind, Trap,
};
use crate::local_generator::LocalGenerator;
use crate::types::{ClassType, Type, JAVA_LANG_THROWABLE};
use jimple_ir_frontend::{ForeignCode, ForeignMethod, Register};
use std::collections::HashMap;
use std::ops::Range;

/// A branch statement whose foreign destinations still need resolving.
#[derive(Debug)]
struct PendingBranch {
    stmt: usize,
    /// Source instruction, for error reporting
    index: usize,
    /// Foreign destinations in the order of [`Stmt::targets_mut`]
    targets: Vec<usize>,
}

pub(crate) struct BodyBuilder<'a> {
    pub(super) method: &'a ForeignMethod,
    pub(super) code: &'a ForeignCode,
    pub(super) names: &'a mut ClassNameTable,
    config: &'a BuilderConfig,
    signature: MethodSignature,
    pub(super) locals: LocalGenerator,
    pub(super) registers: HashMap<Register, LocalId>,
    pub(super) register_hints: HashMap<Register, Type>,
    pub(super) stmts: Vec<Stmt>,
    /// Statements produced by each foreign instruction
    produced: Vec<Range<usize>>,
    pending: Vec<PendingBranch>,
}

impl<'a> BodyBuilder<'a> {
    pub(crate) fn new(
        method: &'a ForeignMethod,
        code: &'a ForeignCode,
        names: &'a mut ClassNameTable,
        config: &'a BuilderConfig,
        signature: MethodSignature,
    ) -> Self {
        Self {
            method,
            code,
            names,
            config,
            signature,
            locals: LocalGenerator::new(),
            registers: HashMap::new(),
            register_hints: HashMap::new(),
            stmts: Vec::new(),
            produced: Vec::with_capacity(code.instructions.len()),
            pending: Vec::new(),
        }
    }

    pub(crate) fn build(mut self) -> Result<Body, ConversionErrorKind> {
        self.register_hints = self.infer_register_hints()?;
        self.emit_identities();

        let code = self.code;
        for (index, instruction) in code.instructions.iter().enumerate() {
            let start = self.stmts.len();
            self.translate(index, instruction)?;
            self.produced.push(start..self.stmts.len());
        }

        self.synthesize_return_void();
        self.resolve_branches()?;
        let traps = self.convert_exception_table()?;

        let position = PositionInfo::from(self.code.body_position);
        let body = Body::new(
            self.signature,
            self.locals.into_locals(),
            self.stmts,
            traps,
            position,
        )?;
        Ok(body)
    }

    /// Identity statements binding `this` and every declared parameter.
    fn emit_identities(&mut self) {
        let position = PositionInfo::from(self.code.body_position);
        if !self.method.is_static() {
            let this_type = Type::Class(self.signature.declaring_class.clone());
            let this = self.locals.generate_this(&this_type);
            self.registers.insert(Register(0), this);
            self.stmts.push(Stmt::new(
                StmtKind::Identity {
                    local: this,
                    value: IdentityRef::This(this_type),
                },
                position,
            ));
        }

        let parameter_types = self.signature.parameter_types.clone();
        for (index, ty) in parameter_types.into_iter().enumerate() {
            let local = self.locals.generate(&ty, false);
            self.registers
                .insert(Register(self.method.parameter_register(index)), local);
            self.stmts.push(Stmt::new(
                StmtKind::Identity {
                    local,
                    value: IdentityRef::Parameter { index, ty },
                },
                position,
            ));
        }
    }

    /// The local backing `register`, created on first sight.
    pub(super) fn register_local(&mut self, register: Register) -> LocalId {
        if let Some(local) = self.registers.get(&register) {
            return *local;
        }
        let ty = self
            .register_hints
            .get(&register)
            .cloned()
            .unwrap_or(Type::Bottom);
        let local = self.locals.generate(&ty, false);
        self.registers.insert(register, local);
        local
    }

    /// Type of the catch clauses that enter the handler at `index`
    pub(super) fn handler_catch_type(&mut self, index: usize) -> Result<Type, ConversionErrorKind> {
        let code = self.code;
        let mut caught: Option<ClassType> = None;
        for entry in &code.exception_table {
            if entry.handler != Some(index) {
                continue;
            }
            let class = match &entry.catch_type {
                Some(ty) => convert_class_type(self.names, ty)?,
                None => JAVA_LANG_THROWABLE.clone(),
            };
            match &caught {
                None => caught = Some(class),
                Some(existing) if *existing == class => {}
                Some(_) => return Ok(Type::throwable()),
            }
        }
        Ok(caught.map(Type::Class).unwrap_or_else(Type::throwable))
    }

    /// Push a branch statement and remember its foreign destinations.
    pub(super) fn push_branch(
        &mut self,
        index: usize,
        kind: StmtKind,
        targets: Vec<usize>,
        position: PositionInfo,
    ) {
        self.pending.push(PendingBranch {
            stmt: self.stmts.len(),
            index,
            targets,
        });
        self.stmts.push(Stmt::new(kind, position));
    }

    /// First statement produced by instruction `index` or, if it produced none, by
    /// a later instruction.
    fn first_stmt_from(&self, index: usize) -> Option<StmtId> {
        self.produced
            .get(index..)?
            .iter()
            .find(|range| !range.is_empty())
            .map(|range| StmtId(range.start as u32))
    }

    /// First and last statement produced by the instructions `start..=end`
    fn stmt_span(&self, start: usize, end: usize) -> Option<(StmtId, StmtId)> {
        let mut ranges = self.produced.get(start..=end)?.iter().filter(|r| !r.is_empty());
        let first = ranges.next()?;
        let last = ranges.last().unwrap_or(first);
        Some((StmtId(first.start as u32), StmtId(last.end as u32 - 1)))
    }

    fn synthesize_return_void(&mut self) {
        if self.signature.return_type != Type::Void || !self.config.synthesize_return_void {
            return;
        }
        let falls_off = self.stmts.last().map(Stmt::falls_through).unwrap_or(true);
        let handlers = self.code.exception_table.iter().filter_map(|e| e.handler);
        let dangling = self
            .pending
            .iter()
            .flat_map(|branch| branch.targets.iter().copied())
            .chain(handlers)
            .any(|t| t < self.produced.len() && self.first_stmt_from(t).is_none());
        if !falls_off && !dangling {
            return;
        }

        let position = self
            .code
            .instructions
            .last()
            .and_then(|i| i.position)
            .or(self.code.body_position);
        tracing::debug!(
            method = %self.signature,
            "synthesizing return-void at end of body"
        );
        self.stmts
            .push(Stmt::new(StmtKind::ReturnVoid, PositionInfo::from(position)));
    }

    /// Statement a branch or handler at instruction `index` lands on: the first one
    /// produced from `index` onwards, else the synthesized return-void.
    fn resolve_target(&self, index: usize) -> Option<StmtId> {
        if index >= self.produced.len() {
            return None;
        }
        let end_of_body = self.produced.last().map(|r| r.end).unwrap_or(0);
        self.first_stmt_from(index).or_else(|| {
            // only a synthesized return follows the last produced statement
            (end_of_body < self.stmts.len()).then_some(StmtId(end_of_body as u32))
        })
    }

    fn resolve_branches(&mut self) -> Result<(), ConversionErrorKind> {
        let pending = std::mem::take(&mut self.pending);
        for branch in pending {
            let mut resolved = Vec::with_capacity(branch.targets.len());
            for target in &branch.targets {
                let id = self.resolve_target(*target).ok_or(ConversionErrorKind::InvalidBranchTarget {
                    index: branch.index,
                    target: *target,
                })?;
                resolved.push(id);
            }
            for (slot, id) in self.stmts[branch.stmt].targets_mut().into_iter().zip(resolved) {
                *slot = id;
            }
        }
        Ok(())
    }

    fn convert_exception_table(&mut self) -> Result<Vec<Trap>, ConversionErrorKind> {
        let code = self.code;
        let len = code.instructions.len();
        let mut traps = Vec::new();
        for (entry_index, entry) in code.exception_table.iter().enumerate() {
            let Some(handler) = entry.handler else {
                continue;
            };
            let malformed = |reason: String| ConversionErrorKind::MalformedExceptionTable {
                entry: entry_index,
                reason,
            };
            if entry.start >= len || entry.end >= len || handler >= len {
                return Err(malformed(format!(
                    "range {}..={} with handler {} exceeds {} instructions",
                    entry.start, entry.end, handler, len
                )));
            }
            if entry.start > entry.end {
                return Err(malformed(format!(
                    "range starts at {} after its end {}",
                    entry.start, entry.end
                )));
            }

            let Some((begin, end)) = self.stmt_span(entry.start, entry.end) else {
                tracing::debug!(
                    method = %self.signature,
                    entry = entry_index,
                    "exception range produced no statements, no trap created"
                );
                continue;
            };
            let handler = self.resolve_target(handler).ok_or_else(|| {
                malformed(format!("handler {} is followed by no statement", handler))
            })?;

            let exception = match &entry.catch_type {
                Some(ty) => convert_class_type(self.names, ty)?,
                None => JAVA_LANG_THROWABLE.clone(),
            };
            traps.push(Trap {
                exception,
                begin,
                end,
                handler,
            });
        }
        Ok(traps)
    }

    /// Type of each register's first definition, in instruction order; receiver and
    /// parameter registers take their declared types.
    fn infer_register_hints(&mut self) -> Result<HashMap<Register, Type>, ConversionErrorKind> {
        let code = self.code;
        let mut hints: HashMap<Register, Type> = HashMap::new();
        if !self.method.is_static() {
            let this_type = Type::Class(self.signature.declaring_class.clone());
            hints.insert(Register(0), this_type);
        }
        for (index, ty) in self.signature.parameter_types.iter().enumerate() {
            hints.insert(Register(self.method.parameter_register(index)), ty.clone());
        }
        for (index, instruction) in code.instructions.iter().enumerate() {
            if let Some((def, ty)) = self.def_hint(index, &instruction.kind, &hints)? {
                hints.entry(def).or_insert(ty);
            }
        }
        Ok(hints)
    }

    pub(super) fn reference_type(
        &mut self,
        ty: &jimple_ir_frontend::TypeReference,
    ) -> Result<Type, ConversionErrorKind> {
        convert_type(self.names, ty)
    }
}
