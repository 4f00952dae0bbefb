//! Textual rendering of bodies in Jimple-like notation.
//!
//! ```text
//! <Demo: void run(int)> {
//!     Demo r0;
//!     int i0;
//!
//!     r0 := @this: Demo;
//!     i0 := @parameter0: int;
//!     if i0 >= 10 goto label1;
//!     return;
//!
//!   label1:
//!     return;
//! }
//! ```

use super::body::Body;
use super::local::LocalId;
use super::stmt::{StmtId, StmtKind};
use super::value::{Condition, Immediate, InvokeExpr, Place, Value};
use std::collections::HashMap;
use std::fmt::{self, Write};

struct Printer<'a> {
    body: &'a Body,
    labels: HashMap<StmtId, String>,
}

impl<'a> Printer<'a> {
    fn new(body: &'a Body) -> Self {
        let labels = body
            .branch_targets()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, format!("label{}", i + 1)))
            .collect();
        Self { body, labels }
    }

    fn label(&self, id: StmtId) -> &str {
        self.labels.get(&id).map(String::as_str).unwrap_or("?")
    }

    fn immediate(&self, imm: &Immediate) -> String {
        match imm {
            Immediate::Local(id) => self.body.local(*id).name().to_string(),
            Immediate::Constant(c) => c.to_string(),
        }
    }

    fn local(&self, id: LocalId) -> &str {
        self.body.local(id).name()
    }

    fn invoke(&self, expr: &InvokeExpr) -> String {
        let args: Vec<String> = expr.args.iter().map(|a| self.immediate(a)).collect();
        match expr.base {
            Some(base) => format!(
                "{} {}.{}({})",
                expr.kind.keyword(),
                self.local(base),
                expr.method,
                args.join(", ")
            ),
            None => format!("{} {}({})", expr.kind.keyword(), expr.method, args.join(", ")),
        }
    }

    fn condition(&self, cond: &Condition) -> String {
        format!(
            "{} {} {}",
            self.immediate(&cond.left),
            cond.op.symbol(),
            self.immediate(&cond.right)
        )
    }

    fn value(&self, value: &Value) -> String {
        match value {
            Value::Immediate(imm) => self.immediate(imm),
            Value::Binary { op, left, right } => format!(
                "{} {} {}",
                self.immediate(left),
                op.symbol(),
                self.immediate(right)
            ),
            Value::Negate(op) => format!("neg {}", self.immediate(op)),
            Value::Cast { ty, operand } => format!("({}) {}", ty, self.immediate(operand)),
            Value::InstanceOf { ty, operand } => {
                format!("{} instanceof {}", self.immediate(operand), ty)
            }
            Value::New(class) => format!("new {}", class),
            Value::NewArray { element, size } => {
                format!("newarray ({})[{}]", element, self.immediate(size))
            }
            Value::NewMultiArray { ty, sizes } => {
                let mut s = format!("newmultiarray ({})", ty.base());
                for size in sizes {
                    let _ = write!(s, "[{}]", self.immediate(size));
                }
                for _ in sizes.len()..ty.dimension() {
                    s.push_str("[]");
                }
                s
            }
            Value::Length(op) => format!("lengthof {}", self.immediate(op)),
            Value::ArrayRef { base, index } => {
                format!("{}[{}]", self.local(*base), self.immediate(index))
            }
            Value::InstanceField { base, field } => format!("{}.{}", self.local(*base), field),
            Value::StaticField(field) => field.to_string(),
            Value::Invoke(expr) => self.invoke(expr),
        }
    }

    fn place(&self, place: &Place) -> String {
        match place {
            Place::Local(id) => self.local(*id).to_string(),
            Place::ArrayRef { base, index } => {
                format!("{}[{}]", self.local(*base), self.immediate(index))
            }
            Place::InstanceField { base, field } => format!("{}.{}", self.local(*base), field),
            Place::StaticField(field) => field.to_string(),
        }
    }

    fn stmt(&self, out: &mut fmt::Formatter<'_>, kind: &StmtKind) -> fmt::Result {
        match kind {
            StmtKind::Identity { local, value } => {
                writeln!(out, "    {} := {};", self.local(*local), value)
            }
            StmtKind::Assign { target, value } => {
                writeln!(out, "    {} = {};", self.place(target), self.value(value))
            }
            StmtKind::Invoke(expr) => writeln!(out, "    {};", self.invoke(expr)),
            StmtKind::If { condition, target } => writeln!(
                out,
                "    if {} goto {};",
                self.condition(condition),
                self.label(*target)
            ),
            StmtKind::Goto { target } => writeln!(out, "    goto {};", self.label(*target)),
            StmtKind::Switch {
                key,
                cases,
                default,
            } => {
                writeln!(out, "    lookupswitch({})", self.immediate(key))?;
                writeln!(out, "    {{")?;
                for case in cases {
                    writeln!(
                        out,
                        "        case {}: goto {};",
                        case.value,
                        self.label(case.target)
                    )?;
                }
                writeln!(out, "        default: goto {};", self.label(*default))?;
                writeln!(out, "    }};")
            }
            StmtKind::Return(value) => writeln!(out, "    return {};", self.immediate(value)),
            StmtKind::ReturnVoid => writeln!(out, "    return;"),
            StmtKind::Throw(value) => writeln!(out, "    throw {};", self.immediate(value)),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printer = Printer::new(self);
        writeln!(f, "{} {{", self.signature())?;
        for local in self.locals() {
            writeln!(f, "    {} {};", local.ty(), local.name())?;
        }
        if !self.locals().is_empty() && !self.is_empty() {
            writeln!(f)?;
        }
        for (id, stmt) in self.stmt_ids().zip(self.stmts()) {
            if let Some(label) = printer.labels.get(&id) {
                if id.index() > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "  {}:", label)?;
            }
            printer.stmt(f, &stmt.kind)?;
        }
        if !self.traps().is_empty() {
            writeln!(f)?;
        }
        for trap in self.traps() {
            writeln!(
                f,
                "    catch {} from {} to {} with {};",
                trap.exception,
                printer.label(trap.begin),
                printer.label(trap.end),
                printer.label(trap.handler)
            )?;
        }
        write!(f, "}}")
    }
}
