//! Shared helpers for integration tests
// Each test target uses a different subset of these helpers.
#![allow(dead_code)]

use jimple_ir::ir::{
    Constant, IdentityRef, Immediate, InvokeExpr, InvokeKind, Place, PositionInfo, Value,
};
use jimple_ir::*;
use jimple_ir_frontend::ForeignClass;

/// `Super1 <- Sub1, Sub2`, plus unrelated `A` and `B`.
pub fn demo_hierarchy() -> ClassHierarchy {
    let mut h = ClassHierarchy::new();
    h.add_class("Demo", None, &[]);
    h.add_class("Super1", None, &[]);
    h.add_class("Sub1", Some("Super1"), &[]);
    h.add_class("Sub2", Some("Super1"), &[]);
    h.add_class("A", None, &[]);
    h.add_class("B", None, &[]);
    h
}

/// Route `tracing` output through the test harness; repeated calls are harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn load_class(json: &str) -> ForeignClass {
    ForeignClass::from_json(json).unwrap_or_else(|e| panic!("invalid class: {}", e))
}

/// Convert every method of `class`, registering it in `hierarchy` first.
pub fn convert_all(class: &ForeignClass, hierarchy: &mut ClassHierarchy) -> Vec<MethodBody> {
    let mut converter = Converter::default();
    converter
        .register_class(hierarchy, class)
        .unwrap_or_else(|e| panic!("cannot register class: {}", e));
    converter
        .convert_class(class)
        .unwrap_or_else(|e| panic!("cannot convert class: {}", e))
        .methods
}

/// The body of the method called `name` (`pkg.Class.name`).
pub fn body_named<'a>(methods: &'a [MethodBody], name: &str) -> &'a Body {
    methods
        .iter()
        .find(|m| m.method == name)
        .and_then(MethodBody::body)
        .unwrap_or_else(|| panic!("no body for {}", name))
}

pub fn type_of<'a>(body: &'a Body, name: &str) -> &'a Type {
    let id = body
        .local_by_name(name)
        .unwrap_or_else(|| panic!("no local {} in\n{}", name, body));
    body.local(id).ty()
}

// ============================================================================
// Hand-built bodies
// ============================================================================

/// Incremental construction of a body with named locals.
pub struct BodyFixture {
    signature: MethodSignature,
    locals: Vec<Local>,
    stmts: Vec<Stmt>,
    traps: Vec<Trap>,
}

impl BodyFixture {
    pub fn new(name: &str, params: Vec<Type>, ret: Type) -> Self {
        Self {
            signature: MethodSignature::new(ClassType::new("Demo"), name, params, ret),
            locals: Vec::new(),
            stmts: Vec::new(),
            traps: Vec::new(),
        }
    }

    /// Declare a local; returns its id.
    pub fn local(&mut self, name: &str, ty: Type) -> LocalId {
        self.locals.push(Local::new(name, ty));
        LocalId(self.locals.len() as u32 - 1)
    }

    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        self.stmts.push(Stmt::new(kind, PositionInfo::none()));
        StmtId(self.stmts.len() as u32 - 1)
    }

    pub fn this(&mut self, local: LocalId) -> StmtId {
        self.stmt(StmtKind::Identity {
            local,
            value: IdentityRef::This(Type::class("Demo")),
        })
    }

    pub fn assign(&mut self, target: LocalId, value: Value) -> StmtId {
        self.stmt(StmtKind::Assign {
            target: Place::Local(target),
            value,
        })
    }

    pub fn int(&mut self, target: LocalId, value: i32) -> StmtId {
        self.assign(target, Value::constant(Constant::Int(value)))
    }

    pub fn new_object(&mut self, target: LocalId, class: &str) -> StmtId {
        self.assign(target, Value::New(ClassType::new(class)))
    }

    /// `specialinvoke base.<class: void <init>()>()`
    pub fn init(&mut self, base: LocalId, class: &str) -> StmtId {
        self.invoke(InvokeKind::Special, class, "<init>", vec![], Some(base), vec![])
    }

    pub fn invoke(
        &mut self,
        kind: InvokeKind,
        class: &str,
        name: &str,
        params: Vec<Type>,
        base: Option<LocalId>,
        args: Vec<Immediate>,
    ) -> StmtId {
        self.stmt(StmtKind::Invoke(InvokeExpr {
            kind,
            method: MethodSignature::new(ClassType::new(class), name, params, Type::Void),
            base,
            args,
        }))
    }

    pub fn trap(&mut self, exception: &str, begin: StmtId, end: StmtId, handler: StmtId) {
        self.traps.push(Trap {
            exception: ClassType::new(exception),
            begin,
            end,
            handler,
        });
    }

    pub fn build(self) -> Body {
        Body::new(
            self.signature,
            self.locals,
            self.stmts,
            self.traps,
            PositionInfo::none(),
        )
        .unwrap_or_else(|e| panic!("invalid body: {}", e))
    }
}

// ============================================================================
// Body properties
// ============================================================================

/// Local names are unique and every branch and trap target lies inside the body.
pub fn assert_well_formed(body: &Body) {
    let mut names: Vec<&str> = body.locals().iter().map(Local::name).collect();
    names.sort_unstable();
    let count = names.len();
    names.dedup();
    assert_eq!(names.len(), count, "duplicate local names in\n{}", body);

    for target in body.branch_targets() {
        assert!(
            target.index() < body.stmts().len(),
            "target {} outside of\n{}",
            target,
            body
        );
    }
    assert_eq!(body.validate(), Ok(()));
}
