use super::splitting::webs;
use super::*;
use crate::config::TypeAssignerConfig;
use crate::ir::{
    Condition, ConditionOp, Constant, IdentityRef, Immediate, InvokeExpr, InvokeKind, Local,
    MethodSignature, Place, PositionInfo, Stmt, StmtGraph, StmtId, StmtKind, Trap, Value,
};
use crate::types::{ClassHierarchy, ClassType};
use pretty_assertions::assert_eq;

fn hierarchy() -> ClassHierarchy {
    let mut h = ClassHierarchy::new();
    h.add_class("Super1", None, &[]);
    h.add_class("Sub1", Some("Super1"), &[]);
    h.add_class("Sub2", Some("Super1"), &[]);
    h.add_interface("Shape", &[]);
    h.add_class("A", None, &["Shape"]);
    h.add_class("B", None, &["Shape"]);
    h
}

fn signature(params: Vec<Type>, ret: Type) -> MethodSignature {
    MethodSignature::new(ClassType::new("Demo"), "test", params, ret)
}

fn body(signature: MethodSignature, locals: &[(&str, Type)], stmts: Vec<StmtKind>) -> Body {
    body_with_traps(signature, locals, stmts, Vec::new())
}

fn body_with_traps(
    signature: MethodSignature,
    locals: &[(&str, Type)],
    stmts: Vec<StmtKind>,
    traps: Vec<Trap>,
) -> Body {
    Body::new(
        signature,
        locals
            .iter()
            .map(|(name, ty)| Local::new(*name, ty.clone()))
            .collect(),
        stmts
            .into_iter()
            .map(|kind| Stmt::new(kind, PositionInfo::none()))
            .collect(),
        traps,
        PositionInfo::none(),
    )
    .expect("valid body")
}

fn assign(local: u32, value: Value) -> StmtKind {
    StmtKind::Assign {
        target: Place::Local(LocalId(local)),
        value,
    }
}

fn local(id: u32) -> Immediate {
    Immediate::Local(LocalId(id))
}

fn call(
    kind: InvokeKind,
    class: &str,
    name: &str,
    params: Vec<Type>,
    base: Option<u32>,
    args: Vec<Immediate>,
) -> StmtKind {
    StmtKind::Invoke(InvokeExpr {
        kind,
        method: MethodSignature::new(ClassType::new(class), name, params, Type::Void),
        base: base.map(LocalId),
        args,
    })
}

fn assign_types(body: &Body) -> TypeAssignment {
    TypeAssigner::default()
        .assign(body, &hierarchy())
        .expect("typed body")
}

fn type_of<'a>(body: &'a Body, name: &str) -> &'a Type {
    let id = body.local_by_name(name).expect("local exists");
    body.local(id).ty()
}

// ============================================================================
// Propagation
// ============================================================================

#[test]
fn test_int_constants_take_the_narrowest_type() {
    let input = body(
        signature(vec![], Type::Void),
        &[("a", Type::INT), ("b", Type::INT), ("c", Type::INT)],
        vec![
            assign(0, Value::constant(Constant::Int(1))),
            assign(1, Value::constant(Constant::Int(300))),
            assign(2, Value::constant(Constant::Int(70_000))),
            StmtKind::ReturnVoid,
        ],
    );
    let result = assign_types(&input);

    assert_eq!(type_of(&result.body, "a"), &Type::BYTE);
    assert_eq!(type_of(&result.body, "b"), &Type::SHORT);
    assert_eq!(type_of(&result.body, "c"), &Type::INT);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_object_declaration_is_refined_by_definition() {
    let input = body(
        signature(vec![], Type::Void),
        &[("r0", Type::object())],
        vec![
            assign(0, Value::New(ClassType::new("Sub1"))),
            call(InvokeKind::Virtual, "Super1", "m", vec![], Some(0), vec![]),
            StmtKind::ReturnVoid,
        ],
    );
    let result = assign_types(&input);

    assert_eq!(type_of(&result.body, "r0"), &Type::class("Sub1"));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_unrelated_classes_join_to_object() {
    let input = body(
        signature(vec![Type::BOOLEAN], Type::Void),
        &[("z0", Type::BOOLEAN), ("r1", Type::Bottom)],
        vec![
            StmtKind::Identity {
                local: LocalId(0),
                value: IdentityRef::Parameter {
                    index: 0,
                    ty: Type::BOOLEAN,
                },
            },
            StmtKind::If {
                condition: Condition {
                    op: ConditionOp::Eq,
                    left: local(0),
                    right: Immediate::int(0),
                },
                target: StmtId(4),
            },
            assign(1, Value::New(ClassType::new("A"))),
            StmtKind::Goto { target: StmtId(5) },
            assign(1, Value::New(ClassType::new("B"))),
            StmtKind::ReturnVoid,
        ],
    );
    let result = assign_types(&input);

    // A and B share only an interface
    assert_eq!(type_of(&result.body, "r1"), &Type::object());
    assert_eq!(type_of(&result.body, "z0"), &Type::BOOLEAN);
}

#[test]
fn test_array_store_and_load() {
    let input = body(
        signature(vec![], Type::Void),
        &[("r0", Type::Bottom), ("r1", Type::Bottom), ("r2", Type::Bottom)],
        vec![
            assign(
                0,
                Value::NewArray {
                    element: Type::class("Super1"),
                    size: Immediate::int(10),
                },
            ),
            assign(1, Value::New(ClassType::new("Sub1"))),
            StmtKind::Assign {
                target: Place::ArrayRef {
                    base: LocalId(0),
                    index: Immediate::int(0),
                },
                value: Value::local(LocalId(1)),
            },
            assign(
                2,
                Value::ArrayRef {
                    base: LocalId(0),
                    index: Immediate::int(2),
                },
            ),
            StmtKind::ReturnVoid,
        ],
    );
    let result = assign_types(&input);

    assert_eq!(
        type_of(&result.body, "r0"),
        &Type::array(Type::class("Super1"), 1)
    );
    assert_eq!(type_of(&result.body, "r1"), &Type::class("Sub1"));
    assert_eq!(type_of(&result.body, "r2"), &Type::class("Super1"));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_null_local_takes_most_specific_requirement() {
    let input = body(
        signature(vec![], Type::Void),
        &[("r0", Type::Bottom)],
        vec![
            assign(0, Value::constant(Constant::Null)),
            call(InvokeKind::Virtual, "Super1", "m", vec![], Some(0), vec![]),
            call(
                InvokeKind::Static,
                "Demo",
                "keep",
                vec![Type::class("Sub1")],
                None,
                vec![local(0)],
            ),
            StmtKind::ReturnVoid,
        ],
    );
    let result = assign_types(&input);

    assert_eq!(type_of(&result.body, "r0"), &Type::class("Sub1"));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_moves_and_comparisons() {
    let input = body(
        signature(vec![Type::LONG], Type::INT),
        &[("l0", Type::LONG), ("v1", Type::Bottom), ("v2", Type::Bottom)],
        vec![
            StmtKind::Identity {
                local: LocalId(0),
                value: IdentityRef::Parameter {
                    index: 0,
                    ty: Type::LONG,
                },
            },
            assign(1, Value::local(LocalId(0))),
            assign(
                2,
                Value::Binary {
                    op: crate::ir::BinaryOp::Cmp,
                    left: local(1),
                    right: Immediate::Constant(Constant::Long(0)),
                },
            ),
            StmtKind::Return(local(2)),
        ],
    );
    let result = assign_types(&input);

    assert_eq!(type_of(&result.body, "v1"), &Type::LONG);
    assert_eq!(type_of(&result.body, "v2"), &Type::INT);
}

// ============================================================================
// Splitting
// ============================================================================

/// `x = 1; take(x); x = new A; x.run(); return`
fn int_then_class() -> Body {
    body(
        signature(vec![], Type::Void),
        &[("x", Type::Bottom)],
        vec![
            assign(0, Value::constant(Constant::Int(1))),
            call(
                InvokeKind::Static,
                "Demo",
                "take",
                vec![Type::INT],
                None,
                vec![local(0)],
            ),
            assign(0, Value::New(ClassType::new("A"))),
            call(InvokeKind::Virtual, "A", "run", vec![], Some(0), vec![]),
            StmtKind::ReturnVoid,
        ],
    )
}

#[test]
fn test_int_and_class_uses_are_split() {
    let result = assign_types(&int_then_class());
    let body = &result.body;

    assert_eq!(body.locals().len(), 2);
    assert_eq!(type_of(body, "x"), &Type::BYTE);
    assert_eq!(type_of(body, "x#1"), &Type::class("A"));
    let split = body.local_by_name("x#1").unwrap();
    assert_eq!(body.stmt(StmtId(2)).def(), Some(split));
    assert_eq!(body.stmt(StmtId(3)).uses(), vec![split]);
    assert_eq!(body.stmt(StmtId(1)).uses(), vec![LocalId(0)]);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn test_second_run_changes_nothing() {
    let assigner = TypeAssigner::default();
    let h = hierarchy();
    let first = assigner.assign(&int_then_class(), &h).unwrap();
    let second = assigner.assign(&first.body, &h).unwrap();

    assert_eq!(second.body, first.body);
    assert!(second.diagnostics.is_empty());
}

#[test]
fn test_unresolved_without_splitting() {
    let assigner = TypeAssigner::new(TypeAssignerConfig {
        split_conflicts: false,
        ..TypeAssignerConfig::default()
    });
    let result = assigner.assign(&int_then_class(), &hierarchy()).unwrap();

    assert_eq!(result.body.locals().len(), 1);
    assert_eq!(type_of(&result.body, "x"), &Type::Unknown);
    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::Unresolved);
    assert_eq!(diagnostic.local.as_deref(), Some("x"));
    assert_eq!(diagnostic.method, "<Demo: void test()>");
}

#[test]
fn test_incompatible_use_of_single_definition() {
    let input = body(
        signature(vec![], Type::Void),
        &[("x", Type::Bottom)],
        vec![
            assign(0, Value::constant(Constant::String("s".to_string()))),
            call(
                InvokeKind::Static,
                "Demo",
                "take",
                vec![Type::INT],
                None,
                vec![local(0)],
            ),
            StmtKind::ReturnVoid,
        ],
    );
    let result = assign_types(&input);

    assert_eq!(result.body.locals().len(), 1);
    assert_eq!(
        result.diagnostics,
        vec![Diagnostic::new("<Demo: void test()>", DiagnosticKind::IncompatibleUse)
            .with_local("x")
            .with_type(Type::string())
            .with_stmt(StmtId(1))
            .with_expected(Type::INT)]
    );
}

#[test]
fn test_iteration_bound_reports_divergence() {
    let assigner = TypeAssigner::new(TypeAssignerConfig {
        max_iterations: 0,
        ..TypeAssignerConfig::default()
    });
    let result = assigner.assign(&int_then_class(), &hierarchy()).unwrap();

    assert_eq!(result.body.locals().len(), 1);
    assert_eq!(
        result
            .diagnostics
            .iter()
            .map(|d| d.kind)
            .collect::<Vec<_>>(),
        vec![DiagnosticKind::FixedPointDivergence]
    );
}

#[test]
fn test_iteration_bound_keeps_declared_types() {
    // x = new Sub1; y = x; return
    let input = body(
        signature(vec![], Type::Void),
        &[("x", Type::object()), ("y", Type::object())],
        vec![
            assign(0, Value::New(ClassType::new("Sub1"))),
            assign(1, Value::Immediate(local(0))),
            StmtKind::ReturnVoid,
        ],
    );
    let assigner = TypeAssigner::new(TypeAssignerConfig {
        max_iterations: 1,
        ..TypeAssignerConfig::default()
    });
    let result = assigner.assign(&input, &hierarchy()).unwrap();

    assert_eq!(result.body, input);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::FixedPointDivergence);
}

#[test]
fn test_merging_definitions_form_one_web() {
    // x = 1; if x == 0 goto s3; x = 2; return x
    let input = body(
        signature(vec![], Type::INT),
        &[("x", Type::Bottom)],
        vec![
            assign(0, Value::constant(Constant::Int(1))),
            StmtKind::If {
                condition: Condition {
                    op: ConditionOp::Eq,
                    left: local(0),
                    right: Immediate::int(0),
                },
                target: StmtId(3),
            },
            assign(0, Value::constant(Constant::Int(2))),
            StmtKind::Return(local(0)),
        ],
    );
    let graph = StmtGraph::new(&input);
    let found = webs(&input, &graph, LocalId(0));

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].defs, vec![StmtId(0), StmtId(2)]);
    assert_eq!(found[0].uses, vec![StmtId(1), StmtId(3)]);
}

#[test]
fn test_handler_sees_definitions_before_and_inside_trap() {
    let input = body_with_traps(
        signature(vec![], Type::INT),
        &[("x", Type::Bottom), ("e", Type::throwable())],
        vec![
            assign(0, Value::constant(Constant::Int(1))),
            assign(0, Value::constant(Constant::Int(2))),
            StmtKind::Return(local(0)),
            StmtKind::Identity {
                local: LocalId(1),
                value: IdentityRef::CaughtException(Type::throwable()),
            },
            StmtKind::Return(local(0)),
        ],
        vec![Trap {
            exception: ClassType::new("java.lang.Throwable"),
            begin: StmtId(1),
            end: StmtId(1),
            handler: StmtId(3),
        }],
    );
    let graph = StmtGraph::new(&input);
    let found = webs(&input, &graph, LocalId(0));

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].defs, vec![StmtId(0), StmtId(1)]);
}

// ============================================================================
// Interceptor
// ============================================================================

#[test]
fn test_interceptor_matches_assign() {
    let assigner = TypeAssigner::default();
    let h = hierarchy();
    let input = int_then_class();
    let outcome = assigner.intercept(&input, &h).unwrap();
    let direct = assigner.assign(&input, &h).unwrap();

    assert_eq!(assigner.name(), "type-assigner");
    assert_eq!(outcome.body, direct.body);
    assert_eq!(outcome.diagnostics, direct.diagnostics);
}
