use super::*;
use crate::error::BodyError;
use crate::types::{ArrayType, ClassType, Type};
use pretty_assertions::assert_eq;

fn signature(name: &str, params: Vec<Type>) -> MethodSignature {
    MethodSignature::new(ClassType::new("Demo"), name, params, Type::Void)
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, PositionInfo::none())
}

fn l(n: u32) -> LocalId {
    LocalId(n)
}

fn s(n: u32) -> StmtId {
    StmtId(n)
}

fn param(local: u32, index: usize, ty: Type) -> Stmt {
    stmt(StmtKind::Identity {
        local: l(local),
        value: IdentityRef::Parameter { index, ty },
    })
}

fn assign(target: u32, value: Value) -> Stmt {
    stmt(StmtKind::Assign {
        target: Place::Local(l(target)),
        value,
    })
}

/// `static void loop(int)`: counts `i0` up to 10.
fn loop_body() -> Body {
    Body::new(
        signature("loop", vec![Type::INT]),
        vec![Local::new("i0", Type::INT)],
        vec![
            param(0, 0, Type::INT),
            stmt(StmtKind::If {
                condition: Condition {
                    op: ConditionOp::Ge,
                    left: Immediate::Local(l(0)),
                    right: Immediate::int(10),
                },
                target: s(4),
            }),
            assign(
                0,
                Value::Binary {
                    op: BinaryOp::Add,
                    left: Immediate::Local(l(0)),
                    right: Immediate::int(1),
                },
            ),
            stmt(StmtKind::Goto { target: s(1) }),
            stmt(StmtKind::ReturnVoid),
        ],
        vec![],
        PositionInfo::none(),
    )
    .unwrap()
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_valid_body() {
    let body = loop_body();
    assert_eq!(body.validate(), Ok(()));
    assert_eq!(body.first_stmt(), Some(s(0)));
    assert_eq!(body.local_by_name("i0"), Some(l(0)));
    assert_eq!(body.local_by_name("i1"), None);
}

#[test]
fn test_undeclared_local() {
    let err = Body::new(
        signature("run", vec![]),
        vec![],
        vec![stmt(StmtKind::Return(Immediate::Local(l(0))))],
        vec![],
        PositionInfo::none(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BodyError::UndeclaredLocal {
            stmt: s(0),
            local: l(0)
        }
    );
}

#[test]
fn test_dangling_branch_target() {
    let err = Body::new(
        signature("run", vec![]),
        vec![],
        vec![stmt(StmtKind::Goto { target: s(3) })],
        vec![],
        PositionInfo::none(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BodyError::DanglingBranchTarget {
            stmt: s(0),
            target: s(3)
        }
    );
}

#[test]
fn test_trap_errors() {
    let stmts = vec![stmt(StmtKind::ReturnVoid), stmt(StmtKind::ReturnVoid)];
    let trap = |begin, end, handler| Trap {
        exception: ClassType::new("java.lang.Throwable"),
        begin: s(begin),
        end: s(end),
        handler: s(handler),
    };
    let build = |traps| {
        Body::new(
            signature("run", vec![]),
            vec![],
            stmts.clone(),
            traps,
            PositionInfo::none(),
        )
    };

    assert_eq!(
        build(vec![trap(0, 0, 5)]).unwrap_err(),
        BodyError::DanglingTrapTarget {
            trap: 0,
            target: s(5)
        }
    );
    assert_eq!(
        build(vec![trap(0, 0, 1), trap(1, 0, 1)]).unwrap_err(),
        BodyError::InvertedTrapRange {
            trap: 1,
            begin: s(1),
            end: s(0)
        }
    );
}

#[test]
fn test_falls_off_end() {
    let err = Body::new(
        signature("run", vec![Type::INT]),
        vec![Local::new("i0", Type::INT)],
        vec![param(0, 0, Type::INT)],
        vec![],
        PositionInfo::none(),
    )
    .unwrap_err();
    assert_eq!(err, BodyError::FallsOffEnd { stmt: s(0) });
}

#[test]
fn test_duplicate_local_name() {
    let err = Body::new(
        signature("run", vec![]),
        vec![Local::new("i0", Type::INT), Local::new("i0", Type::LONG)],
        vec![stmt(StmtKind::ReturnVoid)],
        vec![],
        PositionInfo::none(),
    )
    .unwrap_err();
    assert_eq!(err, BodyError::DuplicateLocalName("i0".to_string()));
}

#[test]
fn test_with_parts_revalidates() {
    let body = loop_body();
    let retyped = body
        .with_locals(vec![Local::new("i0", Type::SHORT)])
        .unwrap();
    assert_eq!(retyped.local(l(0)).ty(), &Type::SHORT);
    assert_eq!(retyped.stmts(), body.stmts());
    assert_eq!(body.local(l(0)).ty(), &Type::INT);

    let mut stmts = body.stmts().to_vec();
    stmts.pop();
    stmts[1] = stmt(StmtKind::Goto { target: s(7) });
    assert!(matches!(
        body.with_stmts(stmts),
        Err(BodyError::DanglingBranchTarget { .. })
    ));
}

#[test]
fn test_json_round_trip() {
    let body = loop_body();
    let json = serde_json::to_value(&body).unwrap();
    let decoded: Body = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, body);
}

#[test]
fn test_decoding_validates_body() {
    let mut json = serde_json::to_value(loop_body()).unwrap();
    json["locals"] = serde_json::json!([]);
    let err = serde_json::from_value::<Body>(json).unwrap_err();
    assert!(
        err.to_string().contains("does not declare"),
        "unexpected error: {}",
        err
    );
}

// ============================================================================
// Defs and uses
// ============================================================================

#[test]
fn test_defs_and_uses() {
    let body = loop_body();
    assert_eq!(body.defs_of(l(0)), vec![s(0), s(2)]);
    assert_eq!(body.uses_of(l(0)), vec![s(1), s(2)]);
    assert_eq!(body.branch_targets(), vec![s(1), s(4)]);
}

#[test]
fn test_use_slots_cover_every_read() {
    let field = FieldSignature::new(ClassType::new("Demo"), "items", Type::array(Type::INT, 1));
    let mut store = stmt(StmtKind::Assign {
        target: Place::ArrayRef {
            base: l(0),
            index: Immediate::Local(l(1)),
        },
        value: Value::InstanceField {
            base: l(2),
            field,
        },
    });
    assert_eq!(store.def(), None);
    assert_eq!(store.uses(), vec![l(0), l(1), l(2)]);

    for slot in store.use_slots_mut() {
        *slot = LocalId(slot.0 + 10);
    }
    assert_eq!(store.uses(), vec![l(10), l(11), l(12)]);
    assert!(store.def_slot_mut().is_none());
}

#[test]
fn test_invoke_uses_base_then_args() {
    let method = MethodSignature::new(
        ClassType::new("Demo"),
        "call",
        vec![Type::INT, Type::INT],
        Type::INT,
    );
    let invoke = assign(
        3,
        Value::Invoke(InvokeExpr {
            kind: InvokeKind::Virtual,
            method,
            base: Some(l(0)),
            args: vec![Immediate::Local(l(2)), Immediate::int(4)],
        }),
    );
    assert_eq!(invoke.def(), Some(l(3)));
    assert_eq!(invoke.uses(), vec![l(0), l(2)]);
    assert!(invoke.invoke_expr().is_some());
}

// ============================================================================
// Control flow graph
// ============================================================================

#[test]
fn test_graph_edges() {
    let body = loop_body();
    let graph = StmtGraph::new(&body);
    assert_eq!(graph.len(), 5);
    assert_eq!(graph.successors(s(0)), &[s(1)]);
    assert_eq!(graph.successors(s(1)), &[s(2), s(4)]);
    assert_eq!(graph.successors(s(3)), &[s(1)]);
    assert!(graph.successors(s(4)).is_empty());
    assert_eq!(graph.predecessors(s(1)), &[s(0), s(3)]);
    assert!(graph.reachable().iter().all(|r| *r));
}

#[test]
fn test_graph_exceptional_edges() {
    let body = Body::new(
        signature("run", vec![]),
        vec![Local::new("$r0", Type::throwable())],
        vec![
            stmt(StmtKind::ReturnVoid),
            stmt(StmtKind::Identity {
                local: l(0),
                value: IdentityRef::CaughtException(Type::throwable()),
            }),
            stmt(StmtKind::Throw(Immediate::Local(l(0)))),
        ],
        vec![Trap {
            exception: ClassType::new("java.lang.Throwable"),
            begin: s(0),
            end: s(0),
            handler: s(1),
        }],
        PositionInfo::none(),
    )
    .unwrap();
    let graph = StmtGraph::new(&body);
    assert!(graph.successors(s(0)).is_empty());
    assert_eq!(graph.exceptional_successors(s(0)), &[s(1)]);
    assert_eq!(graph.all_successors(s(0)).collect::<Vec<_>>(), vec![s(1)]);
    assert_eq!(graph.predecessors(s(1)), &[s(0)]);
    assert_eq!(graph.reachable(), vec![true, true, true]);
}

#[test]
fn test_unreachable_statements() {
    let body = Body::new(
        signature("run", vec![]),
        vec![],
        vec![stmt(StmtKind::ReturnVoid), stmt(StmtKind::ReturnVoid)],
        vec![],
        PositionInfo::none(),
    )
    .unwrap();
    assert_eq!(StmtGraph::new(&body).reachable(), vec![true, false]);
}

// ============================================================================
// Printer
// ============================================================================

#[test]
fn test_print_labels() {
    let expected = "\
<Demo: void loop(int)> {
    int i0;

    i0 := @parameter0: int;

  label1:
    if i0 >= 10 goto label2;
    i0 = i0 + 1;
    goto label1;

  label2:
    return;
}";
    assert_eq!(loop_body().to_string(), expected);
}

#[test]
fn test_print_switch_and_trap() {
    let body = Body::new(
        signature("pick", vec![Type::INT]),
        vec![
            Local::new("i0", Type::INT),
            Local::new("$r0", Type::throwable()),
        ],
        vec![
            param(0, 0, Type::INT),
            stmt(StmtKind::Switch {
                key: Immediate::Local(l(0)),
                cases: vec![SwitchCase {
                    value: 1,
                    target: s(2),
                }],
                default: s(3),
            }),
            stmt(StmtKind::ReturnVoid),
            stmt(StmtKind::Identity {
                local: l(1),
                value: IdentityRef::CaughtException(Type::throwable()),
            }),
            stmt(StmtKind::Throw(Immediate::Local(l(1)))),
        ],
        vec![Trap {
            exception: ClassType::new("java.lang.Throwable"),
            begin: s(2),
            end: s(2),
            handler: s(3),
        }],
        PositionInfo::none(),
    )
    .unwrap();

    let expected = "\
<Demo: void pick(int)> {
    int i0;
    java.lang.Throwable $r0;

    i0 := @parameter0: int;
    lookupswitch(i0)
    {
        case 1: goto label1;
        default: goto label2;
    };

  label1:
    return;

  label2:
    $r0 := @caughtexception;
    throw $r0;

    catch java.lang.Throwable from label1 to label1 with label2;
}";
    assert_eq!(body.to_string(), expected);
}

#[test]
fn test_print_values() {
    let field = FieldSignature::new(ClassType::new("Demo"), "count", Type::INT);
    let body = Body::new(
        signature("values", vec![]),
        vec![
            Local::new("r0", Type::array(Type::INT, 2)),
            Local::new("i1", Type::INT),
        ],
        vec![
            assign(
                0,
                Value::NewMultiArray {
                    ty: ArrayType::new(Type::INT, 2),
                    sizes: vec![Immediate::int(3)],
                },
            ),
            assign(1, Value::StaticField(field.clone())),
            assign(1, Value::Length(Immediate::Local(l(0)))),
            stmt(StmtKind::Assign {
                target: Place::StaticField(field),
                value: Value::Negate(Immediate::Local(l(1))),
            }),
            assign(1, Value::constant(Constant::Long(7))),
            stmt(StmtKind::ReturnVoid),
        ],
        vec![],
        PositionInfo::none(),
    )
    .unwrap();

    let printed = body.to_string();
    let lines: Vec<&str> = printed.lines().map(str::trim).collect();
    assert_eq!(
        &lines[4..9],
        &[
            "r0 = newmultiarray (int)[3][];",
            "i1 = <Demo: int count>;",
            "i1 = lengthof r0;",
            "<Demo: int count> = neg i1;",
            "i1 = 7L;",
        ]
    );
}

#[test]
fn test_print_empty_body() {
    let body = Body::new(
        signature("empty", vec![]),
        vec![],
        vec![],
        vec![],
        PositionInfo::none(),
    )
    .unwrap();
    assert_eq!(body.to_string(), "<Demo: void empty()> {\n}");
    assert!(body.is_empty());
    assert_eq!(body.first_stmt(), None);
}

#[test]
fn test_signature_display() {
    let sig = MethodSignature::new(
        ClassType::new("p.Demo"),
        "<init>",
        vec![Type::INT, Type::string()],
        Type::Void,
    );
    assert_eq!(sig.to_string(), "<p.Demo: void <init>(int,java.lang.String)>");
    assert_eq!(sig.sub_signature(), "<init>(int,java.lang.String)");
    assert!(sig.is_constructor());
    assert!(!sig.is_static_initializer());
}
