//! Type assignment on hand-built bodies and on converted classes

mod common;

use common::*;
use jimple_ir::ir::{
    Condition, ConditionOp, IdentityRef, Immediate, InvokeKind, Place, StmtKind, Value,
};
use jimple_ir::*;
use pretty_assertions::assert_eq;

fn assign_types(body: &Body) -> TypeAssignment {
    init_tracing();
    TypeAssigner::default()
        .assign(body, &demo_hierarchy())
        .unwrap_or_else(|e| panic!("typing failed: {}", e))
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_invoke_stmt_demo() {
    let mut b = BodyFixture::new("invokeStmt", vec![], Type::Void);
    let this = b.local("r0", Type::class("Demo"));
    let fresh = b.local("$r1", Type::object());
    let receiver = b.local("r2", Type::object());
    let flag = b.local("b0", Type::INT);
    let arg = b.local("r4", Type::object());
    b.this(this);
    b.new_object(fresh, "Sub1");
    b.init(fresh, "Sub1");
    b.assign(receiver, Value::local(fresh));
    b.int(flag, 1);
    b.new_object(arg, "Sub2");
    b.init(arg, "Sub2");
    b.invoke(
        InvokeKind::Virtual,
        "Super1",
        "m",
        vec![Type::INT, Type::class("Sub2")],
        Some(receiver),
        vec![Immediate::Local(flag), Immediate::Local(arg)],
    );
    b.stmt(StmtKind::ReturnVoid);

    let result = assign_types(&b.build());
    assert_eq!(type_of(&result.body, "$r1"), &Type::class("Sub1"));
    assert_eq!(type_of(&result.body, "r2"), &Type::class("Sub1"));
    assert_eq!(type_of(&result.body, "b0"), &Type::BYTE);
    assert_eq!(type_of(&result.body, "r4"), &Type::class("Sub2"));
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn test_assign_stmt_demo() {
    let mut b = BodyFixture::new("assignStmt", vec![], Type::Void);
    let this = b.local("r0", Type::class("Demo"));
    let array = b.local("r1", Type::object());
    let element = b.local("$r2", Type::object());
    let loaded = b.local("r3", Type::object());
    b.this(this);
    b.assign(
        array,
        Value::NewArray {
            element: Type::class("Super1"),
            size: Immediate::int(10),
        },
    );
    b.new_object(element, "Sub1");
    b.init(element, "Sub1");
    b.stmt(StmtKind::Assign {
        target: Place::ArrayRef {
            base: array,
            index: Immediate::int(0),
        },
        value: Value::local(element),
    });
    b.assign(
        loaded,
        Value::ArrayRef {
            base: array,
            index: Immediate::int(2),
        },
    );
    b.stmt(StmtKind::ReturnVoid);

    let result = assign_types(&b.build());
    assert_eq!(
        type_of(&result.body, "r1"),
        &Type::array(Type::class("Super1"), 1)
    );
    assert_eq!(type_of(&result.body, "$r2"), &Type::class("Sub1"));
    assert_eq!(type_of(&result.body, "r3"), &Type::class("Super1"));
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn test_object_local_used_as_receiver() {
    let mut b = BodyFixture::new("refine", vec![], Type::Void);
    let local = b.local("r0", Type::object());
    b.new_object(local, "Sub1");
    b.invoke(InvokeKind::Virtual, "Super1", "m", vec![], Some(local), vec![]);
    b.stmt(StmtKind::ReturnVoid);

    let result = assign_types(&b.build());
    assert_eq!(type_of(&result.body, "r0"), &Type::class("Sub1"));
}

#[test]
fn test_branches_join_to_common_ancestor() {
    let mut b = BodyFixture::new("choose", vec![Type::BOOLEAN], Type::Void);
    let flag = b.local("z0", Type::BOOLEAN);
    let choice = b.local("r1", Type::Bottom);
    b.stmt(StmtKind::Identity {
        local: flag,
        value: IdentityRef::Parameter {
            index: 0,
            ty: Type::BOOLEAN,
        },
    });
    b.stmt(StmtKind::If {
        condition: Condition {
            op: ConditionOp::Eq,
            left: Immediate::Local(flag),
            right: Immediate::int(0),
        },
        target: StmtId(4),
    });
    b.new_object(choice, "A");
    b.stmt(StmtKind::Goto { target: StmtId(5) });
    b.new_object(choice, "B");
    b.invoke(
        InvokeKind::Virtual,
        "java.lang.Object",
        "hashCode",
        vec![],
        Some(choice),
        vec![],
    );
    b.stmt(StmtKind::ReturnVoid);

    let result = assign_types(&b.build());
    assert_eq!(type_of(&result.body, "r1"), &Type::object());
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

// ============================================================================
// Splitting
// ============================================================================

fn int_then_object() -> Body {
    let mut b = BodyFixture::new("reuse", vec![], Type::Void);
    let x = b.local("x", Type::INT);
    b.int(x, 1);
    b.invoke(
        InvokeKind::Static,
        "Demo",
        "useInt",
        vec![Type::INT],
        None,
        vec![Immediate::Local(x)],
    );
    b.new_object(x, "A");
    b.invoke(InvokeKind::Virtual, "A", "run", vec![], Some(x), vec![]);
    b.stmt(StmtKind::ReturnVoid);
    b.build()
}

#[test]
fn test_conflicting_local_is_split() {
    let result = assign_types(&int_then_object());

    assert_eq!(result.body.locals().len(), 2);
    assert_eq!(type_of(&result.body, "x"), &Type::BYTE);
    assert_eq!(type_of(&result.body, "x#1"), &Type::class("A"));
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_well_formed(&result.body);
}

#[test]
fn test_assignment_is_idempotent() {
    let first = assign_types(&int_then_object());
    let second = assign_types(&first.body);
    assert_eq!(second.body, first.body);
    assert!(second.diagnostics.is_empty());
}

#[test]
fn test_unsplit_conflict_is_reported() {
    let config = TypeAssignerConfig {
        split_conflicts: false,
        ..TypeAssignerConfig::default()
    };
    let result = TypeAssigner::new(config)
        .assign(&int_then_object(), &demo_hierarchy())
        .unwrap();

    assert_eq!(type_of(&result.body, "x"), &Type::Unknown);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::Unresolved && d.local.as_deref() == Some("x")));
}

// ============================================================================
// Converted classes
// ============================================================================

const SHAPES: &str = r#"{
    "name": "Lorg/demo/Shapes",
    "superclass": "Ljava/lang/Object",
    "methods": [{
        "declaring_class": "Lorg/demo/Shapes",
        "name": "make",
        "modifiers": ["static"],
        "return_type": "V",
        "code": { "instructions": [
            { "op": "new", "def": 0, "class": "LSub1" },
            { "op": "invoke", "kind": "special",
              "method": { "declaring_class": "LSub1", "name": "<init>", "return_type": "V" },
              "args": [{ "register": 0 }] },
            { "op": "move", "def": 1, "source": 0 },
            { "op": "constant", "def": 2, "value": { "int": 1 } },
            { "op": "new", "def": 3, "class": "LSub2" },
            { "op": "invoke", "kind": "special",
              "method": { "declaring_class": "LSub2", "name": "<init>", "return_type": "V" },
              "args": [{ "register": 3 }] },
            { "op": "invoke", "kind": "virtual",
              "method": { "declaring_class": "LSuper1", "name": "m", "parameter_types": ["I", "LSub2"], "return_type": "V" },
              "args": [{ "register": 1 }, { "register": 2 }, { "register": 3 }] },
            { "op": "return" }
        ] }
    }]
}"#;

#[test]
fn test_converted_method_is_typed() {
    let class = load_class(SHAPES);
    let mut hierarchy = demo_hierarchy();
    let methods = convert_all(&class, &mut hierarchy);
    let body = body_named(&methods, "org.demo.Shapes.make");

    let result = TypeAssigner::default().assign(body, &hierarchy).unwrap();
    let types: Vec<(String, String)> = result
        .body
        .locals()
        .iter()
        .map(|l| (l.name().to_string(), l.ty().to_string()))
        .collect();
    let expected: Vec<(String, String)> = [
        ("r0", "Sub1"),
        ("r1", "Sub1"),
        ("i0", "byte"),
        ("r2", "Sub2"),
    ]
    .iter()
    .map(|(n, t)| (n.to_string(), t.to_string()))
    .collect();
    assert_eq!(types, expected);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}
