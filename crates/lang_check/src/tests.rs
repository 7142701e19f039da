use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lang_ast::helpers::{
    all_pairs, array, assign, attr, boolean, closure, float, func, if_, index, int, invoke, map,
    none, phi, prim, reduce, ret, scan, slice, tuple, var, while_, with_combine, with_init,
};
use lang_ast::{FnId, Params, Prim, Stmt, TypedExprKind, TypedFn, TypedStmt, UntypedFn};
use lang_ty::{ty, Ty};

use crate::{Config, InferenceError, Pass, Result, Specializer};

pub fn def(name: &str, params: &[&str], body: Vec<Stmt>) -> UntypedFn {
    UntypedFn::new(name, Params::new(params.iter().copied()), body)
}

pub fn specializer(funcs: impl IntoIterator<Item = UntypedFn>) -> Specializer {
    specializer_with(Config::default(), funcs)
}

pub fn specializer_with(config: Config, funcs: impl IntoIterator<Item = UntypedFn>) -> Specializer {
    let spec = Specializer::with_config(config);
    for func in funcs {
        spec.register(func).unwrap();
    }
    spec
}

/// `name(a, b) = a <prim> b`
pub fn binary(name: &str, op: Prim) -> UntypedFn {
    def(name, &["a", "b"], vec![ret(prim(op, [var("a"), var("b")]))])
}

#[track_caller]
pub fn expect_return_ty(spec: &Specializer, func: &str, args: &[Ty], expected: Ty) {
    let typed = spec
        .specialize(func, args)
        .unwrap_or_else(|err| panic!("specializing {func} failed: {err}"));

    assert_eq!(typed.return_type, expected, "{typed}");
}

#[track_caller]
pub fn get_error(spec: &Specializer, func: &str, args: &[Ty]) -> InferenceError {
    spec.specialize(func, args)
        .expect_err("expected an inference error")
}

macro_rules! test_case {
    ($name:ident, [$($func:expr),* $(,)?], $entry:literal ($($arg:tt),*), $ty:tt) => {
        #[test]
        fn $name() {
            let spec = specializer([$($func),*]);
            expect_return_ty(&spec, $entry, &[$(ty!($arg)),*], ty!($ty));
        }
    };
}

macro_rules! error_case {
    ($name:ident, [$($func:expr),* $(,)?], $entry:literal ($($arg:tt),*), $err:pat) => {
        #[test]
        fn $name() {
            let spec = specializer([$($func),*]);
            let err = get_error(&spec, $entry, &[$(ty!($arg)),*]);
            assert!(matches!(err, $err), "unexpected error: {err:?}");
        }
    };
}

// ==============================================================================
// Scalars and primitives
// ==============================================================================

test_case!(scalar_add, [binary("add2", Prim::Add)], "add2"(i64, f64), f64);

test_case!(comparison_is_bool, [binary("less", Prim::Lt)], "less"(i32, f32), bool);

test_case!(division_is_floating, [binary("quot", Prim::Div)], "quot"(i64, i64), f64);

test_case!(
    constants,
    [def("consts", &[], vec![ret(tuple([int(1), float(2.0), boolean(true), none()]))])],
    "consts"(),
    (i64, f64, bool, none)
);

error_case!(
    prim_arity_mismatch,
    [def("bad", &["x"], vec![ret(prim(Prim::Add, [var("x")]))])],
    "bad"(i64),
    InferenceError::ShapeError(_)
);

error_case!(
    unbound_name,
    [def("bad", &["x"], vec![ret(var("y"))])],
    "bad"(i64),
    InferenceError::NameNotFound(_)
);

// ==============================================================================
// Lifting scalar primitives over arrays
// ==============================================================================

test_case!(scalar_lifting, [binary("add2", Prim::Add)], "add2"([f64; 1], i64), [f64; 1]);

test_case!(
    matrix_plus_vector,
    [binary("add2", Prim::Add)],
    "add2"([f64; 2], [i32; 1]),
    [f64; 2]
);

test_case!(lifted_comparison, [binary("less", Prim::Lt)], "less"([i64; 3], f64), [bool; 3]);

error_case!(
    lifting_rejects_tuples,
    [binary("add2", Prim::Add)],
    "add2"([f64; 1], (i64, i64)),
    InferenceError::ShapeError(_)
);

#[test]
fn lifted_call_becomes_map_over_wrapper() {
    let spec = specializer([binary("add2", Prim::Add)]);
    let typed = spec.specialize("add2", &[ty!([f64; 1]), ty!(f64)]).unwrap();

    let TypedStmt::Return(value) = &typed.body[0] else {
        panic!("expected a return, got {typed}");
    };
    let TypedExprKind::Map { func, axis, .. } = &value.kind else {
        panic!("expected a map, got {typed}");
    };
    assert_eq!(*axis, None);
    assert_eq!(func.ty, Ty::closure("prim_add", vec![]));
    assert!(spec.registry().contains(&FnId::from("prim_add")));
}

// ==============================================================================
// Literals, indexing, attributes
// ==============================================================================

test_case!(
    array_literal_joins_elements,
    [def("pair", &["x", "y"], vec![ret(array([var("x"), var("y")]))])],
    "pair"(i32, i64),
    [i64; 1]
);

test_case!(
    nested_array_literal,
    [def("rows", &["x"], vec![ret(array([var("x"), var("x")]))])],
    "rows"([f32; 1]),
    [f32; 2]
);

error_case!(
    empty_array_literal,
    [def("empty", &[], vec![ret(array(Vec::new()))])],
    "empty"(),
    InferenceError::ShapeError(_)
);

test_case!(
    negative_tuple_index,
    [def(
        "last",
        &["x", "y"],
        vec![
            assign(var("t"), tuple([var("x"), var("y")])),
            ret(index(var("t"), int(-1))),
        ]
    )],
    "last"(i64, [f32; 2]),
    [f32; 2]
);

error_case!(
    tuple_index_out_of_range,
    [def("oob", &["t"], vec![ret(index(var("t"), int(2)))])],
    "oob"((i64, i64)),
    InferenceError::ShapeError(_)
);

error_case!(
    tuple_index_must_be_constant,
    [def("dyn", &["t", "i"], vec![ret(index(var("t"), var("i")))])],
    "dyn"((i64, i64), i64),
    InferenceError::ShapeError(_)
);

test_case!(
    array_index_lowers_rank,
    [def("row", &["m", "i"], vec![ret(index(var("m"), var("i")))])],
    "row"([f64; 2], i64),
    [f64; 1]
);

test_case!(
    slice_keeps_rank,
    [def(
        "head",
        &["xs"],
        vec![ret(index(var("xs"), slice(int(0), int(3), none())))]
    )],
    "head"([i32; 1]),
    [i32; 1]
);

test_case!(
    struct_attribute,
    [def("get_x", &["p"], vec![ret(attr(var("p"), "x"))])],
    "get_x"({ x: f32, y: i64 }),
    f32
);

error_case!(
    missing_attribute,
    [def("get_z", &["p"], vec![ret(attr(var("p"), "z"))])],
    "get_z"({ x: f32 }),
    InferenceError::ShapeError(_)
);

// ==============================================================================
// Parameters
// ==============================================================================

#[test]
fn varargs_are_packed_into_a_tuple() {
    let rest = UntypedFn::new(
        "rest",
        Params::new(["a"]).with_varargs("more"),
        vec![ret(var("more"))],
    );
    let spec = specializer([rest]);
    expect_return_ty(&spec, "rest", &[ty!(i64), ty!(f32), ty!(bool)], ty!((f32, bool)));
}

#[test]
fn defaults_fill_missing_arguments() {
    let scale = UntypedFn::new(
        "scale",
        Params::new(["x", "k"]).with_default("k", 2.0),
        vec![ret(prim(Prim::Mul, [var("x"), var("k")]))],
    );
    let spec = specializer([scale]);
    let typed = spec.specialize("scale", &[ty!(i64)]).unwrap();
    assert_eq!(typed.input_types, vec![ty!(i64), ty!(f64)]);
    assert_eq!(typed.return_type, ty!(f64));
}

error_case!(
    too_many_arguments,
    [binary("add2", Prim::Add)],
    "add2"(i64, i64, i64),
    InferenceError::ShapeError(_)
);

#[test]
fn parameters_are_renamed() {
    let spec = specializer([binary("add2", Prim::Add)]);
    let typed = spec.specialize("add2", &[ty!(i64), ty!(i64)]).unwrap();

    assert_ne!(typed.params.positional[0].as_str(), "a");
    assert!(typed.params.positional[0].starts_with("a."));
    assert_eq!(typed.type_env.get(&typed.params.positional[1]), Some(&ty!(i64)));
    assert_eq!(typed.source, FnId::from("add2"));
}

#[test]
fn specializations_get_distinct_names() {
    let spec = specializer([binary("add2", Prim::Add)]);
    let ints = spec.specialize("add2", &[ty!(i64), ty!(i64)]).unwrap();
    let floats = spec.specialize("add2", &[ty!(f64), ty!(f64)]).unwrap();

    assert_ne!(ints.name, floats.name);
    assert!(ints.name.starts_with("add2."));
}

// ==============================================================================
// Statements
// ==============================================================================

error_case!(
    tuple_destructuring_arity,
    [def(
        "split",
        &["x"],
        vec![
            assign(tuple([var("a"), var("b")]), tuple([var("x"), var("x"), var("x")])),
            ret(var("a")),
        ]
    )],
    "split"(i64),
    InferenceError::ShapeError(_)
);

test_case!(
    tuple_destructuring,
    [def(
        "swap",
        &["x", "y"],
        vec![
            assign(tuple([var("a"), var("b")]), tuple([var("x"), var("y")])),
            ret(tuple([var("b"), var("a")])),
        ]
    )],
    "swap"(i32, [f64; 1]),
    ([f64; 1], i32)
);

test_case!(
    reassignment_widens,
    [def(
        "widen",
        &["x", "y"],
        vec![
            assign(var("z"), var("x")),
            assign(var("z"), var("y")),
            ret(var("z")),
        ]
    )],
    "widen"(i32, f64),
    f64
);

error_case!(
    reassignment_conflict,
    [def(
        "clash",
        &["x", "y"],
        vec![
            assign(var("z"), var("x")),
            assign(var("z"), var("y")),
            ret(var("z")),
        ]
    )],
    "clash"(i64, (i64, i64)),
    InferenceError::TypeConflict(..)
);

test_case!(
    index_assignment,
    [def(
        "store",
        &["xs", "v"],
        vec![assign(index(var("xs"), int(0)), var("v")), ret(var("xs"))]
    )],
    "store"([i64; 1], i32),
    [i64; 1]
);

error_case!(
    index_assignment_conflict,
    [def(
        "store",
        &["xs", "v"],
        vec![assign(index(var("xs"), int(0)), var("v")), ret(var("xs"))]
    )],
    "store"([i64; 1], (i64, i64)),
    InferenceError::TypeConflict(..)
);

error_case!(
    index_assignment_requires_array,
    [def(
        "store",
        &["x"],
        vec![assign(index(var("x"), int(0)), int(1)), ret(var("x"))]
    )],
    "store"(i64),
    InferenceError::ShapeError(_)
);

test_case!(
    row_assignment_takes_a_vector,
    [def(
        "set_row",
        &["m", "row"],
        vec![assign(index(var("m"), int(0)), var("row")), ret(var("m"))]
    )],
    "set_row"([f64; 2], [f32; 1]),
    [f64; 2]
);

error_case!(
    index_assignment_rank_too_high,
    [def(
        "store",
        &["xs", "m"],
        vec![assign(index(var("xs"), int(0)), var("m")), ret(var("xs"))]
    )],
    "store"([f64; 1], [f64; 2]),
    InferenceError::ShapeError(_)
);

fn set_x() -> UntypedFn {
    def(
        "set_x",
        &["p", "v"],
        vec![assign(attr(var("p"), "x"), var("v")), ret(var("p"))],
    )
}

#[test]
fn attribute_assignment_keeps_the_field_type() {
    let spec = specializer([set_x()]);
    let typed = spec
        .specialize("set_x", &[ty!({ x: i32, y: bool }), ty!(f64)])
        .unwrap();

    let TypedStmt::Assign { lhs, rhs } = &typed.body[0] else {
        panic!("expected an assignment, got {typed}");
    };
    assert_eq!(lhs.ty, ty!(i32));
    assert_eq!(rhs.ty, ty!(f64));
    assert_eq!(typed.return_type, ty!({ x: i32, y: bool }));
}

error_case!(
    attribute_assignment_requires_struct,
    [set_x()],
    "set_x"((i32, bool), f64),
    InferenceError::ShapeError(_)
);

error_case!(
    attribute_assignment_conflict,
    [set_x()],
    "set_x"({ x: i32 }, [i32; 1]),
    InferenceError::TypeConflict(..)
);

error_case!(
    assign_to_constant,
    [def("bad", &[], vec![assign(int(1), int(2))])],
    "bad"(),
    InferenceError::ShapeError(_)
);

test_case!(
    branch_type_join,
    [def(
        "pick",
        &["c", "x", "y"],
        vec![
            if_(
                var("c"),
                vec![assign(var("a"), var("x"))],
                vec![assign(var("b"), var("y"))],
                vec![phi("z", var("a"), var("b"))],
            ),
            ret(var("z")),
        ]
    )],
    "pick"(bool, i32, f64),
    f64
);

error_case!(
    array_condition,
    [def(
        "pick",
        &["c"],
        vec![if_(var("c"), vec![], vec![], vec![]), ret(int(0))]
    )],
    "pick"([bool; 1]),
    InferenceError::ShapeError(_)
);

test_case!(
    returns_are_joined,
    [def(
        "either",
        &["c", "x"],
        vec![
            if_(var("c"), vec![ret(var("x"))], vec![ret(float(1.0))], vec![]),
        ]
    )],
    "either"(bool, i64),
    f64
);

fn halving_loop() -> UntypedFn {
    // i = 0; x = 1; while i < n: x = x * 0.5; i = i + 1; return x
    def(
        "halve",
        &["n"],
        vec![
            assign(var("i0"), int(0)),
            assign(var("x0"), int(1)),
            while_(
                prim(Prim::Lt, [var("i"), var("n")]),
                vec![
                    assign(var("x1"), prim(Prim::Mul, [var("x"), float(0.5)])),
                    assign(var("i1"), prim(Prim::Add, [var("i"), int(1)])),
                ],
                vec![phi("i", var("i0"), var("i1")), phi("x", var("x0"), var("x1"))],
            ),
            ret(var("x")),
        ],
    )
}

test_case!(loop_fixpoint, [halving_loop()], "halve"(i64), f64);

#[test]
fn loop_body_is_typed_from_the_final_pass() {
    let spec = specializer([halving_loop()]);
    let typed = spec.specialize("halve", &[ty!(i64)]).unwrap();

    let TypedStmt::While { merge, .. } = &typed.body[2] else {
        panic!("expected a loop, got {typed}");
    };
    assert_eq!(merge[1].left.ty, ty!(i64));
    assert_eq!(merge[1].right.ty, ty!(f64));
    assert_eq!(typed.type_env.get(&merge[1].var), Some(&ty!(f64)));
}

#[test]
fn loop_pass_limit() {
    let config = Config {
        max_loop_iterations: 1,
        ..Config::default()
    };
    let spec = specializer_with(config, [halving_loop()]);
    let err = get_error(&spec, "halve", &[ty!(i64)]);
    assert!(matches!(err, InferenceError::NotImplemented(_)), "{err:?}");
}

#[test]
fn stable_loop_settles_in_one_pass() {
    // i = 0; while i < n: i = i + 1; return i
    let count = def(
        "count",
        &["n"],
        vec![
            assign(var("i0"), int(0)),
            while_(
                prim(Prim::Lt, [var("i"), var("n")]),
                vec![assign(var("i1"), prim(Prim::Add, [var("i"), int(1)]))],
                vec![phi("i", var("i0"), var("i1"))],
            ),
            ret(var("i")),
        ],
    );
    let config = Config {
        max_loop_iterations: 1,
        ..Config::default()
    };
    let spec = specializer_with(config, [count]);
    expect_return_ty(&spec, "count", &[ty!(i64)], ty!(i64));
}

#[test]
fn missing_return_yields_none() {
    let spec = specializer([def("noop", &["x"], vec![assign(var("y"), var("x"))])]);
    let typed = spec.specialize("noop", &[ty!(i64)]).unwrap();

    assert_eq!(typed.return_type, Ty::None);
    assert!(matches!(
        typed.body.last(),
        Some(TypedStmt::Return(value)) if value.ty == Ty::None
    ));
}

// ==============================================================================
// Closures and invocation
// ==============================================================================

test_case!(
    invoke_captured_closure,
    [
        binary("scale", Prim::Mul),
        def(
            "double",
            &["x"],
            vec![ret(invoke(closure("scale", [float(2.0)]), [var("x")]))]
        ),
    ],
    "double"(i64),
    f64
);

#[test]
fn closure_value() {
    let spec = specializer([
        binary("scale", Prim::Mul),
        def("make", &["k"], vec![ret(closure("scale", [var("k")]))]),
    ]);
    expect_return_ty(&spec, "make", &[ty!(f32)], Ty::closure("scale", vec![ty!(f32)]));
}

error_case!(
    invoke_non_callable,
    [def("call", &["x"], vec![ret(invoke(var("x"), [int(1)]))])],
    "call"(i64),
    InferenceError::InferenceFailed(Ty::Scalar(_))
);

error_case!(
    closure_of_unknown_function,
    [def("call", &[], vec![ret(func("nowhere"))])],
    "call"(),
    InferenceError::UnknownFunction(_)
);

#[test]
fn resolver_rejects_non_closures() {
    let spec = Specializer::new();
    assert_eq!(
        spec.invocation_result_type(&ty!(i64), &[]),
        Err(InferenceError::InvocationError(ty!(i64)))
    );
}

#[test]
fn closure_sets_join_their_members() {
    let spec = specializer([
        def("ident", &["x"], vec![ret(var("x"))]),
        def("halve", &["x"], vec![ret(prim(Prim::Div, [var("x"), int(2)]))]),
    ]);
    let set = lang_ty::ClosureSet::from_closures([
        lang_ty::ClosureTy::new("ident", vec![]),
        lang_ty::ClosureTy::new("halve", vec![]),
    ])
    .unwrap();

    let result = spec.invocation_result_type(&Ty::ClosureSet(set), &[ty!(i64)]);
    assert_eq!(result, Ok(ty!(f64)));
}

#[test]
fn invocation_results_are_memoized() {
    let spec = specializer([binary("add2", Prim::Add)]);
    let callee = Ty::closure("add2", vec![]);

    let first = spec.invocation_result_type(&callee, &[ty!(i32), ty!(i32)]);
    let before = spec.stats();
    let second = spec.invocation_result_type(&callee, &[ty!(i32), ty!(i32)]);

    assert_eq!(first, Ok(ty!(i32)));
    assert_eq!(first, second);
    assert_eq!(spec.stats().memo_hits, before.memo_hits + 1);
    assert_eq!(spec.stats().inferences, before.inferences);
}

// ==============================================================================
// Adverbs
// ==============================================================================

fn sum() -> UntypedFn {
    def(
        "sum",
        &["xs"],
        vec![ret(reduce(func("add2"), [var("xs")], None))],
    )
}

test_case!(reduce_fixed_point, [binary("add2", Prim::Add), sum()], "sum"([f64; 1]), f64);

test_case!(
    reduce_whole_matrix,
    [binary("add2", Prim::Add), sum()],
    "sum"([f64; 2]),
    [f64; 2]
);

error_case!(
    reduce_changing_accumulator,
    [
        binary("quot", Prim::Div),
        def("mean", &["xs"], vec![ret(reduce(func("quot"), [var("xs")], None))]),
    ],
    "mean"([i64; 1]),
    InferenceError::NotImplemented(_)
);

error_case!(
    reduce_with_init,
    [
        binary("add2", Prim::Add),
        def(
            "sum0",
            &["xs"],
            vec![ret(with_init(reduce(func("add2"), [var("xs")], None), float(0.0)))]
        ),
    ],
    "sum0"([f64; 1]),
    InferenceError::NotImplemented(_)
);

error_case!(
    reduce_over_two_inputs,
    [
        binary("add2", Prim::Add),
        def(
            "sum2",
            &["xs", "ys"],
            vec![ret(reduce(func("add2"), [var("xs"), var("ys")], None))]
        ),
    ],
    "sum2"([f64; 1], [f64; 1]),
    InferenceError::NotImplemented(_)
);

error_case!(
    reduce_combiner_is_checked,
    [
        binary("add2", Prim::Add),
        binary("quot", Prim::Div),
        def(
            "sum",
            &["xs"],
            vec![ret(with_combine(
                reduce(func("add2"), [var("xs")], None),
                func("quot")
            ))]
        ),
    ],
    "sum"([i64; 1]),
    InferenceError::NotImplemented(_)
);

test_case!(
    scan_keeps_rank,
    [
        binary("add2", Prim::Add),
        def("cumsum", &["xs"], vec![ret(scan(func("add2"), [var("xs")], None))]),
    ],
    "cumsum"([i64; 1]),
    [i64; 1]
);

test_case!(
    scan_along_axis,
    [
        binary("add2", Prim::Add),
        def(
            "cumsum",
            &["m"],
            vec![ret(scan(func("add2"), [var("m")], Some(int(0))))]
        ),
    ],
    "cumsum"([f32; 2]),
    [f32; 2]
);

test_case!(
    all_pairs_rank,
    [
        binary("dist", Prim::Sub),
        def(
            "pairwise",
            &["xs", "ys"],
            vec![ret(all_pairs(func("dist"), [var("xs"), var("ys")], None))]
        ),
    ],
    "pairwise"([f64; 1], [f64; 1]),
    [f64; 2]
);

test_case!(
    all_pairs_of_rows,
    [
        def(
            "dot",
            &["a", "b"],
            vec![ret(reduce(func("add2"), [prim(Prim::Mul, [var("a"), var("b")])], None))]
        ),
        binary("add2", Prim::Add),
        def(
            "gram",
            &["m"],
            vec![ret(all_pairs(func("dot"), [var("m"), var("m")], Some(int(0))))]
        ),
    ],
    "gram"([f64; 2]),
    [f64; 2]
);

error_case!(
    all_pairs_needs_two_inputs,
    [
        binary("dist", Prim::Sub),
        def("pairwise", &["xs"], vec![ret(all_pairs(func("dist"), [var("xs")], None))]),
    ],
    "pairwise"([f64; 1]),
    InferenceError::ShapeError(_)
);

error_case!(
    all_pairs_axis_out_of_range,
    [
        binary("dist", Prim::Sub),
        def(
            "pairwise",
            &["xs", "ys"],
            vec![ret(all_pairs(func("dist"), [var("xs"), var("ys")], Some(int(7))))]
        ),
    ],
    "pairwise"([f64; 1], [f64; 1]),
    InferenceError::ShapeError(_)
);

test_case!(
    map_along_axis,
    [
        def("negate", &["x"], vec![ret(prim(Prim::Neg, [var("x")]))]),
        def("neg_rows", &["m"], vec![ret(map(func("negate"), [var("m")], Some(int(0))))]),
    ],
    "neg_rows"([f64; 2]),
    [f64; 2]
);

test_case!(
    map_over_vector,
    [
        binary("less", Prim::Lt),
        def(
            "mask",
            &["xs", "t"],
            vec![ret(map(func("less"), [var("xs"), var("t")], None))]
        ),
    ],
    "mask"([f64; 1], f64),
    [bool; 1]
);

error_case!(
    map_axis_out_of_range,
    [
        def("negate", &["x"], vec![ret(prim(Prim::Neg, [var("x")]))]),
        def("neg", &["m"], vec![ret(map(func("negate"), [var("m")], Some(int(2))))]),
    ],
    "neg"([f64; 2]),
    InferenceError::ShapeError(_)
);

error_case!(
    map_axis_must_be_constant,
    [
        def("negate", &["x"], vec![ret(prim(Prim::Neg, [var("x")]))]),
        def("neg", &["m", "k"], vec![ret(map(func("negate"), [var("m")], Some(var("k"))))]),
    ],
    "neg"([f64; 2], i64),
    InferenceError::NotImplemented(_)
);

#[test]
fn adverb_axis_defaults_to_zero_for_vectors() {
    let spec = specializer([binary("add2", Prim::Add), sum()]);
    let typed = spec.specialize("sum", &[ty!([f64; 1])]).unwrap();

    let TypedStmt::Return(value) = &typed.body[0] else {
        panic!("expected a return, got {typed}");
    };
    assert!(
        matches!(value.kind, TypedExprKind::Reduce { axis: Some(0), .. }),
        "{typed}"
    );
}

// ==============================================================================
// Specialization driver
// ==============================================================================

#[test]
fn specialization_is_memoized() {
    let spec = specializer([binary("add2", Prim::Add)]);
    let first = spec.specialize("add2", &[ty!(i64), ty!(f32)]).unwrap();
    let inferences = spec.stats().inferences;
    let second = spec.specialize("add2", &[ty!(i64), ty!(f32)]).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.input_types, second.input_types);
    assert_eq!(first.return_type, second.return_type);
    assert_eq!(spec.stats().inferences, inferences);
    assert_eq!(spec.stats().cache_hits, 1);
}

#[test]
fn infer_return_type_of_definition() {
    let spec = Specializer::new();
    let ty = spec.infer_return_type(binary("add2", Prim::Add), &[ty!(i32), ty!(i32)]);
    assert_eq!(ty, Ok(ty!(i32)));
    assert!(spec.registry().contains(&FnId::from("add2")));
}

#[test]
fn unknown_function() {
    let spec = Specializer::new();
    assert_eq!(
        spec.specialize("missing", &[]).map(|_| ()),
        Err(InferenceError::UnknownFunction("missing".into()))
    );
}

error_case!(
    recursive_specialization,
    [def("loop_forever", &["x"], vec![ret(invoke(func("loop_forever"), [var("x")]))])],
    "loop_forever"(i64),
    InferenceError::RecursiveSpecialization { .. }
);

#[test]
fn mutual_recursion_names_the_repeated_signature() {
    let spec = specializer([
        def("ping", &["x"], vec![ret(invoke(func("pong"), [var("x")]))]),
        def("pong", &["x"], vec![ret(invoke(func("ping"), [var("x")]))]),
    ]);
    assert_eq!(
        get_error(&spec, "ping", &[ty!(f64)]),
        InferenceError::RecursiveSpecialization {
            func: "ping".into(),
            arg_types: vec![ty!(f64)],
        }
    );
}

#[test]
fn depth_limit() {
    let config = Config {
        max_depth: 1,
        ..Config::default()
    };
    let spec = specializer_with(
        config,
        [
            def("outer", &["x"], vec![ret(invoke(func("inner"), [var("x")]))]),
            def("inner", &["x"], vec![ret(var("x"))]),
        ],
    );
    assert!(matches!(
        get_error(&spec, "outer", &[ty!(i64)]),
        InferenceError::RecursiveSpecialization { .. }
    ));
    // a direct request for the leaf still fits
    expect_return_ty(&spec, "inner", &[ty!(i64)], ty!(i64));
}

#[test]
fn failed_builds_are_not_cached() {
    let spec = specializer([
        def("inc", &["x"], vec![ret(prim(Prim::Add, [var("x"), int(1)]))]),
        def(
            "broken",
            &["x"],
            vec![
                assign(var("y"), invoke(func("inc"), [var("x")])),
                ret(var("nope")),
            ],
        ),
    ]);

    assert!(matches!(
        get_error(&spec, "broken", &[ty!(i64)]),
        InferenceError::NameNotFound(_)
    ));
    let registry = spec.registry();
    assert!(registry
        .find_specialization(&"broken".into(), &[ty!(i64)])
        .is_none());
    // the nested success stays cached
    assert!(registry
        .find_specialization(&"inc".into(), &[ty!(i64)])
        .is_some());
    assert_eq!(registry.specialization_count(), 1);

    // and the failure is reproduced rather than served from anywhere
    let inferences = spec.stats().inferences;
    get_error(&spec, "broken", &[ty!(i64)]);
    assert_eq!(spec.stats().inferences, inferences + 1);
}

#[test]
fn concurrent_requests_build_once() {
    let spec = specializer([def(
        "inc",
        &["x"],
        vec![ret(prim(Prim::Add, [var("x"), int(1)]))],
    )]);

    let results: Vec<Arc<TypedFn>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| spec.specialize("inc", &[ty!(i32)]).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(spec.stats().inferences, 1);
    assert!(results.iter().all(|typed| Arc::ptr_eq(typed, &results[0])));
    assert_eq!(results[0].return_type, ty!(i64));
}

#[derive(Default)]
struct CountingPass {
    runs: Arc<AtomicUsize>,
}

impl Pass for CountingPass {
    fn name(&self) -> &str {
        "counting"
    }

    fn run(&self, func: TypedFn) -> Result<TypedFn> {
        self.runs.fetch_add(1, Ordering::Relaxed);
        Ok(func)
    }
}

#[test]
fn passes_run_once_per_build() {
    let runs = Arc::new(AtomicUsize::new(0));
    let spec = Specializer::new().with_passes(
        Box::new(CountingPass { runs: runs.clone() }),
        Box::new(CountingPass { runs: runs.clone() }),
    );
    spec.register(binary("add2", Prim::Add)).unwrap();

    spec.specialize("add2", &[ty!(i64), ty!(i64)]).unwrap();
    spec.specialize("add2", &[ty!(i64), ty!(i64)]).unwrap();
    assert_eq!(runs.load(Ordering::Relaxed), 2);
}
