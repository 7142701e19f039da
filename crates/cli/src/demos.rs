// ==============================================================================
// Demo Catalog
// ==============================================================================
//
// A handful of small array programs, built with the AST helpers, that show
// off lifting, adverbs, and control-flow merges from the command line.

use lang_ast::helpers::{
    all_pairs, assign, func, if_, int, invoke, map, phi, prim, reduce, ret, scan, var, while_,
};
use lang_ast::{Params, Prim, Stmt, UntypedFn};

pub struct Demo {
    pub name: &'static str,
    pub about: &'static str,
    /// Argument types used when none are given on the command line.
    pub example_args: &'static str,
}

fn def(name: &str, params: &[&str], body: Vec<Stmt>) -> UntypedFn {
    UntypedFn::new(name, Params::new(params.iter().copied()), body)
}

fn binary(name: &str, op: Prim) -> UntypedFn {
    def(name, &["a", "b"], vec![ret(prim(op, [var("a"), var("b")]))])
}

pub const CATALOG: &[Demo] = &[
    Demo {
        name: "add",
        about: "elementwise addition, broadcasting scalars and lower ranks",
        example_args: "array<f64, 2>, array<i32, 1>",
    },
    Demo {
        name: "sum",
        about: "reduce with add",
        example_args: "array<f64, 1>",
    },
    Demo {
        name: "cumsum",
        about: "scan with add",
        example_args: "array<i64, 1>",
    },
    Demo {
        name: "dot",
        about: "elementwise product reduced with add",
        example_args: "array<f64, 1>, array<f32, 1>",
    },
    Demo {
        name: "pairwise_diff",
        about: "all pairs of differences between two vectors",
        example_args: "array<f64, 1>, array<f64, 1>",
    },
    Demo {
        name: "gram",
        about: "dot products of every pair of rows",
        example_args: "array<f64, 2>",
    },
    Demo {
        name: "row_sums",
        about: "sum mapped over the rows of a matrix",
        example_args: "array<i64, 2>",
    },
    Demo {
        name: "clip_below",
        about: "branch merge of an integer and a float",
        example_args: "i64, f64",
    },
    Demo {
        name: "halve",
        about: "loop whose accumulator widens from i64 to f64",
        example_args: "i64",
    },
    Demo {
        name: "apply",
        about: "invoke a closure passed as an argument",
        example_args: "closure<add>(f64), array<i64, 1>",
    },
];

pub fn find(name: &str) -> Option<&'static Demo> {
    CATALOG.iter().find(|demo| demo.name == name)
}

/// Every function the catalog refers to, helpers included.
pub fn functions() -> Vec<UntypedFn> {
    vec![
        binary("add", Prim::Add),
        binary("mul", Prim::Mul),
        binary("sub", Prim::Sub),
        def("sum", &["xs"], vec![ret(reduce(func("add"), [var("xs")], None))]),
        def("cumsum", &["xs"], vec![ret(scan(func("add"), [var("xs")], None))]),
        def(
            "dot",
            &["xs", "ys"],
            vec![
                assign(var("prod"), prim(Prim::Mul, [var("xs"), var("ys")])),
                ret(reduce(func("add"), [var("prod")], None)),
            ],
        ),
        def(
            "pairwise_diff",
            &["xs", "ys"],
            vec![ret(all_pairs(func("sub"), [var("xs"), var("ys")], None))],
        ),
        def(
            "gram",
            &["m"],
            vec![ret(all_pairs(func("dot"), [var("m"), var("m")], Some(int(0))))],
        ),
        def(
            "row_sums",
            &["m"],
            vec![ret(map(func("sum"), [var("m")], Some(int(0))))],
        ),
        def(
            "clip_below",
            &["x", "floor"],
            vec![
                if_(
                    prim(Prim::Lt, [var("x"), var("floor")]),
                    vec![assign(var("lo"), var("floor"))],
                    vec![assign(var("hi"), var("x"))],
                    vec![phi("out", var("lo"), var("hi"))],
                ),
                ret(var("out")),
            ],
        ),
        def(
            "halve",
            &["n"],
            vec![
                assign(var("i0"), int(0)),
                assign(var("x0"), int(1)),
                while_(
                    prim(Prim::Lt, [var("i"), var("n")]),
                    vec![
                        assign(
                            var("x1"),
                            prim(Prim::Div, [var("x"), int(2)]),
                        ),
                        assign(var("i1"), prim(Prim::Add, [var("i"), int(1)])),
                    ],
                    vec![phi("i", var("i0"), var("i1")), phi("x", var("x0"), var("x1"))],
                ),
                ret(var("x")),
            ],
        ),
        def(
            "apply",
            &["f", "xs"],
            vec![ret(invoke(var("f"), [var("xs")]))],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lang_check::Specializer;

    #[test]
    fn every_demo_specializes_with_its_example_args() {
        let spec = Specializer::new();
        for func in functions() {
            spec.register(func).unwrap();
        }

        for demo in CATALOG {
            let args = sig_parser::parse_tys(demo.example_args).unwrap();
            let typed = spec
                .specialize(demo.name, &args)
                .unwrap_or_else(|err| panic!("{}: {err}", demo.name));
            assert!(!typed.return_type.is_unknown(), "{}", demo.name);
        }
    }
}
