// ==============================================================================
// Property-Based Tests for Specialization
// ==============================================================================
//
// Generates primitive calls over random scalar kinds and ranks, then checks
// the annotator against the primitive table and the rank rules directly.
//
// Known limitations:
// - Only single-primitive bodies are generated. Control flow and adverbs are
//   covered by the example tests in `tests.rs`.

use std::sync::Arc;

use lang_ast::helpers::{prim, ret, var};
use lang_ast::{Name, Params, Prim, UntypedFn};
use lang_ty::{arbitrary::arb_scalar, ScalarTy, Ty};
use proptest::prelude::{any, prop, prop_assert, prop_assert_eq, proptest, ProptestConfig, Strategy};

use crate::{prims, Specializer};

/// `call(x0, .., xn) = prim(x0, .., xn)`
fn prim_fn(op: Prim) -> UntypedFn {
    let params: Vec<Name> = (0..prims::arity(op))
        .map(|i| Name::from(format!("x{i}")))
        .collect();
    let body = vec![ret(prim(op, params.iter().cloned().map(var)))];
    UntypedFn::new("call", Params::new(params), body)
}

/// A primitive together with scalar kinds for each of its arguments.
fn arb_prim_call() -> impl Strategy<Value = (Prim, Vec<ScalarTy>)> {
    any::<Prim>().prop_flat_map(|op| {
        (
            prop::strategy::Just(op),
            prop::collection::vec(arb_scalar(), prims::arity(op)),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn scalar_calls_follow_the_prim_table((op, kinds) in arb_prim_call()) {
        let spec = Specializer::new();
        let args: Vec<Ty> = kinds.iter().copied().map(Ty::Scalar).collect();

        let ret_ty = spec.infer_return_type(prim_fn(op), &args).unwrap();
        prop_assert_eq!(ret_ty, Ty::Scalar(prims::result_type(op, &kinds)));
    }

    #[test]
    fn lifted_calls_keep_the_highest_rank(
        (op, kinds) in arb_prim_call(),
        ranks in prop::collection::vec(0usize..4, 2),
    ) {
        let args: Vec<Ty> = kinds
            .iter()
            .zip(ranks.iter().cycle())
            .map(|(kind, rank)| Ty::array(*kind, *rank))
            .collect();
        let rank = args.iter().map(Ty::rank).max().unwrap_or(0);

        let spec = Specializer::new();
        let ret_ty = spec.infer_return_type(prim_fn(op), &args).unwrap();
        prop_assert_eq!(ret_ty, Ty::array(prims::result_type(op, &kinds), rank));
    }

    #[test]
    fn specialization_is_idempotent((op, kinds) in arb_prim_call()) {
        let spec = Specializer::new();
        let args: Vec<Ty> = kinds.iter().copied().map(Ty::Scalar).collect();

        let first = spec.specialize(prim_fn(op), &args).unwrap();
        let inferences = spec.stats().inferences;
        let second = spec.specialize("call", &args).unwrap();

        prop_assert!(Arc::ptr_eq(&first, &second));
        prop_assert_eq!(spec.stats().inferences, inferences);
        prop_assert!(!first.return_type.is_unknown());
    }
}
