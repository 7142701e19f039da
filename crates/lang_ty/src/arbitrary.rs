use crate::{ClosureTy, ScalarTy, StructTy, Ty};
use proptest::{
    prelude::{any, prop, prop_oneof, Arbitrary, BoxedStrategy, Just, Strategy},
    prop_compose,
};
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy)]
pub struct RecursiveParams {
    pub depth: u32,
    pub desired_size: u32,
    pub expected_branch_size: u32,
}

impl Default for RecursiveParams {
    fn default() -> Self {
        Self {
            depth: 3,                // levels deep
            desired_size: 32,        // total nodes
            expected_branch_size: 3, // items per collection
        }
    }
}

pub fn arb_scalar() -> impl Strategy<Value = ScalarTy> {
    prop::sample::select(ScalarTy::ALL.to_vec())
}

impl Arbitrary for ScalarTy {
    type Parameters = ();
    type Strategy = BoxedStrategy<ScalarTy>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        arb_scalar().boxed()
    }
}

prop_compose! {
    // a small pool so that generated closures collide now and then
    fn arb_fn_name()(name in prop::sample::select(vec!["f", "g", "h"])) -> SmolStr {
        name.into()
    }
}

prop_compose! {
    fn arb_field_name()(string in "[a-z]{1,3}") -> SmolStr {
        string.into()
    }
}

fn arb_leaf() -> impl Strategy<Value = Ty> {
    prop_oneof![
        3 => arb_scalar().prop_map(Ty::Scalar),
        3 => (arb_scalar(), 1usize..4).prop_map(|(elem, rank)| Ty::array(elem, rank)),
        1 => Just(Ty::None),
        1 => Just(Ty::Unknown),
        1 => (arb_fn_name(), prop::collection::vec(arb_scalar().prop_map(Ty::Scalar), 0..2))
            .prop_map(|(func, args)| Ty::closure(func, args)),
    ]
}

pub fn arb_ty_with(args: RecursiveParams) -> impl Strategy<Value = Ty> {
    arb_leaf().prop_recursive(
        args.depth,
        args.desired_size,
        args.expected_branch_size,
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Ty::Tuple),
                prop::collection::btree_map(arb_field_name(), inner.clone(), 1..4)
                    .prop_map(|fields| Ty::Struct(StructTy::from_fields(fields))),
                (inner.clone(), inner.clone(), inner)
                    .prop_map(|(start, stop, step)| Ty::slice(start, stop, step)),
            ]
        },
    )
}

pub fn arb_ty() -> impl Strategy<Value = Ty> {
    arb_ty_with(RecursiveParams::default())
}

impl Arbitrary for Ty {
    type Parameters = RecursiveParams;
    type Strategy = BoxedStrategy<Ty>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        arb_ty_with(args).boxed()
    }
}

// ==============================================================================
// Joinable pairs
// ==============================================================================
//
// Two types of the same shape that differ only in scalar kinds, closure
// identities, or an `Unknown` on either side. Every generated pair combines
// without error.

fn arb_joinable_leaf() -> impl Strategy<Value = (Ty, Ty)> {
    prop_oneof![
        (arb_scalar(), arb_scalar()).prop_map(|(l, r)| (Ty::Scalar(l), Ty::Scalar(r))),
        (arb_scalar(), arb_scalar(), 1usize..4)
            .prop_map(|(l, r, rank)| (Ty::array(l, rank), Ty::array(r, rank))),
        Just((Ty::None, Ty::None)),
        (arb_ty(), any::<bool>()).prop_map(|(ty, flip)| if flip {
            (ty, Ty::Unknown)
        } else {
            (Ty::Unknown, ty)
        }),
        (arb_fn_name(), arb_fn_name()).prop_map(|(l, r)| (
            Ty::Closure(ClosureTy::new(l, vec![])),
            Ty::Closure(ClosureTy::new(r, vec![]))
        )),
    ]
}

pub fn arb_joinable_pair() -> impl Strategy<Value = (Ty, Ty)> {
    let params = RecursiveParams::default();
    arb_joinable_leaf().prop_recursive(
        params.depth,
        params.desired_size,
        params.expected_branch_size,
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(|pairs| {
                    let (lhs, rhs): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
                    (Ty::Tuple(lhs), Ty::Tuple(rhs))
                }),
                prop::collection::btree_map(arb_field_name(), inner.clone(), 1..4).prop_map(
                    |fields| {
                        let lhs = fields.iter().map(|(k, (l, _))| (k.clone(), l.clone()));
                        let rhs = fields.iter().map(|(k, (_, r))| (k.clone(), r.clone()));
                        (
                            Ty::Struct(lhs.collect::<StructTy>()),
                            Ty::Struct(rhs.collect::<StructTy>()),
                        )
                    }
                ),
            ]
        },
    )
}
