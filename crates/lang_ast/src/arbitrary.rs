use proptest::prelude::{any, prop, prop_oneof, Arbitrary, BoxedStrategy, Just, Strategy};

use crate::{Const, Prim};

impl Arbitrary for Prim {
    type Parameters = ();
    type Strategy = BoxedStrategy<Prim>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop::sample::select(Prim::ALL.to_vec()).boxed()
    }
}

impl Arbitrary for Const {
    type Parameters = ();
    type Strategy = BoxedStrategy<Const>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            any::<bool>().prop_map(Const::Bool),
            any::<i64>().prop_map(Const::Int),
            // keep NaN out so constants compare sanely in assertions
            (-1.0e6f64..1.0e6).prop_map(Const::from),
            Just(Const::None),
        ]
        .boxed()
    }
}
