// ==============================================================================
// Primitive Dispatch Table
// ==============================================================================
//
// Typing rules for every scalar primitive live here, in one table, so the
// annotator never special-cases an operator. Each rule sees only scalar kinds;
// lifting over arrays is the annotator's job.

use lang_ast::Prim;
use lang_ty::{NumpyPromotion, PromotionPolicy, ScalarTy};

/// How a primitive types its operands and its result.
pub struct PrimSpec {
    pub arity: usize,

    /// Given the argument kinds, the kinds they are upcast to before the
    /// operation runs. Always the same length as the input.
    pub inputs: fn(&[ScalarTy]) -> Vec<ScalarTy>,

    /// Given the upcast argument kinds, the result kind.
    pub result: fn(&[ScalarTy]) -> ScalarTy,
}

pub fn prim_spec(prim: Prim) -> PrimSpec {
    match prim {
        Prim::Add | Prim::Sub | Prim::Mul | Prim::Mod | Prim::Pow | Prim::Max | Prim::Min => {
            PrimSpec {
                arity: 2,
                inputs: upcast_to_join,
                result: first,
            }
        }
        Prim::Div => PrimSpec {
            arity: 2,
            inputs: upcast_to_float_join,
            result: first,
        },
        Prim::Eq | Prim::NotEq | Prim::Lt | Prim::LtE | Prim::Gt | Prim::GtE => PrimSpec {
            arity: 2,
            inputs: upcast_to_join,
            result: boolean,
        },
        Prim::And | Prim::Or => PrimSpec {
            arity: 2,
            inputs: all_bool,
            result: boolean,
        },
        Prim::Not => PrimSpec {
            arity: 1,
            inputs: all_bool,
            result: boolean,
        },
        Prim::Neg | Prim::Abs => PrimSpec {
            arity: 1,
            inputs: unchanged,
            result: first,
        },
        Prim::Sqrt | Prim::Exp | Prim::Log | Prim::Sin | Prim::Cos => PrimSpec {
            arity: 1,
            inputs: upcast_to_float_join,
            result: first,
        },
    }
}

pub fn arity(prim: Prim) -> usize {
    prim_spec(prim).arity
}

pub fn expected_input_types(prim: Prim, args: &[ScalarTy]) -> Vec<ScalarTy> {
    (prim_spec(prim).inputs)(args)
}

/// Result kind of `prim` applied to arguments of the given kinds. The
/// arguments are upcast first.
pub fn result_type(prim: Prim, args: &[ScalarTy]) -> ScalarTy {
    let spec = prim_spec(prim);
    (spec.result)(&(spec.inputs)(args))
}

// ==========================================================================
// Rules
// ==========================================================================

fn join(args: &[ScalarTy]) -> ScalarTy {
    args.iter()
        .copied()
        .reduce(|acc, arg| NumpyPromotion.join(acc, arg))
        .unwrap_or(ScalarTy::Bool)
}

fn upcast_to_join(args: &[ScalarTy]) -> Vec<ScalarTy> {
    vec![join(args); args.len()]
}

/// Integers and bools divide as f64; float operands keep their width.
fn upcast_to_float_join(args: &[ScalarTy]) -> Vec<ScalarTy> {
    let joined = join(args);
    let float = if joined.is_float() {
        joined
    } else {
        ScalarTy::F64
    };
    vec![float; args.len()]
}

fn all_bool(args: &[ScalarTy]) -> Vec<ScalarTy> {
    vec![ScalarTy::Bool; args.len()]
}

fn unchanged(args: &[ScalarTy]) -> Vec<ScalarTy> {
    args.to_vec()
}

fn first(args: &[ScalarTy]) -> ScalarTy {
    args.first().copied().unwrap_or(ScalarTy::Bool)
}

fn boolean(_args: &[ScalarTy]) -> ScalarTy {
    ScalarTy::Bool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_joins() {
        assert_eq!(
            result_type(Prim::Add, &[ScalarTy::I64, ScalarTy::F64]),
            ScalarTy::F64
        );
        assert_eq!(
            expected_input_types(Prim::Mul, &[ScalarTy::I8, ScalarTy::I32]),
            vec![ScalarTy::I32, ScalarTy::I32]
        );
    }

    #[test]
    fn division_is_floating() {
        assert_eq!(
            result_type(Prim::Div, &[ScalarTy::I64, ScalarTy::I64]),
            ScalarTy::F64
        );
        assert_eq!(
            result_type(Prim::Div, &[ScalarTy::F32, ScalarTy::F32]),
            ScalarTy::F32
        );
        assert_eq!(result_type(Prim::Sqrt, &[ScalarTy::I32]), ScalarTy::F64);
    }

    #[test]
    fn comparisons_and_logic_are_bool() {
        assert_eq!(
            result_type(Prim::Lt, &[ScalarTy::F32, ScalarTy::I64]),
            ScalarTy::Bool
        );
        assert_eq!(
            expected_input_types(Prim::Lt, &[ScalarTy::F32, ScalarTy::I64]),
            vec![ScalarTy::F64, ScalarTy::F64]
        );
        assert_eq!(result_type(Prim::Not, &[ScalarTy::I64]), ScalarTy::Bool);
    }

    #[test]
    fn unary_ops_keep_kind() {
        assert_eq!(result_type(Prim::Neg, &[ScalarTy::I16]), ScalarTy::I16);
        assert_eq!(result_type(Prim::Abs, &[ScalarTy::F32]), ScalarTy::F32);
    }

    #[test]
    fn every_prim_has_a_consistent_arity() {
        for prim in Prim::ALL {
            let args = vec![ScalarTy::I32; arity(prim)];
            assert_eq!(expected_input_types(prim, &args).len(), args.len(), "{prim}");
        }
    }
}
