// ==============================================================================
// Rank-Polymorphic Adverbs
// ==============================================================================
//
// An adverb applies its closure over the `k` outermost axes of its arguments.
// Typing lowers the arguments by `k`, invokes the closure on what remains, and
// raises the result back up.

use lang_ast::{Expr, TypedExpr, TypedExprKind};
use lang_ty::{element_types, lower_ranks, max_rank, Ty};

use crate::infer_expr::{const_axis, types_of, FnAnnotator};
use crate::{InferenceError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fold {
    Reduce,
    Scan,
}

/// Number of outer axes an adverb iterates over, and the axis recorded on the
/// typed node.
fn outer_axes(axis: Option<usize>, rank: usize) -> Result<(usize, Option<usize>)> {
    match axis {
        Some(axis) if axis < rank => Ok((1, Some(axis))),
        Some(axis) => Err(InferenceError::shape(format!(
            "axis {axis} out of range for arguments of rank {rank}"
        ))),
        None if rank == 1 => Ok((1, Some(0))),
        None => Ok((0, None)),
    }
}

impl FnAnnotator<'_> {
    pub(crate) fn annotate_map(
        &mut self,
        func: &Expr,
        args: &[Expr],
        axis: Option<&Expr>,
    ) -> Result<TypedExpr> {
        let axis = const_axis(axis)?;
        let func = self.annotate_callee(func)?;
        let args = self.annotate_exprs(args)?;
        let arg_tys = types_of(&args);

        let (k, axis) = outer_axes(axis, max_rank(&arg_tys))?;
        let nested = lower_ranks(&arg_tys, k)?;
        let ty = self.invoke(&func.ty, &nested)?.increase_rank(k)?;

        Ok(TypedExpr::new(
            TypedExprKind::Map {
                func: Box::new(func),
                args,
                axis,
            },
            ty,
        ))
    }

    /// Reduce and Scan share their typing: the closure must be a fixed point
    /// of the accumulator type.
    pub(crate) fn annotate_fold(
        &mut self,
        fold: Fold,
        func: &Expr,
        args: &[Expr],
        axis: Option<&Expr>,
        init: Option<&Expr>,
        combine: Option<&Expr>,
    ) -> Result<TypedExpr> {
        if init.is_some() {
            return Err(InferenceError::not_implemented(format!(
                "{fold:?} with an explicit initial value"
            )));
        }
        if args.len() != 1 {
            return Err(InferenceError::not_implemented(format!(
                "{fold:?} over {} inputs",
                args.len()
            )));
        }

        let axis = const_axis(axis)?;
        let func = self.annotate_callee(func)?;
        let combine = combine.map(|c| self.annotate_callee(c)).transpose()?;
        let args = self.annotate_exprs(args)?;
        let arg_tys = types_of(&args);

        let (k, axis) = outer_axes(axis, max_rank(&arg_tys))?;
        let acc = arg_tys[0].lower_rank(k)?;

        self.check_fixed_point(&func.ty, &acc)?;
        if let Some(combine) = &combine {
            self.check_fixed_point(&combine.ty, &acc)?;
        }

        let func = Box::new(func);
        let combine = combine.map(Box::new);
        let typed = match fold {
            Fold::Reduce => TypedExpr::new(
                TypedExprKind::Reduce {
                    func,
                    args,
                    axis,
                    combine,
                },
                acc,
            ),
            Fold::Scan => TypedExpr::new(
                TypedExprKind::Scan {
                    func,
                    args,
                    axis,
                    combine,
                },
                acc.increase_rank(k)?,
            ),
        };
        Ok(typed)
    }

    fn check_fixed_point(&mut self, callee: &Ty, acc: &Ty) -> Result<()> {
        let result = self.invoke(callee, &[acc.clone(), acc.clone()])?;
        if result != *acc {
            return Err(InferenceError::not_implemented(format!(
                "accumulator of type {acc} combines to {result}"
            )));
        }
        Ok(())
    }

    pub(crate) fn annotate_all_pairs(
        &mut self,
        func: &Expr,
        args: &[Expr],
        axis: Option<&Expr>,
    ) -> Result<TypedExpr> {
        if args.len() != 2 {
            return Err(InferenceError::shape(format!(
                "all_pairs takes 2 inputs, got {}",
                args.len()
            )));
        }

        let axis = const_axis(axis)?;
        let func = self.annotate_callee(func)?;
        let args = self.annotate_exprs(args)?;
        let arg_tys = types_of(&args);
        let rank = max_rank(&arg_tys);

        let (nested, axis) = match axis {
            None => (element_types(&arg_tys), (rank == 1).then_some(0)),
            Some(axis) => {
                let (k, axis) = outer_axes(Some(axis), rank)?;
                (lower_ranks(&arg_tys, k)?, axis)
            }
        };
        let ty = self.invoke(&func.ty, &nested)?.increase_rank(2)?;

        Ok(TypedExpr::new(
            TypedExprKind::AllPairs {
                func: Box::new(func),
                args,
                axis,
            },
            ty,
        ))
    }
}
