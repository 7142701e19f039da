// ==============================================================================
// Expression Annotation
// ==============================================================================
//
// Every expression is annotated bottom-up in a single walk: children first,
// then the node derives its own type from theirs. Calls into other functions
// re-enter the specializer through the shared in-flight request.

use itertools::Itertools;
use lang_ast::{Const, Expr, Name, Prim, TypedExpr, TypedExprKind};
use lang_ty::{combine_all, element_types, max_rank, ScalarTy, Ty};

use crate::adverbs::Fold;
use crate::env::TyEnv;
use crate::rename::VarMap;
use crate::specialize::{Request, Specializer};
use crate::{prims, InferenceError, Result};

/// Annotation state for one specialization: the local names, their types,
/// and the return type seen so far.
pub(crate) struct FnAnnotator<'a> {
    pub(crate) spec: &'a Specializer,
    req: &'a mut Request,
    pub(crate) vars: VarMap,
    pub(crate) env: TyEnv,
    pub(crate) return_ty: Option<Ty>,
}

impl<'a> FnAnnotator<'a> {
    pub(crate) fn new(spec: &'a Specializer, req: &'a mut Request) -> Self {
        Self {
            spec,
            req,
            vars: VarMap::new(),
            env: TyEnv::new(),
            return_ty: None,
        }
    }

    /// Result type of calling `callee` with `args`, specializing whatever it
    /// dispatches to.
    pub(crate) fn invoke(&mut self, callee: &Ty, args: &[Ty]) -> Result<Ty> {
        self.spec.invoke_in(self.req, callee, args)
    }

    pub(crate) fn annotate_exprs(&mut self, exprs: &[Expr]) -> Result<Vec<TypedExpr>> {
        exprs.iter().map(|e| self.annotate_expr(e)).collect()
    }

    pub(crate) fn annotate_expr(&mut self, expr: &Expr) -> Result<TypedExpr> {
        match expr {
            Expr::Var(name) => self.annotate_var(name),

            Expr::Const(c) => Ok(TypedExpr::new(TypedExprKind::Const(*c), c.ty())),

            Expr::Tuple(elems) => {
                let elems = self.annotate_exprs(elems)?;
                let ty = Ty::tuple(types_of(&elems));
                Ok(TypedExpr::new(TypedExprKind::Tuple(elems), ty))
            }

            Expr::Array(elems) => {
                if elems.is_empty() {
                    return Err(InferenceError::shape(
                        "empty array literal has no element type",
                    ));
                }
                let elems = self.annotate_exprs(elems)?;
                let ty = combine_all(elems.iter().map(|e| &e.ty))?.increase_rank(1)?;
                Ok(TypedExpr::new(TypedExprKind::Array(elems), ty))
            }

            Expr::Index { value, index } => self.annotate_index(value, index),

            Expr::Slice { start, stop, step } => {
                let start = self.annotate_expr(start)?;
                let stop = self.annotate_expr(stop)?;
                let step = self.annotate_expr(step)?;
                let ty = Ty::slice(start.ty.clone(), stop.ty.clone(), step.ty.clone());
                Ok(TypedExpr::new(
                    TypedExprKind::Slice {
                        start: Box::new(start),
                        stop: Box::new(stop),
                        step: Box::new(step),
                    },
                    ty,
                ))
            }

            Expr::Attribute { value, name } => {
                let value = self.annotate_expr(value)?;
                let ty = match &value.ty {
                    Ty::Struct(fields) => fields.field_type(name).cloned(),
                    _ => None,
                }
                .ok_or_else(|| {
                    InferenceError::shape(format!("{} has no attribute `{name}`", value.ty))
                })?;
                Ok(TypedExpr::new(
                    TypedExprKind::Attribute {
                        value: Box::new(value),
                        name: name.clone(),
                    },
                    ty,
                ))
            }

            Expr::PrimCall { prim, args } => self.annotate_prim_call(*prim, args),

            Expr::Closure { func, args } => {
                if !self.spec.registry().contains(func) {
                    return Err(InferenceError::UnknownFunction(func.clone()));
                }
                let args = self.annotate_exprs(args)?;
                let ty = Ty::closure(func.clone(), types_of(&args));
                Ok(TypedExpr::new(
                    TypedExprKind::Closure {
                        func: func.clone(),
                        args,
                    },
                    ty,
                ))
            }

            Expr::Invoke { closure, args } => {
                let closure = self.annotate_callee(closure)?;
                let args = self.annotate_exprs(args)?;
                let ty = self.invoke(&closure.ty, &types_of(&args))?;
                Ok(TypedExpr::new(
                    TypedExprKind::Invoke {
                        closure: Box::new(closure),
                        args,
                    },
                    ty,
                ))
            }

            Expr::Map { func, args, axis } => self.annotate_map(func, args, axis.as_deref()),

            Expr::Reduce {
                func,
                args,
                axis,
                init,
                combine,
            } => self.annotate_fold(
                Fold::Reduce,
                func,
                args,
                axis.as_deref(),
                init.as_deref(),
                combine.as_deref(),
            ),

            Expr::Scan {
                func,
                args,
                axis,
                init,
                combine,
            } => self.annotate_fold(
                Fold::Scan,
                func,
                args,
                axis.as_deref(),
                init.as_deref(),
                combine.as_deref(),
            ),

            Expr::AllPairs { func, args, axis } => {
                self.annotate_all_pairs(func, args, axis.as_deref())
            }
        }
    }

    fn annotate_var(&mut self, name: &Name) -> Result<TypedExpr> {
        let local = self
            .vars
            .lookup(name)
            .ok_or_else(|| InferenceError::NameNotFound(name.clone()))?
            .clone();
        let ty = self
            .env
            .get(&local)
            .cloned()
            .ok_or_else(|| InferenceError::NameNotFound(name.clone()))?;
        Ok(TypedExpr::new(TypedExprKind::Var(local), ty))
    }

    /// Annotate an expression used as a function. Anything that cannot be
    /// called is rejected here, before the resolver sees it.
    pub(crate) fn annotate_callee(&mut self, expr: &Expr) -> Result<TypedExpr> {
        let callee = self.annotate_expr(expr)?;
        if !callee.ty.is_callable() {
            return Err(InferenceError::InferenceFailed(callee.ty));
        }
        Ok(callee)
    }

    fn annotate_index(&mut self, value: &Expr, index: &Expr) -> Result<TypedExpr> {
        let value = self.annotate_expr(value)?;

        if let Ty::Tuple(elems) = &value.ty {
            let Expr::Const(Const::Int(raw)) = index else {
                return Err(InferenceError::shape(
                    "tuple index must be a constant integer",
                ));
            };
            let slot = normalize_index(*raw, elems.len()).ok_or_else(|| {
                InferenceError::shape(format!(
                    "index {raw} out of range for tuple of length {}",
                    elems.len()
                ))
            })?;
            let ty = elems[slot].clone();
            return Ok(TypedExpr::new(
                TypedExprKind::TupleProj {
                    tuple: Box::new(value),
                    index: slot,
                },
                ty,
            ));
        }

        let index = self.annotate_expr(index)?;
        let ty = value.ty.index_type(&index.ty)?;
        Ok(TypedExpr::new(
            TypedExprKind::Index {
                value: Box::new(value),
                index: Box::new(index),
            },
            ty,
        ))
    }

    fn annotate_prim_call(&mut self, prim: Prim, args: &[Expr]) -> Result<TypedExpr> {
        let args = self.annotate_exprs(args)?;
        let expected = prims::arity(prim);
        if args.len() != expected {
            return Err(InferenceError::shape(format!(
                "{prim} takes {expected} arguments, got {}",
                args.len()
            )));
        }

        let arg_tys = types_of(&args);
        if let Some(kinds) = scalar_kinds(&arg_tys) {
            let ty = Ty::Scalar(prims::result_type(prim, &kinds));
            return Ok(TypedExpr::new(TypedExprKind::PrimCall { prim, args }, ty));
        }

        if !arg_tys.iter().all(|ty| ty.is_scalar() || ty.is_array()) {
            return Err(InferenceError::shape(format!(
                "{prim} cannot be applied to ({})",
                arg_tys.iter().join(", ")
            )));
        }

        // lift over the arrays by mapping the scalar wrapper
        let wrapper = self.spec.registry().prim_wrapper(prim)?;
        let kinds = scalar_kinds(&element_types(&arg_tys)).ok_or_else(|| {
            InferenceError::shape(format!("{prim} needs scalar element types"))
        })?;
        let upcast = prims::expected_input_types(prim, &kinds)
            .into_iter()
            .map(Ty::Scalar)
            .collect_vec();

        let closure_ty = Ty::closure(wrapper.clone(), Vec::new());
        let elem = self.invoke(&closure_ty, &upcast)?;
        let ty = elem.increase_rank(max_rank(&arg_tys))?;
        log::trace!("lifted {prim} over ({}) to {ty}", arg_tys.iter().join(", "));

        let func = TypedExpr::new(
            TypedExprKind::Closure {
                func: wrapper,
                args: Vec::new(),
            },
            closure_ty,
        );
        Ok(TypedExpr::new(
            TypedExprKind::Map {
                func: Box::new(func),
                args,
                axis: None,
            },
            ty,
        ))
    }
}

pub(crate) fn types_of(exprs: &[TypedExpr]) -> Vec<Ty> {
    exprs.iter().map(|e| e.ty.clone()).collect()
}

/// The scalar kinds of `tys`, or `None` if any of them is not a scalar.
fn scalar_kinds(tys: &[Ty]) -> Option<Vec<ScalarTy>> {
    tys.iter().map(Ty::as_scalar).collect()
}

fn normalize_index(raw: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let pos = if raw < 0 { raw + len } else { raw };
    if (0..len).contains(&pos) {
        usize::try_from(pos).ok()
    } else {
        None
    }
}

/// An adverb axis: absent, `None`, or a non-negative integer literal.
pub(crate) fn const_axis(axis: Option<&Expr>) -> Result<Option<usize>> {
    match axis {
        None | Some(Expr::Const(Const::None)) => Ok(None),
        Some(Expr::Const(Const::Int(i))) if *i >= 0 => usize::try_from(*i)
            .map(Some)
            .map_err(|_| InferenceError::not_implemented(format!("axis {i}"))),
        Some(other) => Err(InferenceError::not_implemented(format!(
            "non-constant or negative axis {other:?}"
        ))),
    }
}
