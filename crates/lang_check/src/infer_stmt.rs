// ==============================================================================
// Statement Annotation
// ==============================================================================

use lang_ast::{
    Const, Expr, PhiNode, PhiNodes, Stmt, TypedExpr, TypedExprKind, TypedFn, TypedStmt,
    UntypedFn,
};
use lang_ty::Ty;

use crate::infer_expr::FnAnnotator;
use crate::{InferenceError, Result};

impl FnAnnotator<'_> {
    /// Bind `arg_types` to the parameters of `func` and annotate its body.
    pub(crate) fn annotate_fn(mut self, func: &UntypedFn, arg_types: &[Ty]) -> Result<TypedFn> {
        log::trace!("annotating {}", func.name);

        let bound = func.params.bind(arg_types)?;
        for (name, ty) in &bound.bindings {
            let local = self.vars.rename(self.spec.names(), name);
            self.env.widen(&local, ty)?;
        }
        let params = func.params.rename(|name| {
            self.vars
                .lookup(name)
                .cloned()
                .unwrap_or_else(|| name.clone())
        });

        let mut body = self.annotate_block(&func.body)?;
        let return_type = match self.return_ty.take() {
            Some(ty) => ty,
            None => {
                body.push(TypedStmt::Return(TypedExpr::new(
                    TypedExprKind::Const(Const::None),
                    Ty::None,
                )));
                Ty::None
            }
        };

        Ok(TypedFn {
            name: self.spec.names().refresh(func.name.as_str()),
            source: func.name.clone(),
            params,
            body,
            input_types: bound.input_types,
            return_type,
            type_env: self.env.into_sorted(),
        })
    }

    pub(crate) fn annotate_block(&mut self, block: &[Stmt]) -> Result<Vec<TypedStmt>> {
        block.iter().map(|stmt| self.annotate_stmt(stmt)).collect()
    }

    fn annotate_stmt(&mut self, stmt: &Stmt) -> Result<TypedStmt> {
        match stmt {
            Stmt::Assign { lhs, rhs } => {
                let rhs = self.annotate_expr(rhs)?;
                let lhs = self.annotate_target(lhs, &rhs.ty)?;
                Ok(TypedStmt::Assign { lhs, rhs })
            }

            Stmt::If {
                cond,
                true_block,
                false_block,
                merge,
            } => {
                let cond = self.annotate_cond(cond)?;
                let true_block = self.annotate_block(true_block)?;
                let false_block = self.annotate_block(false_block)?;
                let merge = self.annotate_if_phis(merge)?;
                Ok(TypedStmt::If {
                    cond,
                    true_block,
                    false_block,
                    merge,
                })
            }

            Stmt::While { cond, body, merge } => self.annotate_while(cond, body, merge),

            Stmt::Return(value) => {
                let value = self.annotate_expr(value)?;
                let widened = match &self.return_ty {
                    Some(prev) => prev.combine(&value.ty)?,
                    None => value.ty.clone(),
                };
                self.return_ty = Some(widened);
                Ok(TypedStmt::Return(value))
            }
        }
    }

    fn annotate_cond(&mut self, cond: &Expr) -> Result<TypedExpr> {
        let cond = self.annotate_expr(cond)?;
        if !cond.ty.is_scalar() {
            return Err(InferenceError::shape(format!(
                "condition must be a scalar, got {}",
                cond.ty
            )));
        }
        Ok(cond)
    }

    /// Annotate an assignment target that receives a value of type `rhs`.
    fn annotate_target(&mut self, lhs: &Expr, rhs: &Ty) -> Result<TypedExpr> {
        match lhs {
            Expr::Var(name) => {
                let local = self.vars.bind(self.spec.names(), name);
                let ty = self.env.widen(&local, rhs)?;
                Ok(TypedExpr::new(TypedExprKind::Var(local), ty))
            }

            Expr::Tuple(pattern) => {
                let elems = match rhs {
                    Ty::Tuple(elems) if elems.len() == pattern.len() => elems,
                    _ => {
                        return Err(InferenceError::shape(format!(
                            "cannot destructure {rhs} into {} names",
                            pattern.len()
                        )))
                    }
                };
                let parts = pattern
                    .iter()
                    .zip(elems)
                    .map(|(target, ty)| self.annotate_target(target, ty))
                    .collect::<Result<Vec<_>>>()?;
                let ty = Ty::tuple(parts.iter().map(|p| p.ty.clone()));
                Ok(TypedExpr::new(TypedExprKind::Tuple(parts), ty))
            }

            Expr::Index { value, index } => {
                let value = self.annotate_expr(value)?;
                if !value.ty.is_array() {
                    return Err(InferenceError::shape(format!(
                        "cannot assign into an element of {}",
                        value.ty
                    )));
                }
                let index = self.annotate_expr(index)?;
                let slot = value.ty.index_type(&index.ty)?;
                // stored values may broadcast up to the slot, never down
                if rhs.rank() > slot.rank() {
                    return Err(InferenceError::shape(format!(
                        "cannot store {rhs} into a slot of type {slot}"
                    )));
                }
                slot.element_type().combine(&rhs.element_type())?;
                Ok(TypedExpr::new(
                    TypedExprKind::Index {
                        value: Box::new(value),
                        index: Box::new(index),
                    },
                    slot,
                ))
            }

            Expr::Attribute { value, name } => {
                let value = self.annotate_expr(value)?;
                let field = match &value.ty {
                    Ty::Struct(fields) => fields.field_type(name).cloned(),
                    _ => None,
                }
                .ok_or_else(|| {
                    InferenceError::shape(format!("{} has no attribute `{name}`", value.ty))
                })?;
                // the struct's layout is fixed, so the field keeps its type
                field.combine(rhs)?;
                Ok(TypedExpr::new(
                    TypedExprKind::Attribute {
                        value: Box::new(value),
                        name: name.clone(),
                    },
                    field,
                ))
            }

            other => Err(InferenceError::shape(format!(
                "cannot assign to {other:?}"
            ))),
        }
    }

    // ==========================================================================
    // Merges
    // ==========================================================================

    fn annotate_if_phis(&mut self, phis: &PhiNodes<Expr>) -> Result<PhiNodes<TypedExpr>> {
        phis.iter()
            .map(|phi| {
                let left = self.annotate_expr(&phi.left)?;
                let right = self.annotate_expr(&phi.right)?;
                let local = self.vars.bind(self.spec.names(), &phi.var);
                self.env.widen(&local, &left.ty.combine(&right.ty)?)?;
                Ok(PhiNode {
                    var: local,
                    left,
                    right,
                })
            })
            .collect()
    }

    /// Annotate a loop until the environment stops changing. Each pass seeds
    /// the merge variables from the entering values, walks the body, and then
    /// folds in the values flowing back along the back edge.
    fn annotate_while(
        &mut self,
        cond: &Expr,
        body: &[Stmt],
        merge: &PhiNodes<Expr>,
    ) -> Result<TypedStmt> {
        let limit = self.spec.config().max_loop_iterations;

        for pass in 1..=limit {
            let mut entries = Vec::with_capacity(merge.len());
            for phi in merge {
                let left = self.annotate_expr(&phi.left)?;
                let local = self.vars.bind(self.spec.names(), &phi.var);
                self.env.widen(&local, &left.ty)?;
                entries.push((local, left));
            }
            // names first bound inside the body do not count as changes
            let before = self.env.clone();

            let cond = self.annotate_cond(cond)?;
            let body = self.annotate_block(body)?;

            let mut phis = Vec::with_capacity(merge.len());
            for (phi, (local, left)) in merge.iter().zip(entries) {
                let right = self.annotate_expr(&phi.right)?;
                self.env.widen(&local, &right.ty)?;
                phis.push(PhiNode {
                    var: local,
                    left,
                    right,
                });
            }

            if self.env.extends(&before) {
                log::trace!("loop types settled after {pass} passes");
                return Ok(TypedStmt::While {
                    cond,
                    body,
                    merge: phis,
                });
            }
        }

        Err(InferenceError::not_implemented(format!(
            "loop types did not settle within {limit} passes"
        )))
    }
}
