use derive_more::Debug;
use lang_ty::{FnId, Ty};

use crate::{Const, Name, PhiNodes, Prim};

/// An expression after annotation. `ty` is never `Ty::Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[debug("{kind:?} : {ty}")]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: Ty,
}

impl TypedExpr {
    pub fn new(kind: TypedExprKind, ty: Ty) -> Self {
        Self { kind, ty }
    }
}

/// Mirrors [`crate::Expr`]. Adverb axes are resolved to constants here and
/// tuple indexing becomes `TupleProj`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypedExprKind {
    #[debug("Var({_0})")]
    Var(Name),

    #[debug("{_0:?}")]
    Const(Const),

    Tuple(Vec<TypedExpr>),

    Array(Vec<TypedExpr>),

    Index {
        value: Box<TypedExpr>,
        index: Box<TypedExpr>,
    },

    /// Constant projection out of a tuple. `index` is already normalized to
    /// be non-negative.
    TupleProj {
        tuple: Box<TypedExpr>,
        index: usize,
    },

    Slice {
        start: Box<TypedExpr>,
        stop: Box<TypedExpr>,
        step: Box<TypedExpr>,
    },

    Attribute {
        value: Box<TypedExpr>,
        name: Name,
    },

    PrimCall {
        prim: Prim,
        args: Vec<TypedExpr>,
    },

    Closure {
        func: FnId,
        args: Vec<TypedExpr>,
    },

    Invoke {
        closure: Box<TypedExpr>,
        args: Vec<TypedExpr>,
    },

    Map {
        func: Box<TypedExpr>,
        args: Vec<TypedExpr>,
        axis: Option<usize>,
    },

    Reduce {
        func: Box<TypedExpr>,
        args: Vec<TypedExpr>,
        axis: Option<usize>,
        combine: Option<Box<TypedExpr>>,
    },

    Scan {
        func: Box<TypedExpr>,
        args: Vec<TypedExpr>,
        axis: Option<usize>,
        combine: Option<Box<TypedExpr>>,
    },

    AllPairs {
        func: Box<TypedExpr>,
        args: Vec<TypedExpr>,
        axis: Option<usize>,
    },
}

pub type TypedBlock = Vec<TypedStmt>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypedStmt {
    Assign {
        lhs: TypedExpr,
        rhs: TypedExpr,
    },

    If {
        cond: TypedExpr,
        true_block: TypedBlock,
        false_block: TypedBlock,
        merge: PhiNodes<TypedExpr>,
    },

    While {
        cond: TypedExpr,
        body: TypedBlock,
        merge: PhiNodes<TypedExpr>,
    },

    Return(TypedExpr),
}
