//! Builders for untyped trees. Parsing is out of scope for this workspace, so
//! tests and the demo catalog construct functions through these.

use lang_ty::FnId;

use crate::{Const, Expr, Name, PhiNode, Prim, Stmt};

pub fn var(name: impl Into<Name>) -> Expr {
    Expr::Var(name.into())
}

pub fn int(value: i64) -> Expr {
    Expr::Const(Const::Int(value))
}

pub fn float(value: f64) -> Expr {
    Expr::Const(value.into())
}

pub fn boolean(value: bool) -> Expr {
    Expr::Const(Const::Bool(value))
}

pub fn none() -> Expr {
    Expr::Const(Const::None)
}

pub fn tuple(elems: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Tuple(elems.into_iter().collect())
}

pub fn array(elems: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Array(elems.into_iter().collect())
}

pub fn index(value: Expr, index: Expr) -> Expr {
    Expr::Index {
        value: Box::new(value),
        index: Box::new(index),
    }
}

pub fn slice(start: Expr, stop: Expr, step: Expr) -> Expr {
    Expr::Slice {
        start: Box::new(start),
        stop: Box::new(stop),
        step: Box::new(step),
    }
}

pub fn attr(value: Expr, name: impl Into<Name>) -> Expr {
    Expr::Attribute {
        value: Box::new(value),
        name: name.into(),
    }
}

pub fn prim(prim: Prim, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::PrimCall {
        prim,
        args: args.into_iter().collect(),
    }
}

pub fn closure(func: impl Into<FnId>, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Closure {
        func: func.into(),
        args: args.into_iter().collect(),
    }
}

/// A closure over `func` with nothing captured.
pub fn func(func: impl Into<FnId>) -> Expr {
    closure(func, Vec::new())
}

pub fn invoke(closure: Expr, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Invoke {
        closure: Box::new(closure),
        args: args.into_iter().collect(),
    }
}

// ==============================================================================
// Adverbs
// ==============================================================================

pub fn map(func: Expr, args: impl IntoIterator<Item = Expr>, axis: Option<Expr>) -> Expr {
    Expr::Map {
        func: Box::new(func),
        args: args.into_iter().collect(),
        axis: axis.map(Box::new),
    }
}

pub fn reduce(func: Expr, args: impl IntoIterator<Item = Expr>, axis: Option<Expr>) -> Expr {
    Expr::Reduce {
        func: Box::new(func),
        args: args.into_iter().collect(),
        axis: axis.map(Box::new),
        init: None,
        combine: None,
    }
}

pub fn scan(func: Expr, args: impl IntoIterator<Item = Expr>, axis: Option<Expr>) -> Expr {
    Expr::Scan {
        func: Box::new(func),
        args: args.into_iter().collect(),
        axis: axis.map(Box::new),
        init: None,
        combine: None,
    }
}

pub fn all_pairs(func: Expr, args: impl IntoIterator<Item = Expr>, axis: Option<Expr>) -> Expr {
    Expr::AllPairs {
        func: Box::new(func),
        args: args.into_iter().collect(),
        axis: axis.map(Box::new),
    }
}

/// Sets `init` on a `Reduce` or `Scan`. Other nodes are returned unchanged.
pub fn with_init(mut expr: Expr, value: Expr) -> Expr {
    if let Expr::Reduce { init, .. } | Expr::Scan { init, .. } = &mut expr {
        *init = Some(Box::new(value));
    }
    expr
}

/// Sets the combiner on a `Reduce` or `Scan`. Other nodes are returned
/// unchanged.
pub fn with_combine(mut expr: Expr, combiner: Expr) -> Expr {
    if let Expr::Reduce { combine, .. } | Expr::Scan { combine, .. } = &mut expr {
        *combine = Some(Box::new(combiner));
    }
    expr
}

// ==============================================================================
// Statements
// ==============================================================================

pub fn assign(lhs: Expr, rhs: Expr) -> Stmt {
    Stmt::Assign { lhs, rhs }
}

pub fn ret(value: Expr) -> Stmt {
    Stmt::Return(value)
}

pub fn phi(var: impl Into<Name>, left: Expr, right: Expr) -> PhiNode<Expr> {
    PhiNode {
        var: var.into(),
        left,
        right,
    }
}

pub fn if_(
    cond: Expr,
    true_block: Vec<Stmt>,
    false_block: Vec<Stmt>,
    merge: Vec<PhiNode<Expr>>,
) -> Stmt {
    Stmt::If {
        cond,
        true_block,
        false_block,
        merge,
    }
}

pub fn while_(cond: Expr, body: Vec<Stmt>, merge: Vec<PhiNode<Expr>>) -> Stmt {
    Stmt::While { cond, body, merge }
}
