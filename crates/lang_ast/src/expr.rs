use derive_more::Debug;
use lang_ty::{FnId, Ty};
use ordered_float::OrderedFloat;

use crate::{Name, Prim};

// ==============================================================================
// Constants
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Const {
    #[debug("{_0}")]
    Bool(bool),
    #[debug("{_0}")]
    Int(i64),
    #[debug("{_0}")]
    Float(OrderedFloat<f64>),
    #[debug("None")]
    None,
}

impl Const {
    pub fn ty(&self) -> Ty {
        match self {
            Const::Bool(_) => Ty::BOOL,
            Const::Int(_) => Ty::I64,
            Const::Float(_) => Ty::F64,
            Const::None => Ty::None,
        }
    }
}

impl From<bool> for Const {
    fn from(value: bool) -> Self {
        Const::Bool(value)
    }
}

impl From<i64> for Const {
    fn from(value: i64) -> Self {
        Const::Int(value)
    }
}

impl From<f64> for Const {
    fn from(value: f64) -> Self {
        Const::Float(OrderedFloat(value))
    }
}

// ==============================================================================
// Untyped expressions
// ==============================================================================

/// The untyped expression tree handed to the specializer. Every node owns its
/// children; variables are the only references and are resolved by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    #[debug("Var({_0})")]
    Var(Name),

    #[debug("{_0:?}")]
    Const(Const),

    Tuple(Vec<Expr>),

    /// Array literal. Element types are joined and raised by one rank.
    Array(Vec<Expr>),

    Index {
        value: Box<Expr>,
        index: Box<Expr>,
    },

    Slice {
        start: Box<Expr>,
        stop: Box<Expr>,
        step: Box<Expr>,
    },

    Attribute {
        value: Box<Expr>,
        name: Name,
    },

    PrimCall {
        prim: Prim,
        args: Vec<Expr>,
    },

    /// Partial application of a registered function to leading arguments.
    Closure {
        func: FnId,
        args: Vec<Expr>,
    },

    Invoke {
        closure: Box<Expr>,
        args: Vec<Expr>,
    },

    Map {
        func: Box<Expr>,
        args: Vec<Expr>,
        axis: Option<Box<Expr>>,
    },

    Reduce {
        func: Box<Expr>,
        args: Vec<Expr>,
        axis: Option<Box<Expr>>,
        init: Option<Box<Expr>>,
        combine: Option<Box<Expr>>,
    },

    Scan {
        func: Box<Expr>,
        args: Vec<Expr>,
        axis: Option<Box<Expr>>,
        init: Option<Box<Expr>>,
        combine: Option<Box<Expr>>,
    },

    AllPairs {
        func: Box<Expr>,
        args: Vec<Expr>,
        axis: Option<Box<Expr>>,
    },
}

impl From<Const> for Expr {
    fn from(value: Const) -> Self {
        Expr::Const(value)
    }
}

// ==============================================================================
// Statements
// ==============================================================================

pub type Block = Vec<Stmt>;

/// A control-flow merge. `left` is the value on the first incoming edge (the
/// true branch of an `If`, the loop entry of a `While`), `right` the value on
/// the second (the false branch, the end of the loop body).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhiNode<E> {
    pub var: Name,
    pub left: E,
    pub right: E,
}

pub type PhiNodes<E> = Vec<PhiNode<E>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stmt {
    Assign {
        lhs: Expr,
        rhs: Expr,
    },

    If {
        cond: Expr,
        true_block: Block,
        false_block: Block,
        merge: PhiNodes<Expr>,
    },

    While {
        cond: Expr,
        body: Block,
        merge: PhiNodes<Expr>,
    },

    Return(Expr),
}
