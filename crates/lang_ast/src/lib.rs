mod expr;
mod func;
pub mod helpers;
mod names;
mod pretty;
mod prim;
mod typed;

#[cfg(any(test, feature = "proptest_support"))]
pub mod arbitrary;

pub use expr::{Block, Const, Expr, PhiNode, PhiNodes, Stmt};
pub use func::{BindError, BoundParams, Params, TypedFn, UntypedFn};
pub use names::NameGen;
pub use prim::Prim;
pub use typed::{TypedBlock, TypedExpr, TypedExprKind, TypedStmt};

pub use lang_ty::FnId;

/// A variable name, either as written in the source or after renaming.
pub type Name = smol_str::SmolStr;
