mod adverbs;
mod env;
mod infer_expr;
mod infer_stmt;
mod invoke;
pub mod passes;
pub mod prims;
mod registry;
mod rename;
mod specialize;

#[cfg(test)]
mod tests;

#[cfg(test)]
mod pbt;

use derive_more::Debug;
use lang_ast::{BindError, FnId, Name};
use lang_ty::{Ty, TyError};
use thiserror::Error;

pub use passes::{IdentityPass, Pass};
pub use registry::{FunctionRegistry, SpecKey};
pub use specialize::{FnRef, SpecializeStats, Specializer};

pub type Result<T, E = InferenceError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// A closure was expected at an invocation site.
    #[error("expected a closure to invoke, found {0}")]
    InferenceFailed(Ty),

    #[error("name not found: {0}")]
    NameNotFound(Name),

    #[error("type conflict: cannot combine {0} with {1}")]
    TypeConflict(Ty, Ty),

    #[error("shape error: {0}")]
    ShapeError(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// The resolver was handed something that is neither a closure nor a
    /// closure set.
    #[error("cannot resolve an invocation of {0}")]
    InvocationError(Ty),

    #[error("unknown function: {0}")]
    UnknownFunction(FnId),

    #[error("a different function is already registered as {0}")]
    DuplicateFunction(FnId),

    #[error("recursive specialization of {func} for ({})", itertools::join(.arg_types, ", "))]
    RecursiveSpecialization { func: FnId, arg_types: Vec<Ty> },
}

impl InferenceError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        InferenceError::ShapeError(msg.into())
    }

    pub(crate) fn not_implemented(msg: impl Into<String>) -> Self {
        InferenceError::NotImplemented(msg.into())
    }
}

impl From<TyError> for InferenceError {
    fn from(err: TyError) -> Self {
        match err {
            TyError::Conflict(lhs, rhs) => InferenceError::TypeConflict(lhs, rhs),
            other => InferenceError::ShapeError(other.to_string()),
        }
    }
}

impl From<BindError> for InferenceError {
    fn from(err: BindError) -> Self {
        InferenceError::ShapeError(err.to_string())
    }
}

/// Knobs for a [`Specializer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Passes over a `while` body before giving up on a stable environment.
    pub max_loop_iterations: usize,
    /// Deepest chain of nested specializations a single request may build.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_loop_iterations: 32,
            max_depth: 256,
        }
    }
}
