mod closure;
mod combine;
mod rank;
mod scalar;
mod struct_ty;

#[cfg(any(test, feature = "proptest_support"))]
pub mod arbitrary;

use std::fmt;

pub use closure::{ClosureSet, ClosureTy, FnId};
pub use combine::combine_all;
pub use rank::{element_types, lower_ranks, max_rank};
pub use scalar::{NumpyPromotion, PromotionPolicy, ScalarCategory, ScalarTy};
pub use struct_ty::StructTy;

use derive_more::Debug;
use thiserror::Error;

/// The closed set of types the specializer reasons about.
///
/// `Unknown` is the bottom of the lattice; every other variant is a concrete
/// type. Types are joined with [`Ty::combine`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ty {
    #[debug("Unknown")]
    Unknown,

    #[debug("{_0:?}")]
    Scalar(ScalarTy),

    #[debug("{_0:?}")]
    Array(ArrayTy),

    #[debug("Tuple({_0:?})")]
    Tuple(Vec<Ty>),

    #[debug("{_0:?}")]
    Struct(StructTy),

    #[debug("{_0:?}")]
    Closure(ClosureTy),

    #[debug("{_0:?}")]
    ClosureSet(ClosureSet),

    #[debug("{_0:?}")]
    Slice(Box<SliceTy>),

    #[debug("None")]
    None,
}

/// An array of scalars. Always has `rank >= 1`; use [`Ty::array`] to build one
/// so that rank 0 collapses to the scalar itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("Array({elem:?}, {rank})")]
pub struct ArrayTy {
    pub elem: ScalarTy,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("Slice({start:?}, {stop:?}, {step:?})")]
pub struct SliceTy {
    pub start: Ty,
    pub stop: Ty,
    pub step: Ty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TyError {
    #[error("cannot combine {0} with {1}")]
    Conflict(Ty, Ty),

    #[error("cannot lower the rank of {ty} by {by}")]
    LowerRank { ty: Ty, by: usize },

    #[error("cannot raise the rank of {ty} by {by}")]
    RaiseRank { ty: Ty, by: usize },

    #[error("cannot index a value of type {value} with {index}")]
    Index { value: Ty, index: Ty },
}

impl Ty {
    pub const BOOL: Ty = Ty::Scalar(ScalarTy::Bool);
    pub const I32: Ty = Ty::Scalar(ScalarTy::I32);
    pub const I64: Ty = Ty::Scalar(ScalarTy::I64);
    pub const F32: Ty = Ty::Scalar(ScalarTy::F32);
    pub const F64: Ty = Ty::Scalar(ScalarTy::F64);

    /// `elem` raised to `rank`. Rank 0 is the scalar itself.
    pub fn array(elem: ScalarTy, rank: usize) -> Ty {
        if rank == 0 {
            Ty::Scalar(elem)
        } else {
            Ty::Array(ArrayTy { elem, rank })
        }
    }

    pub fn tuple(elems: impl IntoIterator<Item = Ty>) -> Ty {
        Ty::Tuple(elems.into_iter().collect())
    }

    pub fn closure(func: impl Into<FnId>, args: Vec<Ty>) -> Ty {
        Ty::Closure(ClosureTy::new(func, args))
    }

    pub fn slice(start: Ty, stop: Ty, step: Ty) -> Ty {
        Ty::Slice(Box::new(SliceTy { start, stop, step }))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Ty::Unknown)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Ty::Scalar(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Ty::Array(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Ty::Closure(_) | Ty::ClosureSet(_))
    }

    pub fn as_scalar(&self) -> Option<ScalarTy> {
        match self {
            Ty::Scalar(scalar) => Some(*scalar),
            _ => None,
        }
    }
}

impl From<ScalarTy> for Ty {
    fn from(value: ScalarTy) -> Self {
        Ty::Scalar(value)
    }
}

impl From<ArrayTy> for Ty {
    fn from(value: ArrayTy) -> Self {
        Ty::array(value.elem, value.rank)
    }
}

impl From<StructTy> for Ty {
    fn from(value: StructTy) -> Self {
        Ty::Struct(value)
    }
}

impl From<ClosureTy> for Ty {
    fn from(value: ClosureTy) -> Self {
        Ty::Closure(value)
    }
}

// ==============================================================================
// Display
// ==============================================================================
//
// Uses the same surface syntax the signature parser accepts, so a printed
// argument type can be pasted back on the command line.

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Unknown => write!(f, "?"),
            Ty::Scalar(scalar) => write!(f, "{scalar}"),
            Ty::Array(arr) => write!(f, "array<{}, {}>", arr.elem, arr.rank),
            Ty::Tuple(elems) => {
                write!(f, "(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                if elems.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Ty::Struct(struct_ty) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in struct_ty.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                write!(f, "}}")
            }
            Ty::Closure(closure) => fmt_closure(closure, f),
            Ty::ClosureSet(set) => {
                write!(f, "one_of[")?;
                for (i, closure) in set.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    fmt_closure(closure, f)?;
                }
                write!(f, "]")
            }
            Ty::Slice(slice) => write!(f, "slice<{}, {}, {}>", slice.start, slice.stop, slice.step),
            Ty::None => write!(f, "none"),
        }
    }
}

fn fmt_closure(closure: &ClosureTy, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "closure<{}>(", closure.func)?;
    for (i, arg) in closure.args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{arg}")?;
    }
    write!(f, ")")
}

/// Shorthand for writing types in tests and demos.
///
/// ```
/// use lang_ty::{ty, ScalarTy, Ty};
/// assert_eq!(ty!([f64; 2]), Ty::array(ScalarTy::F64, 2));
/// assert_eq!(ty!((i64, none)), Ty::tuple([Ty::I64, Ty::None]));
/// ```
#[macro_export]
macro_rules! ty {
    (@scalar bool) => { $crate::ScalarTy::Bool };
    (@scalar i8) => { $crate::ScalarTy::I8 };
    (@scalar i16) => { $crate::ScalarTy::I16 };
    (@scalar i32) => { $crate::ScalarTy::I32 };
    (@scalar i64) => { $crate::ScalarTy::I64 };
    (@scalar u8) => { $crate::ScalarTy::U8 };
    (@scalar u16) => { $crate::ScalarTy::U16 };
    (@scalar u32) => { $crate::ScalarTy::U32 };
    (@scalar u64) => { $crate::ScalarTy::U64 };
    (@scalar f32) => { $crate::ScalarTy::F32 };
    (@scalar f64) => { $crate::ScalarTy::F64 };

    (?) => { $crate::Ty::Unknown };
    (none) => { $crate::Ty::None };

    // -- Arrays: [elem; rank] ----------------------------------------------
    ([$elem:ident ; $rank:expr]) => {
        $crate::Ty::array($crate::ty!(@scalar $elem), $rank)
    };

    // -- Tuples: (a, b, ...) ------------------------------------------------
    (( $($inner:tt),* $(,)? )) => {
        $crate::Ty::Tuple(vec![$($crate::ty!($inner)),*])
    };

    // -- Structs: { field: ty, ... } ----------------------------------------
    ({ $($key:ident : $val:tt),* $(,)? }) => {
        $crate::Ty::Struct(
            [$((stringify!($key), $crate::ty!($val))),*]
                .into_iter()
                .collect::<$crate::StructTy>(),
        )
    };

    ($scalar:ident) => {
        $crate::Ty::Scalar($crate::ty!(@scalar $scalar))
    };
}
