use crate::{ArrayTy, ScalarTy, Ty, TyError};

// ==============================================================================
// Rank arithmetic
// ==============================================================================

impl Ty {
    /// Number of array dimensions. Everything that is not an array has rank 0.
    pub fn rank(&self) -> usize {
        match self {
            Ty::Array(arr) => arr.rank,
            _ => 0,
        }
    }

    /// The element type of an array. Any other type is returned unchanged.
    pub fn element_type(&self) -> Ty {
        match self {
            Ty::Array(arr) => Ty::Scalar(arr.elem),
            _ => self.clone(),
        }
    }

    /// Wrap the type in `by` more array dimensions.
    pub fn increase_rank(&self, by: usize) -> Result<Ty, TyError> {
        if by == 0 {
            return Ok(self.clone());
        }

        match self {
            Ty::Scalar(elem) => Ok(Ty::array(*elem, by)),
            Ty::Array(arr) => Ok(Ty::array(arr.elem, arr.rank + by)),
            _ => Err(TyError::RaiseRank {
                ty: self.clone(),
                by,
            }),
        }
    }

    /// Strip `by` outer array dimensions. Scalars are left alone so that a
    /// scalar argument broadcasts against arrays.
    pub fn lower_rank(&self, by: usize) -> Result<Ty, TyError> {
        if by == 0 {
            return Ok(self.clone());
        }

        match self {
            Ty::Scalar(_) => Ok(self.clone()),
            Ty::Array(arr) if arr.rank >= by => Ok(Ty::array(arr.elem, arr.rank - by)),
            _ => Err(TyError::LowerRank {
                ty: self.clone(),
                by,
            }),
        }
    }

    /// Result type of `self[index]`.
    ///
    /// - an integer or bool scalar drops one dimension
    /// - a slice keeps every dimension
    /// - a tuple of such scalars and slices drops one dimension per scalar
    /// - an integer array of rank `m` (gather) gives rank `r - 1 + m`
    pub fn index_type(&self, index: &Ty) -> Result<Ty, TyError> {
        let index_err = || TyError::Index {
            value: self.clone(),
            index: index.clone(),
        };

        let Ty::Array(ArrayTy { elem, rank }) = self else {
            return Err(index_err());
        };

        let scalar_index = |scalar: &ScalarTy| scalar.is_integer() || scalar.is_bool();

        match index {
            Ty::Scalar(scalar) if scalar_index(scalar) => Ok(Ty::array(*elem, rank - 1)),
            Ty::Slice(_) => Ok(self.clone()),
            Ty::Tuple(parts) if parts.len() <= *rank => {
                let mut dropped = 0;
                for part in parts {
                    match part {
                        Ty::Scalar(scalar) if scalar_index(scalar) => dropped += 1,
                        Ty::Slice(_) => {}
                        _ => return Err(index_err()),
                    }
                }
                Ok(Ty::array(*elem, rank - dropped))
            }
            Ty::Array(ArrayTy {
                elem: idx_elem,
                rank: idx_rank,
            }) if idx_elem.is_integer() => Ok(Ty::array(*elem, rank - 1 + idx_rank)),
            _ => Err(index_err()),
        }
    }
}

/// Highest rank among `tys`, 0 when empty.
pub fn max_rank<'a>(tys: impl IntoIterator<Item = &'a Ty>) -> usize {
    tys.into_iter().map(Ty::rank).max().unwrap_or(0)
}

/// Lower every type in `tys` by `by`. Scalars pass through unchanged.
pub fn lower_ranks(tys: &[Ty], by: usize) -> Result<Vec<Ty>, TyError> {
    tys.iter().map(|ty| ty.lower_rank(by)).collect()
}

/// Element type of every type in `tys`.
pub fn element_types(tys: &[Ty]) -> Vec<Ty> {
    tys.iter().map(Ty::element_type).collect()
}
