use crate::{ClosureSet, NumpyPromotion, PromotionPolicy, SliceTy, Ty, TyError};

// ==============================================================================
// Lattice join
// ==============================================================================

impl Ty {
    /// Least upper bound of two types under numpy style scalar promotion.
    pub fn combine(&self, other: &Ty) -> Result<Ty, TyError> {
        self.combine_with(other, &NumpyPromotion)
    }

    /// Least upper bound of two types. `Unknown` is the identity; scalar joins
    /// are delegated to `policy`.
    pub fn combine_with<P: PromotionPolicy + ?Sized>(
        &self,
        other: &Ty,
        policy: &P,
    ) -> Result<Ty, TyError> {
        if self == other {
            return Ok(self.clone());
        }

        let conflict = || TyError::Conflict(self.clone(), other.clone());

        match (self, other) {
            (Ty::Unknown, _) => Ok(other.clone()),
            (_, Ty::Unknown) => Ok(self.clone()),

            (Ty::Scalar(lhs), Ty::Scalar(rhs)) => Ok(Ty::Scalar(policy.join(*lhs, *rhs))),

            (Ty::Array(lhs), Ty::Array(rhs)) if lhs.rank == rhs.rank => {
                Ok(Ty::array(policy.join(lhs.elem, rhs.elem), lhs.rank))
            }

            (Ty::Tuple(lhs), Ty::Tuple(rhs)) if lhs.len() == rhs.len() => lhs
                .iter()
                .zip(rhs)
                .map(|(l, r)| l.combine_with(r, policy))
                .collect::<Result<Vec<_>, _>>()
                .map(Ty::Tuple),

            (Ty::Struct(lhs), Ty::Struct(rhs)) if lhs.has_same_fields(rhs) => {
                lhs.combine_fields(rhs, policy).map(Ty::Struct)
            }

            (Ty::Slice(lhs), Ty::Slice(rhs)) => Ok(Ty::Slice(Box::new(SliceTy {
                start: lhs.start.combine_with(&rhs.start, policy)?,
                stop: lhs.stop.combine_with(&rhs.stop, policy)?,
                step: lhs.step.combine_with(&rhs.step, policy)?,
            }))),

            // Distinct closures widen into a dispatch set.
            (Ty::Closure(lhs), Ty::Closure(rhs)) => {
                let mut set = ClosureSet::new(lhs.clone());
                set.insert(rhs.clone());
                Ok(Ty::ClosureSet(set))
            }
            (Ty::Closure(closure), Ty::ClosureSet(set))
            | (Ty::ClosureSet(set), Ty::Closure(closure)) => {
                let mut set = set.clone();
                set.insert(closure.clone());
                Ok(Ty::ClosureSet(set))
            }
            (Ty::ClosureSet(lhs), Ty::ClosureSet(rhs)) => Ok(Ty::ClosureSet(lhs.union_with(rhs))),

            _ => Err(conflict()),
        }
    }
}

/// Left fold of [`Ty::combine`] starting from `Unknown`. An empty input gives
/// `Unknown`.
pub fn combine_all<'a>(tys: impl IntoIterator<Item = &'a Ty>) -> Result<Ty, TyError> {
    tys.into_iter()
        .try_fold(Ty::Unknown, |acc, ty| acc.combine(ty))
}
