use std::collections::BTreeMap;

use derive_more::Debug;
use smol_str::SmolStr;

use crate::{PromotionPolicy, Ty, TyError};

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("Struct({fields:?})")]
pub struct StructTy {
    pub fields: BTreeMap<SmolStr, Ty>,
}

impl StructTy {
    pub fn from_fields(fields: BTreeMap<SmolStr, Ty>) -> Self {
        Self { fields }
    }

    pub fn field_type(&self, name: &str) -> Option<&Ty> {
        self.fields.get(name)
    }

    pub fn keys(&self) -> std::collections::btree_map::Keys<'_, SmolStr, Ty> {
        self.fields.keys()
    }

    pub fn has_same_fields(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len() && self.keys().eq(other.keys())
    }

    /// Fieldwise join. Callers check `has_same_fields` first.
    pub(crate) fn combine_fields<P: PromotionPolicy + ?Sized>(
        &self,
        other: &Self,
        policy: &P,
    ) -> Result<Self, TyError> {
        let fields = self
            .fields
            .iter()
            .zip(other.fields.values())
            .map(|((name, lhs), rhs)| Ok((name.clone(), lhs.combine_with(rhs, policy)?)))
            .collect::<Result<BTreeMap<_, _>, TyError>>()?;

        Ok(Self { fields })
    }
}

impl<K: Into<SmolStr>> FromIterator<(K, Ty)> for StructTy {
    fn from_iter<T: IntoIterator<Item = (K, Ty)>>(iter: T) -> Self {
        let fields = iter
            .into_iter()
            .map(|(name, ty)| (name.into(), ty))
            .collect();

        Self { fields }
    }
}
