use std::collections::BTreeMap;

use lang_ast::Name;
use lang_ty::Ty;
use rustc_hash::FxHashMap;

use crate::Result;

/// Types of specialization-local variables. Entries only ever move up the
/// lattice: every write goes through [`Ty::combine`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TyEnv {
    types: FxHashMap<Name, Ty>,
}

impl TyEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound type of `name`. `Unknown` counts as unbound.
    pub fn get(&self, name: &str) -> Option<&Ty> {
        self.types.get(name).filter(|ty| !ty.is_unknown())
    }

    /// Join `ty` into the current type of `name` and return the result.
    pub fn widen(&mut self, name: &Name, ty: &Ty) -> Result<Ty> {
        let widened = match self.types.get(name) {
            Some(prev) => prev.combine(ty)?,
            None => ty.clone(),
        };
        self.types.insert(name.clone(), widened.clone());
        Ok(widened)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when every name bound in `earlier` still has the same type here.
    /// Names bound since then are ignored.
    pub fn extends(&self, earlier: &TyEnv) -> bool {
        earlier
            .types
            .iter()
            .all(|(name, ty)| self.types.get(name) == Some(ty))
    }

    pub fn into_sorted(self) -> BTreeMap<Name, Ty> {
        self.types.into_iter().collect()
    }
}
