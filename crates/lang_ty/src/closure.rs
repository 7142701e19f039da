use std::collections::BTreeSet;

use derive_more::{Debug, Display, From};
use smol_str::SmolStr;

use crate::Ty;

/// Identity of an untyped function. Functions are registered under their name.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, From)]
#[debug("{_0}")]
#[display("{_0}")]
pub struct FnId(SmolStr);

impl FnId {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        FnId(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for FnId {
    fn from(value: &str) -> Self {
        FnId(value.into())
    }
}

/// A function together with the types of its already bound leading arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("Closure({func:?}, {args:?})")]
pub struct ClosureTy {
    pub func: FnId,
    pub args: Vec<Ty>,
}

impl ClosureTy {
    pub fn new(func: impl Into<FnId>, args: Vec<Ty>) -> Self {
        Self {
            func: func.into(),
            args,
        }
    }
}

/// The closures a call site may dispatch to. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("ClosureSet({set:?})")]
pub struct ClosureSet {
    set: BTreeSet<ClosureTy>,
}

impl ClosureSet {
    pub fn new(first: ClosureTy) -> Self {
        Self {
            set: BTreeSet::from([first]),
        }
    }

    /// Returns `None` for an empty iterator.
    pub fn from_closures(closures: impl IntoIterator<Item = ClosureTy>) -> Option<Self> {
        let set: BTreeSet<ClosureTy> = closures.into_iter().collect();
        if set.is_empty() {
            None
        } else {
            Some(Self { set })
        }
    }

    pub fn insert(&mut self, closure: ClosureTy) -> bool {
        self.set.insert(closure)
    }

    pub fn union_with(&self, other: &Self) -> Self {
        let set = &self.set | &other.set;

        Self { set }
    }

    pub fn contains(&self, closure: &ClosureTy) -> bool {
        self.set.contains(closure)
    }

    pub fn iter(&self) -> std::collections::btree_set::Iter<'_, ClosureTy> {
        self.set.iter()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    // always false, kept for clippy's len_without_is_empty
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl From<ClosureTy> for ClosureSet {
    fn from(value: ClosureTy) -> Self {
        ClosureSet::new(value)
    }
}

impl<'a> IntoIterator for &'a ClosureSet {
    type Item = &'a ClosureTy;
    type IntoIter = std::collections::btree_set::Iter<'a, ClosureTy>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
