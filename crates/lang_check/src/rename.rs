use lang_ast::{Name, NameGen};
use rustc_hash::FxHashMap;

/// Source names to specialization-local names. One per specialization, so the
/// same source function can be specialized many times without clashes.
#[derive(Debug, Clone, Default)]
pub(crate) struct VarMap {
    vars: FxHashMap<Name, Name>,
}

impl VarMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always allocate a new local name for `name`, shadowing any earlier one.
    pub fn rename(&mut self, names: &NameGen, name: &Name) -> Name {
        let fresh = names.refresh(name);
        self.vars.insert(name.clone(), fresh.clone());
        fresh
    }

    /// The local name of `name`, allocating one on first sight. Used for
    /// assignment targets so that repeated passes over a loop body bind the
    /// same local.
    pub fn bind(&mut self, names: &NameGen, name: &Name) -> Name {
        match self.vars.get(name) {
            Some(local) => local.clone(),
            None => self.rename(names, name),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Name> {
        self.vars.get(name)
    }
}
