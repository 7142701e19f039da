use std::collections::BTreeMap;

use lang_ty::{FnId, Ty};
use thiserror::Error;

use crate::{Block, Const, Name, TypedBlock};

// ==============================================================================
// Parameters
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Params {
    pub positional: Vec<Name>,
    pub defaults: BTreeMap<Name, Const>,
    pub varargs: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("missing argument for parameter `{0}`")]
    Missing(Name),

    #[error("expected at most {expected} arguments, got {given}")]
    TooMany { expected: usize, given: usize },
}

/// The result of binding argument types to a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParams {
    /// Every parameter name with its type, varargs last.
    pub bindings: Vec<(Name, Ty)>,
    /// Positional types followed by the element types of the varargs tuple.
    pub input_types: Vec<Ty>,
}

impl Params {
    pub fn new<N: Into<Name>>(positional: impl IntoIterator<Item = N>) -> Self {
        Self {
            positional: positional.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, name: impl Into<Name>, value: impl Into<Const>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    pub fn with_varargs(mut self, name: impl Into<Name>) -> Self {
        self.varargs = Some(name.into());
        self
    }

    /// All names this parameter list binds, varargs last.
    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.positional.iter().chain(self.varargs.iter())
    }

    /// Bind `arg_types` positionally. Missing trailing positions fall back to
    /// the type of their default; surplus types are packed into a tuple for
    /// the varargs slot.
    pub fn bind(&self, arg_types: &[Ty]) -> Result<BoundParams, BindError> {
        let mut bindings = Vec::with_capacity(self.positional.len() + 1);
        let mut input_types = Vec::with_capacity(arg_types.len());

        for (pos, name) in self.positional.iter().enumerate() {
            let ty = match arg_types.get(pos) {
                Some(ty) => ty.clone(),
                None => self
                    .defaults
                    .get(name)
                    .map(Const::ty)
                    .ok_or_else(|| BindError::Missing(name.clone()))?,
            };
            input_types.push(ty.clone());
            bindings.push((name.clone(), ty));
        }

        let extra = arg_types.get(self.positional.len()..).unwrap_or_default();
        match &self.varargs {
            Some(name) => {
                input_types.extend(extra.iter().cloned());
                bindings.push((name.clone(), Ty::tuple(extra.iter().cloned())));
            }
            None if !extra.is_empty() => {
                return Err(BindError::TooMany {
                    expected: self.positional.len(),
                    given: arg_types.len(),
                });
            }
            None => {}
        }

        Ok(BoundParams {
            bindings,
            input_types,
        })
    }

    /// The same parameter list with every name passed through `rename`.
    pub fn rename(&self, mut rename: impl FnMut(&Name) -> Name) -> Params {
        let positional: Vec<Name> = self.positional.iter().map(&mut rename).collect();
        let defaults = self
            .positional
            .iter()
            .zip(&positional)
            .filter_map(|(old, new)| self.defaults.get(old).map(|c| (new.clone(), *c)))
            .collect();
        let varargs = self.varargs.as_ref().map(rename);

        Params {
            positional,
            defaults,
            varargs,
        }
    }
}

// ==============================================================================
// Functions
// ==============================================================================

/// A dynamically typed function, registered once and looked up by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UntypedFn {
    pub name: FnId,
    pub params: Params,
    pub body: Block,
}

impl UntypedFn {
    pub fn new(name: impl Into<FnId>, params: Params, body: Block) -> Self {
        Self {
            name: name.into(),
            params,
            body,
        }
    }
}

/// One monomorphic specialization of an [`UntypedFn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedFn {
    /// Fresh name, unique within the owning specializer.
    pub name: Name,
    pub source: FnId,
    /// Parameters after renaming.
    pub params: Params,
    pub body: TypedBlock,
    pub input_types: Vec<Ty>,
    pub return_type: Ty,
    /// Final type of every specialization-local variable.
    pub type_env: BTreeMap<Name, Ty>,
}
