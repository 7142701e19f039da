use std::sync::Arc;

use dashmap::DashMap;
use lang_ast::{helpers, FnId, Name, Params, Prim, TypedFn, UntypedFn};
use lang_ty::Ty;

use crate::{prims, InferenceError, Result};

/// Cache key of one specialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecKey {
    pub func: FnId,
    pub arg_types: Vec<Ty>,
}

impl SpecKey {
    pub fn new(func: FnId, arg_types: &[Ty]) -> Self {
        Self {
            func,
            arg_types: arg_types.to_vec(),
        }
    }
}

/// Untyped definitions and the specializations built from them. Both maps
/// are write-once per key; nothing is ever evicted.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: DashMap<FnId, Arc<UntypedFn>>,
    specializations: DashMap<SpecKey, Arc<TypedFn>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `func` under its name. Registering an identical definition
    /// twice is a no-op; a different definition under a taken name is an
    /// error.
    pub fn register(&self, func: UntypedFn) -> Result<Arc<UntypedFn>> {
        match self.functions.entry(func.name.clone()) {
            dashmap::Entry::Occupied(entry) if **entry.get() == func => Ok(entry.get().clone()),
            dashmap::Entry::Occupied(_) => Err(InferenceError::DuplicateFunction(func.name)),
            dashmap::Entry::Vacant(entry) => {
                log::debug!("registered function {}", func.name);
                Ok(entry.insert(Arc::new(func)).value().clone())
            }
        }
    }

    pub fn lookup(&self, id: &FnId) -> Result<Arc<UntypedFn>> {
        self.functions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| InferenceError::UnknownFunction(id.clone()))
    }

    pub fn contains(&self, id: &FnId) -> bool {
        self.functions.contains_key(id)
    }

    /// Registered function ids in name order.
    pub fn function_ids(&self) -> Vec<FnId> {
        let mut ids: Vec<FnId> = self.functions.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn find_specialization(&self, id: &FnId, arg_types: &[Ty]) -> Option<Arc<TypedFn>> {
        let key = SpecKey::new(id.clone(), arg_types);
        self.specializations
            .get(&key)
            .map(|entry| entry.value().clone())
    }

    /// Insert a finished specialization. If one already exists for the key the
    /// existing entry wins and is returned.
    pub fn add_specialization(&self, key: SpecKey, typed: Arc<TypedFn>) -> Arc<TypedFn> {
        self.specializations.entry(key).or_insert(typed).value().clone()
    }

    pub fn specialization_count(&self) -> usize {
        self.specializations.len()
    }

    /// The function `prim_<name>(x0, .., xn)` that just applies `prim` to its
    /// parameters. Registered on first use.
    pub fn prim_wrapper(&self, prim: Prim) -> Result<FnId> {
        let id = FnId::new(format!("prim_{prim}"));
        if self.contains(&id) {
            return Ok(id);
        }

        let params: Vec<Name> = (0..prims::arity(prim))
            .map(|i| Name::from(format!("x{i}")))
            .collect();
        let body = vec![helpers::ret(helpers::prim(
            prim,
            params.iter().cloned().map(helpers::var),
        ))];

        self.register(UntypedFn::new(id.clone(), Params::new(params), body))?;
        Ok(id)
    }
}
