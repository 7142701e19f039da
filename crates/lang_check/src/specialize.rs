// ==============================================================================
// Specialization Driver
// ==============================================================================
//
// Owns every cache and counter. Hits are served lock-free from the registry;
// a miss takes the build lock for the whole top-level request, so two threads
// asking for the same signature never both build it. Nested requests made
// while annotating reuse the holder's `Request` instead of locking again.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use itertools::Itertools;
use lang_ast::{FnId, NameGen, TypedFn, UntypedFn};
use lang_ty::Ty;

use crate::infer_expr::FnAnnotator;
use crate::passes::{IdentityPass, Pass};
use crate::registry::{FunctionRegistry, SpecKey};
use crate::{Config, InferenceError, Result};

/// A function to specialize, by id or by definition. A definition is
/// registered first if its id is new.
#[derive(Debug, Clone)]
pub enum FnRef {
    Id(FnId),
    Def(UntypedFn),
}

impl From<FnId> for FnRef {
    fn from(value: FnId) -> Self {
        FnRef::Id(value)
    }
}

impl From<&FnId> for FnRef {
    fn from(value: &FnId) -> Self {
        FnRef::Id(value.clone())
    }
}

impl From<&str> for FnRef {
    fn from(value: &str) -> Self {
        FnRef::Id(value.into())
    }
}

impl From<UntypedFn> for FnRef {
    fn from(value: UntypedFn) -> Self {
        FnRef::Def(value)
    }
}

/// Snapshot of the driver's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecializeStats {
    /// Function bodies annotated, successful or not.
    pub inferences: usize,
    pub cache_hits: usize,
    pub memo_hits: usize,
}

#[derive(Debug, Default)]
struct Counters {
    inferences: AtomicUsize,
    cache_hits: AtomicUsize,
    memo_hits: AtomicUsize,
}

/// The specializations currently being built on behalf of one top-level
/// request, innermost last.
#[derive(Debug, Default)]
pub(crate) struct Request {
    stack: Vec<SpecKey>,
}

pub struct Specializer {
    registry: FunctionRegistry,
    names: NameGen,
    memo: DashMap<(Ty, Vec<Ty>), Ty>,
    coercion: Box<dyn Pass>,
    optimizer: Box<dyn Pass>,
    config: Config,
    build_lock: Mutex<()>,
    counters: Counters,
}

impl Default for Specializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Specializer {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            registry: FunctionRegistry::new(),
            names: NameGen::new(),
            memo: DashMap::new(),
            coercion: Box::new(IdentityPass),
            optimizer: Box::new(IdentityPass),
            config,
            build_lock: Mutex::new(()),
            counters: Counters::default(),
        }
    }

    /// Replace the passes run over every freshly annotated function.
    pub fn with_passes(mut self, coercion: Box<dyn Pass>, optimizer: Box<dyn Pass>) -> Self {
        self.coercion = coercion;
        self.optimizer = optimizer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub(crate) fn names(&self) -> &NameGen {
        &self.names
    }

    pub fn register(&self, func: UntypedFn) -> Result<Arc<UntypedFn>> {
        self.registry.register(func)
    }

    pub fn stats(&self) -> SpecializeStats {
        SpecializeStats {
            inferences: self.counters.inferences.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            memo_hits: self.counters.memo_hits.load(Ordering::Relaxed),
        }
    }

    /// The typed version of `func` for `arg_types`, built on first request
    /// and served from the cache afterwards.
    pub fn specialize(&self, func: impl Into<FnRef>, arg_types: &[Ty]) -> Result<Arc<TypedFn>> {
        let id = self.resolve(func.into())?;

        if let Some(hit) = self.cached(&id, arg_types) {
            return Ok(hit);
        }

        let _guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // another thread may have finished this signature while we waited
        if let Some(hit) = self.cached(&id, arg_types) {
            return Ok(hit);
        }

        self.specialize_in(&mut Request::default(), &id, arg_types)
    }

    pub fn infer_return_type(&self, func: impl Into<FnRef>, arg_types: &[Ty]) -> Result<Ty> {
        Ok(self.specialize(func, arg_types)?.return_type.clone())
    }

    /// Result type of calling `callee` (a closure or closure set) with
    /// `arg_types`.
    pub fn invocation_result_type(&self, callee: &Ty, arg_types: &[Ty]) -> Result<Ty> {
        if let Some(hit) = self.memo_lookup(callee, arg_types) {
            return Ok(hit);
        }

        let _guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.invoke_in(&mut Request::default(), callee, arg_types)
    }

    fn resolve(&self, func: FnRef) -> Result<FnId> {
        match func {
            FnRef::Id(id) => {
                if !self.registry.contains(&id) {
                    return Err(InferenceError::UnknownFunction(id));
                }
                Ok(id)
            }
            FnRef::Def(def) => Ok(self.registry.register(def)?.name.clone()),
        }
    }

    fn cached(&self, id: &FnId, arg_types: &[Ty]) -> Option<Arc<TypedFn>> {
        let hit = self.registry.find_specialization(id, arg_types)?;
        self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
        log::debug!("cache hit: {id}({})", arg_types.iter().join(", "));
        Some(hit)
    }

    pub(crate) fn memo_lookup(&self, callee: &Ty, arg_types: &[Ty]) -> Option<Ty> {
        let hit = self
            .memo
            .get(&(callee.clone(), arg_types.to_vec()))
            .map(|entry| entry.value().clone())?;
        self.counters.memo_hits.fetch_add(1, Ordering::Relaxed);
        Some(hit)
    }

    pub(crate) fn memo_insert(&self, callee: &Ty, arg_types: &[Ty], result: Ty) {
        self.memo.insert((callee.clone(), arg_types.to_vec()), result);
    }

    /// Specialize within an in-flight request. The caller holds the build
    /// lock.
    pub(crate) fn specialize_in(
        &self,
        req: &mut Request,
        id: &FnId,
        arg_types: &[Ty],
    ) -> Result<Arc<TypedFn>> {
        if let Some(hit) = self.cached(id, arg_types) {
            return Ok(hit);
        }

        let key = SpecKey::new(id.clone(), arg_types);
        if req.stack.contains(&key) || req.stack.len() >= self.config.max_depth {
            return Err(InferenceError::RecursiveSpecialization {
                func: key.func,
                arg_types: key.arg_types,
            });
        }

        let untyped = self.registry.lookup(id)?;
        log::debug!("cache miss: {id}({})", arg_types.iter().join(", "));

        req.stack.push(key.clone());
        let built = self.build(req, &untyped, arg_types);
        req.stack.pop();

        let typed = built.map_err(|err| {
            log::debug!("failed to specialize {id}: {err}");
            err
        })?;

        Ok(self.registry.add_specialization(key, Arc::new(typed)))
    }

    fn build(&self, req: &mut Request, untyped: &UntypedFn, arg_types: &[Ty]) -> Result<TypedFn> {
        self.counters.inferences.fetch_add(1, Ordering::Relaxed);

        let mut typed = FnAnnotator::new(self, req).annotate_fn(untyped, arg_types)?;
        for pass in [&self.coercion, &self.optimizer] {
            log::trace!("running {} pass on {}", pass.name(), typed.name);
            typed = pass.run(typed)?;
        }

        log::debug!(
            "built {} from {} -> {}",
            typed.name,
            untyped.name,
            typed.return_type
        );
        Ok(typed)
    }
}
