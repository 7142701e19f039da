// ==============================================================================
// Invocation Resolver
// ==============================================================================

use itertools::Itertools;
use lang_ty::{ClosureSet, Ty};

use crate::specialize::{Request, Specializer};
use crate::{InferenceError, Result};

impl Specializer {
    /// Join of the return types of every closure `callee` may stand for, each
    /// specialized for its captured arguments followed by `arg_types`.
    pub(crate) fn invoke_in(&self, req: &mut Request, callee: &Ty, arg_types: &[Ty]) -> Result<Ty> {
        if let Some(hit) = self.memo_lookup(callee, arg_types) {
            return Ok(hit);
        }

        let closures = match callee {
            Ty::Closure(closure) => ClosureSet::new(closure.clone()),
            Ty::ClosureSet(set) => set.clone(),
            other => return Err(InferenceError::InvocationError(other.clone())),
        };

        let mut result = Ty::Unknown;
        for closure in &closures {
            let full_args = closure
                .args
                .iter()
                .chain(arg_types)
                .cloned()
                .collect_vec();
            let typed = self.specialize_in(req, &closure.func, &full_args)?;
            result = result.combine(&typed.return_type)?;
        }

        self.memo_insert(callee, arg_types, result.clone());
        Ok(result)
    }
}
