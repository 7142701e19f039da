//! Post-inference transforms. Coercion insertion and optimization are
//! implemented elsewhere; the specializer only needs this seam.

use lang_ast::TypedFn;

use crate::Result;

pub trait Pass: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, func: TypedFn) -> Result<TypedFn>;
}

/// Returns the function untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityPass;

impl Pass for IdentityPass {
    fn name(&self) -> &str {
        "identity"
    }

    fn run(&self, func: TypedFn) -> Result<TypedFn> {
        Ok(func)
    }
}
