use std::sync::atomic::{AtomicUsize, Ordering};

use crate::Name;

/// Source of specialization-local names. Each context owns one, so names are
/// unique across all specializations it produces.
#[derive(Debug, Default)]
pub struct NameGen {
    counter: AtomicUsize,
}

impl NameGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// `x` becomes `x.N`, and `x.3` becomes `x.M` rather than `x.3.M`.
    pub fn refresh(&self, name: &str) -> Name {
        let base = strip_suffix(name);
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{base}.{n}").into()
    }
}

fn strip_suffix(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, suffix))
            if !base.is_empty()
                && !suffix.is_empty()
                && suffix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    }
}
