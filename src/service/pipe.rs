//! Pipe: fold an ordered hook list into one composed service function.

use std::sync::Arc;

use super::hook::{Hook, ServiceFn};

/// Compose `hooks` around `f` with onion nesting:
/// `pipe(&[h1, h2, h3], f)` ≡ `h1(h2(h3(f)))`.
///
/// The first hook's `before` runs first and its `after` runs last; the last
/// hook's `before` runs closest to `f` and its `after` fires first on the way
/// back out. Callers supply hooks in the order they want the before phase to
/// execute.
pub fn pipe(hooks: &[Arc<Hook>], f: ServiceFn) -> ServiceFn {
    hooks
        .iter()
        .rev()
        .fold(f, |next, hook| Arc::clone(hook).wrap_arc(next))
}
