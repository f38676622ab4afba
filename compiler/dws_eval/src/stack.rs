//! Native stack growth for nested record instantiation and lambda re-entry.

const RED_ZONE: usize = 100 * 1024;
const SEGMENT: usize = 1024 * 1024;

/// Run `f` on a fresh stack segment when less than `RED_ZONE` bytes remain.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}
