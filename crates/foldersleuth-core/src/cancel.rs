/// Cooperative cancellation primitive.
///
/// A [`CancelToken`] is owned by the task coordinator. Each submitted
/// operation receives a [`CancelSignal`] observer bound to the token's
/// generation at submission time; `reset()` starts a new generation, so a
/// stale cancellation request left over from a finished operation can
/// never stop a subsequently started one.
///
/// The flag is polled at bounded intervals (after each directory entry,
/// after each copy chunk) and never awaited: neither a filesystem walk nor
/// a buffered copy can be preempted safely mid-write, so every loop body
/// checks the flag and unwinds itself.
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct TokenState {
    generation: AtomicU64,
    cancel_requested: AtomicBool,
}

/// Owner side of the cancellation token.
///
/// Held by exactly one owner (the coordinator); workers only ever see
/// [`CancelSignal`] observers.
#[derive(Debug, Default)]
pub struct CancelToken {
    state: Arc<TokenState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the current generation.
    ///
    /// Relaxed ordering is sufficient: the flag is advisory and polled, so
    /// the worst case is one extra loop iteration before a worker notices.
    pub fn request(&self) {
        self.state.cancel_requested.store(true, Ordering::Relaxed);
    }

    /// Start a new generation: clears any pending request and invalidates
    /// every signal handed out before this call. Returns the observer for
    /// the new generation.
    pub fn reset(&self) -> CancelSignal {
        self.state.cancel_requested.store(false, Ordering::Relaxed);
        let generation = self.state.generation.fetch_add(1, Ordering::Relaxed) + 1;
        CancelSignal {
            state: self.state.clone(),
            generation,
        }
    }
}

/// Read-only cancellation observer held by a running worker.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    state: Arc<TokenState>,
    generation: u64,
}

impl CancelSignal {
    /// True iff cancellation was requested and this signal's generation is
    /// still the token's current one.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancel_requested.load(Ordering::Relaxed)
            && self.state.generation.load(Ordering::Relaxed) == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_signal_is_not_cancelled() {
        let token = CancelToken::new();
        let signal = token.reset();
        assert!(!signal.is_cancelled());
    }

    #[test]
    fn request_is_observed_by_current_signal() {
        let token = CancelToken::new();
        let signal = token.reset();
        token.request();
        assert!(signal.is_cancelled());
    }

    #[test]
    fn reset_invalidates_stale_signals() {
        let token = CancelToken::new();
        let stale = token.reset();
        token.request();
        assert!(stale.is_cancelled());

        // A new generation must neither carry the old request nor let the
        // stale signal observe future requests.
        let fresh = token.reset();
        assert!(!fresh.is_cancelled());
        assert!(!stale.is_cancelled());

        token.request();
        assert!(fresh.is_cancelled());
        assert!(!stale.is_cancelled());
    }

    #[test]
    fn signals_are_cloneable_observers() {
        let token = CancelToken::new();
        let signal = token.reset();
        let clone = signal.clone();
        token.request();
        assert!(signal.is_cancelled());
        assert!(clone.is_cancelled());
    }
}
