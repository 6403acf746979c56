//! Cooperative cancellation flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single shared cancellation cell with atomic test-and-clear semantics.
///
/// The user-facing surface sets the flag at any time; the streaming call
/// engine polls it after each delivered chunk and the pipeline controllers
/// poll it between stages and between reflection rounds. Observing the
/// flag clears it, so subsequent stages are not pre-emptively aborted.
///
/// Cancellation never raises an error: it is a normal termination path
/// that preserves partial output.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the current stream.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Observe without clearing.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Atomically observe and clear. Returns whether the flag was set.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_clears_flag() {
        let flag = CancelFlag::new();
        assert!(!flag.take());

        flag.set();
        assert!(flag.is_set());
        assert!(flag.take());
        assert!(!flag.is_set());
        assert!(!flag.take());
    }

    #[test]
    fn test_clones_share_state() {
        let flag = CancelFlag::new();
        let other = flag.clone();

        other.set();
        assert!(flag.take());
        assert!(!other.is_set());
    }
}
