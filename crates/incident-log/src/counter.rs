use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide monotonic counter for detected injection attempts.
///
/// Cloning is cheap and every clone shares the same underlying value, so a
/// single counter can be handed to any number of concurrently processing
/// requests.  The value only increases and is never reset; constructing a
/// fresh counter (e.g. in tests) is the only way to start from zero.
#[derive(Debug, Clone, Default)]
pub struct AttemptCounter {
    inner: Arc<AtomicU64>,
}

impl AttemptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next attempt number.
    ///
    /// The first call returns 1.  Concurrent callers never observe duplicate
    /// or skipped values.
    pub fn next(&self) -> u64 {
        self.inner.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The number of attempts recorded so far.
    pub fn current(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}
