//! Per-thread scratch buffers
//!
//! Each thread keeps one reusable `String`. A call borrows it exclusively for
//! its duration; a call that nests inside another on the same thread (an
//! error description or resolver that logs while being encoded) finds the
//! buffer taken and gets a fresh one instead.

use crate::core::LayoutMetrics;
use std::cell::RefCell;
use std::sync::Arc;

/// Initial capacity of a scratch buffer
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Capacity a buffer is trimmed back to after use
pub const DEFAULT_MAX_CAPACITY: usize = 2 * 1024;

thread_local! {
    static SCRATCH: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Lends per-thread scratch buffers to encoding calls
#[derive(Debug, Clone)]
pub struct ScratchPool {
    initial_capacity: usize,
    max_capacity: usize,
    metrics: Arc<LayoutMetrics>,
}

impl ScratchPool {
    pub fn new(initial_capacity: usize, max_capacity: usize, metrics: Arc<LayoutMetrics>) -> Self {
        Self {
            initial_capacity,
            max_capacity: max_capacity.max(initial_capacity),
            metrics,
        }
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Run `f` with an empty buffer owned exclusively for the call
    ///
    /// The pooled buffer is cleared and, if it grew past the maximum,
    /// shrunk before it returns to the thread. A nested call on the same
    /// thread gets a freshly allocated buffer instead.
    pub fn with_buffer<R>(&self, f: impl FnOnce(&mut String) -> R) -> R {
        // During thread teardown the slot may already be gone
        let available = SCRATCH
            .try_with(|cell| cell.try_borrow_mut().is_ok())
            .unwrap_or(false);

        if !available {
            self.metrics.record_reentrant_fallback();
            let mut fresh = String::with_capacity(self.initial_capacity);
            return f(&mut fresh);
        }

        SCRATCH.with(|cell| {
            let mut buf = cell.borrow_mut();
            // A panic inside `f` skips `release` and leaves a partial line behind
            buf.clear();
            if buf.capacity() < self.initial_capacity {
                buf.reserve(self.initial_capacity);
            }
            let result = f(&mut *buf);
            self.release(&mut *buf);
            result
        })
    }

    fn release(&self, buf: &mut String) {
        buf.clear();
        if buf.capacity() > self.max_capacity {
            buf.shrink_to(self.max_capacity);
            self.metrics.record_trim();
        }
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new(
            DEFAULT_INITIAL_CAPACITY,
            DEFAULT_MAX_CAPACITY,
            Arc::new(LayoutMetrics::new()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> (ScratchPool, Arc<LayoutMetrics>) {
        let metrics = Arc::new(LayoutMetrics::new());
        (ScratchPool::new(64, 128, Arc::clone(&metrics)), metrics)
    }

    #[test]
    fn test_buffer_starts_empty() {
        let (pool, _) = pool();
        pool.with_buffer(|buf| buf.push_str("leftover"));
        pool.with_buffer(|buf| assert!(buf.is_empty()));
    }

    #[test]
    fn test_buffer_reused_on_same_thread() {
        let (pool, metrics) = pool();
        let first = pool.with_buffer(|buf| buf.as_ptr() as usize);
        let second = pool.with_buffer(|buf| buf.as_ptr() as usize);
        assert_eq!(first, second);
        assert_eq!(metrics.reentrant_fallbacks(), 0);
    }

    #[test]
    fn test_buffer_clean_after_panic() {
        let (pool, metrics) = pool();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pool.with_buffer(|buf| {
                buf.push_str("partial");
                panic!("encoding failed");
            })
        }));
        assert!(result.is_err());

        let seen = pool.with_buffer(|buf| buf.clone());
        assert!(seen.is_empty());
        assert_eq!(metrics.reentrant_fallbacks(), 0);
    }

    #[test]
    fn test_nested_call_gets_fresh_buffer() {
        let (pool, metrics) = pool();
        let outer = pool.with_buffer(|outer| {
            outer.push_str("outer-start ");
            let inner = pool.with_buffer(|inner| {
                assert!(inner.is_empty());
                inner.push_str("inner");
                inner.clone()
            });
            outer.push_str("outer-end");
            (outer.clone(), inner)
        });

        assert_eq!(outer.0, "outer-start outer-end");
        assert_eq!(outer.1, "inner");
        assert_eq!(metrics.reentrant_fallbacks(), 1);
    }

    #[test]
    fn test_oversized_buffer_trimmed() {
        let (pool, metrics) = pool();
        pool.with_buffer(|buf| buf.push_str(&"x".repeat(10_000)));
        let capacity = pool.with_buffer(|buf| buf.capacity());
        assert!(capacity <= 10_000);
        assert!(capacity >= 64);
        assert_eq!(metrics.buffers_trimmed(), 1);
    }

    #[test]
    fn test_max_capacity_not_below_initial() {
        let pool = ScratchPool::new(512, 16, Arc::new(LayoutMetrics::new()));
        assert_eq!(pool.max_capacity(), 512);
    }

    #[test]
    fn test_threads_use_separate_buffers() {
        let (pool, metrics) = pool();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    pool.with_buffer(|buf| {
                        buf.push_str(&i.to_string());
                        buf.clone()
                    })
                })
            })
            .collect();

        let mut results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.sort();
        assert_eq!(results, vec!["0", "1", "2", "3"]);
        assert_eq!(metrics.reentrant_fallbacks(), 0);
    }
}
