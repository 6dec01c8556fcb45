//! Layout metrics for observability
//!
//! Counters for encoded lines and for the scratch buffer policy: how often a
//! reentrant call had to allocate its own buffer and how often an oversized
//! buffer was trimmed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for layout observability
///
/// # Example
///
/// ```
/// use logfmt_layout::LayoutMetrics;
///
/// let metrics = LayoutMetrics::new();
/// metrics.record_encoded();
/// metrics.record_reentrant_fallback();
///
/// assert_eq!(metrics.lines_encoded(), 1);
/// assert_eq!(metrics.reentrant_fallbacks(), 1);
/// ```
#[derive(Debug)]
pub struct LayoutMetrics {
    /// Lines produced by `encode`, nested ones included
    lines_encoded: AtomicU64,

    /// Nested calls that could not borrow the thread's scratch buffer
    reentrant_fallbacks: AtomicU64,

    /// Scratch buffers shrunk back to the configured maximum
    buffers_trimmed: AtomicU64,
}

impl LayoutMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            lines_encoded: AtomicU64::new(0),
            reentrant_fallbacks: AtomicU64::new(0),
            buffers_trimmed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn lines_encoded(&self) -> u64 {
        self.lines_encoded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reentrant_fallbacks(&self) -> u64 {
        self.reentrant_fallbacks.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn buffers_trimmed(&self) -> u64 {
        self.buffers_trimmed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_encoded(&self) {
        self.lines_encoded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_reentrant_fallback(&self) {
        self.reentrant_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_trim(&self) {
        self.buffers_trimmed.fetch_add(1, Ordering::Relaxed);
    }

    /// Fallbacks per encoded line
    pub fn fallback_rate(&self) -> f64 {
        let total = self.lines_encoded();
        if total == 0 {
            return 0.0;
        }
        self.reentrant_fallbacks() as f64 / total as f64
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.lines_encoded.store(0, Ordering::Relaxed);
        self.reentrant_fallbacks.store(0, Ordering::Relaxed);
        self.buffers_trimmed.store(0, Ordering::Relaxed);
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_metrics_initial_state() {
        let metrics = LayoutMetrics::new();
        assert_eq!(metrics.lines_encoded(), 0);
        assert_eq!(metrics.reentrant_fallbacks(), 0);
        assert_eq!(metrics.buffers_trimmed(), 0);
        assert_eq!(metrics.fallback_rate(), 0.0);
    }

    #[test]
    fn test_fallback_rate() {
        let metrics = LayoutMetrics::new();
        for _ in 0..4 {
            metrics.record_encoded();
        }
        metrics.record_reentrant_fallback();
        assert!((metrics.fallback_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let metrics = LayoutMetrics::new();
        metrics.record_encoded();
        metrics.record_trim();
        metrics.reset();
        assert_eq!(metrics.lines_encoded(), 0);
        assert_eq!(metrics.buffers_trimmed(), 0);
    }

    #[test]
    fn test_concurrent_recording() {
        let metrics = Arc::new(LayoutMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        m.record_encoded();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.lines_encoded(), 8000);
    }
}
