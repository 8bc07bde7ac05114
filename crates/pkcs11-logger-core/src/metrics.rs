//! Atomic counters for proxy observability.
//!
//! Relaxed ordering throughout: the counters are diagnostic, nothing
//! synchronizes on them.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Per-proxy operation counters.
#[derive(Debug)]
pub struct ProxyMetrics {
    /// Calls that reached a shim.
    pub calls: AtomicU64,
    /// Calls that were forwarded to the real module.
    pub forwarded: AtomicU64,
    /// Loader attempts that failed.
    pub init_failures: AtomicU64,
    /// Calls answered with `CKR_FUNCTION_NOT_SUPPORTED` for a missing entry.
    pub unsupported_calls: AtomicU64,
    /// Record writes a destination failed to take.
    pub sink_write_failures: AtomicU64,
    /// Values replaced by the redaction marker.
    pub redactions: AtomicU64,
}

impl ProxyMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
            forwarded: AtomicU64::new(0),
            init_failures: AtomicU64::new(0),
            unsupported_calls: AtomicU64::new(0),
            sink_write_failures: AtomicU64::new(0),
            redactions: AtomicU64::new(0),
        }
    }

    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, amount: u64) {
        if amount != 0 {
            counter.fetch_add(amount, Ordering::Relaxed);
        }
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls: Self::get(&self.calls),
            forwarded: Self::get(&self.forwarded),
            init_failures: Self::get(&self.init_failures),
            unsupported_calls: Self::get(&self.unsupported_calls),
            sink_write_failures: Self::get(&self.sink_write_failures),
            redactions: Self::get(&self.redactions),
        }
    }
}

impl Default for ProxyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ProxyMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub calls: u64,
    pub forwarded: u64,
    pub init_failures: u64,
    pub unsupported_calls: u64,
    pub sink_write_failures: u64,
    pub redactions: u64,
}
