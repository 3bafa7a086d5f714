//! Buffer pool statistics for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for buffer pool operations.
///
/// Counters are updated with relaxed atomics; readers see a consistent
/// enough picture for monitoring and for the write-count assertions in
/// the test suite, not a point-in-time snapshot.
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Total page lookups (`fetch_page` calls).
    accesses: AtomicU64,
    /// Lookups satisfied from a resident frame.
    hits: AtomicU64,
    /// Lookups that had to go to disk.
    misses: AtomicU64,
    /// Frames reclaimed through the replacer.
    evictions: AtomicU64,
    /// Pages read from the disk manager.
    disk_reads: AtomicU64,
    /// Pages written to the disk manager.
    disk_writes: AtomicU64,
}

impl PoolStats {
    /// Creates new statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a page lookup.
    #[inline]
    pub(crate) fn record_access(&self) {
        self.accesses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a lookup hit.
    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a lookup miss.
    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an eviction.
    #[inline]
    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a page read from disk.
    #[inline]
    pub(crate) fn record_disk_read(&self) {
        self.disk_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a page write to disk.
    #[inline]
    pub(crate) fn record_disk_write(&self) {
        self.disk_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns total page lookups.
    pub fn accesses(&self) -> u64 {
        self.accesses.load(Ordering::Relaxed)
    }

    /// Returns lookup hits.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns lookup misses.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Returns evictions.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Returns pages read from disk.
    pub fn disk_reads(&self) -> u64 {
        self.disk_reads.load(Ordering::Relaxed)
    }

    /// Returns pages written to disk.
    pub fn disk_writes(&self) -> u64 {
        self.disk_writes.load(Ordering::Relaxed)
    }

    /// Returns the hit ratio (0.0 to 1.0).
    pub fn hit_ratio(&self) -> f64 {
        let accesses = self.accesses();
        if accesses == 0 {
            0.0
        } else {
            self.hits() as f64 / accesses as f64
        }
    }

    /// Resets all statistics.
    pub fn reset(&self) {
        self.accesses.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.disk_reads.store(0, Ordering::Relaxed);
        self.disk_writes.store(0, Ordering::Relaxed);
    }
}

impl Clone for PoolStats {
    fn clone(&self) -> Self {
        Self {
            accesses: AtomicU64::new(self.accesses()),
            hits: AtomicU64::new(self.hits()),
            misses: AtomicU64::new(self.misses()),
            evictions: AtomicU64::new(self.evictions()),
            disk_reads: AtomicU64::new(self.disk_reads()),
            disk_writes: AtomicU64::new(self.disk_writes()),
        }
    }
}

impl std::fmt::Display for PoolStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PoolStats {{ accesses: {}, hits: {}, misses: {}, hit_ratio: {:.2}%, evictions: {}, disk_reads: {}, disk_writes: {} }}",
            self.accesses(),
            self.hits(),
            self.misses(),
            self.hit_ratio() * 100.0,
            self.evictions(),
            self.disk_reads(),
            self.disk_writes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_stats() {
        let stats = PoolStats::new();

        stats.record_access();
        stats.record_hit();
        stats.record_access();
        stats.record_miss();
        stats.record_disk_read();

        assert_eq!(stats.accesses(), 2);
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.disk_reads(), 1);
        assert!((stats.hit_ratio() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_reset() {
        let stats = PoolStats::new();

        stats.record_access();
        stats.record_disk_write();
        stats.reset();

        assert_eq!(stats.accesses(), 0);
        assert_eq!(stats.disk_writes(), 0);
    }

    #[test]
    fn test_clone() {
        let stats = PoolStats::new();
        stats.record_eviction();
        stats.record_disk_write();

        let cloned = stats.clone();
        assert_eq!(cloned.evictions(), 1);
        assert_eq!(cloned.disk_writes(), 1);
    }
}
