//! # hearth-buffer
//!
//! Buffer pool manager for HearthDB.
//!
//! This crate is the in-memory caching subsystem that mediates all access
//! between database operators and the on-disk page file. It consists of:
//!
//! - **LRU-K Replacer**: eviction policy based on backward k-distance
//! - **Extendible Hash Table**: page id → frame index mapping with
//!   directory doubling
//! - **Buffer Pool Manager**: a fixed array of page frames with pin
//!   counts, dirty tracking, and write-back on eviction
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hearth_buffer::{BufferPoolConfig, BufferPoolManager};
//! use hearth_storage::MemoryDiskManager;
//!
//! let disk = Arc::new(MemoryDiskManager::new());
//! let pool = BufferPoolManager::new(BufferPoolConfig::default(), disk);
//!
//! let (page_id, handle) = pool.new_page().unwrap();
//! handle.write().data_mut()[0] = 42;
//! assert!(pool.unpin_page(page_id, true));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod page;
pub mod page_table;
pub mod pool;
pub mod replacer;
pub mod stats;

pub use page::{Page, PageHandle};
pub use page_table::ExtendibleHashTable;
pub use pool::BufferPoolManager;
pub use replacer::LruKReplacer;
pub use stats::PoolStats;

use hearth_common::constants::{DEFAULT_BUCKET_SIZE, DEFAULT_POOL_SIZE, DEFAULT_REPLACER_K};

/// Configuration for the buffer pool.
#[derive(Debug, Clone)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool, fixed at construction.
    pub pool_size: usize,
    /// The K in LRU-K; must be at least 1.
    pub replacer_k: usize,
    /// Bucket capacity of the page table's extendible hash directory.
    pub bucket_size: usize,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            replacer_k: DEFAULT_REPLACER_K,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl BufferPoolConfig {
    /// Sets the number of frames in the pool.
    #[must_use]
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Sets the K value for the LRU-K replacer.
    #[must_use]
    pub fn with_replacer_k(mut self, k: usize) -> Self {
        self.replacer_k = k;
        self
    }

    /// Sets the page table bucket capacity.
    #[must_use]
    pub fn with_bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.pool_size == 0 {
            return Err("Pool size must be positive".to_string());
        }

        if self.replacer_k < 1 {
            return Err("LRU-K requires k >= 1".to_string());
        }

        if self.bucket_size == 0 {
            return Err("Bucket size must be positive".to_string());
        }

        Ok(())
    }
}
