//! System-wide constants for HearthDB.
//!
//! This module defines the page geometry and buffer pool defaults used
//! across the storage and buffer crates.

// =============================================================================
// Page Constants
// =============================================================================

/// Page size in bytes (8 KB).
///
/// This is a common page size that balances I/O efficiency with memory usage.
/// It matches the typical SSD block size and OS page size. The size is fixed
/// at compile time; every disk transfer and every buffer pool frame is
/// exactly one page.
pub const PAGE_SIZE: usize = 8 * 1024;

// =============================================================================
// Buffer Pool Constants
// =============================================================================

/// Default number of frames in the buffer pool.
pub const DEFAULT_POOL_SIZE: usize = 128;

/// Default K value for the LRU-K replacer.
///
/// K = 2 distinguishes pages accessed repeatedly from pages touched once
/// by a scan, which is the classic LRU-2 configuration.
pub const DEFAULT_REPLACER_K: usize = 2;

/// Default bucket capacity of the page table's extendible hash directory.
pub const DEFAULT_BUCKET_SIZE: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_constants() {
        // Page size should be a power of 2 for offset arithmetic
        assert!(PAGE_SIZE.is_power_of_two());
    }

    #[test]
    fn test_buffer_pool_constants() {
        assert!(DEFAULT_POOL_SIZE > 0);
        assert!(DEFAULT_REPLACER_K >= 1);
        assert!(DEFAULT_BUCKET_SIZE >= 1);
    }
}
