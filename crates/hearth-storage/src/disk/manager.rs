//! The `DiskManager` trait: the seam between the buffer pool and disk.

use hearth_common::types::PageId;

use super::error::DiskResult;

/// Page I/O backend trait for page-granular storage.
///
/// This trait defines the interface the buffer pool uses to move pages
/// between memory and persistent storage. Implementations include:
/// - [`FileDiskManager`](super::FileDiskManager): a single page file on disk
/// - [`MemoryDiskManager`](super::MemoryDiskManager): an in-memory store
///
/// # Design Decisions
///
/// 1. **Caller-owned buffers**: the disk manager reads and writes raw
///    bytes only. Frame memory belongs to the buffer pool.
///
/// 2. **Page-level operations**: every transfer is exactly one page.
///    Buffers of any other length are rejected.
///
/// 3. **Synchronous I/O**: the buffer pool performs I/O while holding its
///    pool latch, trading throughput for a simple correctness argument.
///    An async backend would require the pool to re-verify residency
///    after every await point.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. The buffer pool serializes its
/// own calls, but the disk manager may be shared with other components
/// (e.g. a background flusher) and must not rely on external locking.
pub trait DiskManager: Send + Sync {
    /// Reads the page `page_id` into the caller-provided buffer.
    ///
    /// A page that has never been written reads back as all zeroes; the
    /// page file is sparse from the point of view of this trait.
    ///
    /// # Errors
    ///
    /// Returns [`DiskError::InvalidBufferSize`](super::DiskError::InvalidBufferSize)
    /// if `buf` is not exactly one page, and
    /// [`DiskError::InvalidPageId`](super::DiskError::InvalidPageId) for the
    /// invalid sentinel.
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> DiskResult<()>;

    /// Writes the caller-provided buffer as page `page_id`.
    ///
    /// # Errors
    ///
    /// Same validation errors as [`read_page`](Self::read_page), plus any
    /// underlying I/O failure.
    fn write_page(&self, page_id: PageId, buf: &[u8]) -> DiskResult<()>;

    /// Syncs all pending writes to physical storage (fsync).
    ///
    /// For [`MemoryDiskManager`](super::MemoryDiskManager) this is a no-op.
    fn sync(&self) -> DiskResult<()>;
}
