//! The buffer pool manager: pinned page handles over a fixed frame array.

use std::collections::VecDeque;
use std::sync::Arc;

use hearth_common::types::{FrameId, PageId};
use hearth_storage::DiskManager;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error};

use crate::page::{Page, PageHandle};
use crate::page_table::ExtendibleHashTable;
use crate::replacer::LruKReplacer;
use crate::stats::PoolStats;
use crate::BufferPoolConfig;

/// State mutated by every pool operation, guarded by the pool latch.
struct PoolInner {
    /// Frames currently holding no page.
    free_list: VecDeque<FrameId>,
    /// Monotonic allocator for new page identifiers.
    next_page_id: PageId,
}

/// Manager of a fixed array of page frames cached in memory.
///
/// The pool mediates all access between database operators and the
/// on-disk page file: it resolves page ids through an extendible hash
/// page table, reclaims frames through an LRU-K replacer, writes dirty
/// victims back before reuse, and hands out [`PageHandle`]s whose
/// lifetime is governed by the pin protocol (`fetch`/`new` pin, `unpin`
/// releases; a frame with a non-zero pin count is never evicted).
///
/// # Locking
///
/// Every public operation holds the pool latch for its full duration,
/// disk I/O included, which totally orders all state transitions for a
/// given page. The page table and the replacer carry their own internal
/// mutexes and are only ever locked under the pool latch, never the
/// reverse. Individual frames sit behind `RwLock`s so handle holders can
/// read and write payloads without the pool latch; pool operations that
/// touch a frame's metadata briefly take that frame's lock too, so a
/// caller that invokes the pool while holding a guard on the same page
/// will deadlock with itself.
///
/// # Failure surface
///
/// Capacity exhaustion and precondition violations are reported in-band
/// (`None` / `false`). Disk errors are logged, the affected operation
/// reports in-band failure, and the pool's bookkeeping is rolled back so
/// the structural invariants keep holding.
pub struct BufferPoolManager {
    /// The frame array, allocated once at construction.
    pages: Vec<PageHandle>,
    /// page id → frame index for resident pages.
    page_table: ExtendibleHashTable<PageId, FrameId>,
    /// Eviction policy over frame ids.
    replacer: LruKReplacer,
    /// The disk collaborator.
    disk: Arc<dyn DiskManager>,
    /// Operation counters.
    stats: PoolStats,
    /// Free list and page id allocator, under the pool latch.
    inner: Mutex<PoolInner>,
}

impl BufferPoolManager {
    /// Creates a pool with `config.pool_size` empty frames.
    ///
    /// # Panics
    ///
    /// Panics if the configuration fails validation.
    pub fn new(config: BufferPoolConfig, disk: Arc<dyn DiskManager>) -> Self {
        if let Err(msg) = config.validate() {
            panic!("invalid buffer pool config: {msg}");
        }

        let pages = (0..config.pool_size)
            .map(|_| Arc::new(RwLock::new(Page::new())))
            .collect();
        let free_list = (0..config.pool_size)
            .map(|i| FrameId::new(i as u32))
            .collect();

        Self {
            pages,
            page_table: ExtendibleHashTable::new(config.bucket_size),
            replacer: LruKReplacer::new(config.pool_size, config.replacer_k),
            disk,
            stats: PoolStats::new(),
            inner: Mutex::new(PoolInner {
                free_list,
                next_page_id: PageId::FIRST,
            }),
        }
    }

    /// Allocates a fresh page and returns it pinned.
    ///
    /// The frame's payload is whatever occupied it previously; callers
    /// are expected to write before they read. Returns `None` when every
    /// frame is pinned and nothing can be evicted.
    pub fn new_page(&self) -> Option<(PageId, PageHandle)> {
        let mut inner = self.inner.lock();

        let frame_id = self.acquire_frame(&mut inner)?;
        let page_id = Self::allocate_page(&mut inner);

        let handle = &self.pages[frame_id.as_usize()];
        handle.write().assign(page_id);

        self.page_table.insert(page_id, frame_id);
        self.replacer.record_access(frame_id);
        self.replacer.set_evictable(frame_id, false);

        debug!(%page_id, %frame_id, "allocated new page");
        Some((page_id, Arc::clone(handle)))
    }

    /// Returns the page `page_id` pinned, reading it from disk if it is
    /// not resident.
    ///
    /// Returns `None` when the page is not resident and every frame is
    /// pinned, or when the disk read fails.
    pub fn fetch_page(&self, page_id: PageId) -> Option<PageHandle> {
        let mut inner = self.inner.lock();

        if !page_id.is_valid() {
            return None;
        }

        self.stats.record_access();
        if let Some(frame_id) = self.page_table.find(&page_id) {
            self.stats.record_hit();
            let handle = &self.pages[frame_id.as_usize()];
            handle.write().inc_pin();
            self.replacer.record_access(frame_id);
            self.replacer.set_evictable(frame_id, false);
            return Some(Arc::clone(handle));
        }
        self.stats.record_miss();

        let frame_id = self.acquire_frame(&mut inner)?;
        let handle = &self.pages[frame_id.as_usize()];
        {
            let mut page = handle.write();
            if let Err(err) = self.disk.read_page(page_id, page.data_mut()) {
                error!(%page_id, %err, "disk read failed, returning frame to free list");
                page.reset();
                inner.free_list.push_back(frame_id);
                return None;
            }
            self.stats.record_disk_read();
            page.assign(page_id);
        }

        self.page_table.insert(page_id, frame_id);
        self.replacer.record_access(frame_id);
        self.replacer.set_evictable(frame_id, false);

        Some(Arc::clone(handle))
    }

    /// Releases one pin on `page_id`, OR-ing `is_dirty` into the frame's
    /// dirty flag.
    ///
    /// Returns `false` when the page is not resident or its pin count is
    /// already zero. When the last pin is released the frame becomes an
    /// eviction candidate.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let _inner = self.inner.lock();

        let Some(frame_id) = self.page_table.find(&page_id) else {
            return false;
        };
        let mut page = self.pages[frame_id.as_usize()].write();
        if page.pin_count() == 0 {
            return false;
        }

        page.dec_pin();
        if is_dirty {
            page.set_dirty(true);
        }
        if page.pin_count() == 0 {
            self.replacer.set_evictable(frame_id, true);
        }
        true
    }

    /// Writes `page_id`'s frame to disk, dirty or not, and clears the
    /// dirty flag.
    ///
    /// Returns `false` for the invalid sentinel (without touching disk),
    /// for a non-resident page, or when the write fails.
    pub fn flush_page(&self, page_id: PageId) -> bool {
        let _inner = self.inner.lock();

        if !page_id.is_valid() {
            return false;
        }
        let Some(frame_id) = self.page_table.find(&page_id) else {
            return false;
        };

        let mut page = self.pages[frame_id.as_usize()].write();
        match self.disk.write_page(page_id, page.data()) {
            Ok(()) => {
                self.stats.record_disk_write();
                page.set_dirty(false);
                true
            }
            Err(err) => {
                error!(%page_id, %err, "flush failed");
                false
            }
        }
    }

    /// Writes every resident dirty page back to disk.
    ///
    /// Not an atomic snapshot: pages dirtied while the scan runs may or
    /// may not be included. Write failures are logged and the remaining
    /// frames are still attempted.
    pub fn flush_all_pages(&self) {
        let _inner = self.inner.lock();

        for handle in &self.pages {
            let mut page = handle.write();
            if !page.page_id().is_valid() || !page.is_dirty() {
                continue;
            }
            match self.disk.write_page(page.page_id(), page.data()) {
                Ok(()) => {
                    self.stats.record_disk_write();
                    page.set_dirty(false);
                }
                Err(err) => {
                    error!(page_id = %page.page_id(), %err, "flush failed");
                }
            }
        }
    }

    /// Deletes `page_id` from the pool and deallocates its on-disk id.
    ///
    /// A non-resident page is deallocated and reported deleted. A pinned
    /// page cannot be deleted (`false`). Otherwise the frame is cleared,
    /// zeroed, and returned to the free list; a dirty frame is written
    /// back first.
    pub fn delete_page(&self, page_id: PageId) -> bool {
        let mut inner = self.inner.lock();

        let Some(frame_id) = self.page_table.find(&page_id) else {
            Self::deallocate_page(page_id);
            return true;
        };

        let mut page = self.pages[frame_id.as_usize()].write();
        if page.pin_count() > 0 {
            return false;
        }

        if page.is_dirty() {
            if let Err(err) = self.disk.write_page(page_id, page.data()) {
                error!(%page_id, %err, "write-back before delete failed");
                return false;
            }
            self.stats.record_disk_write();
        }

        self.page_table.remove(&page_id);
        self.replacer.remove(frame_id);
        page.reset();
        drop(page);
        inner.free_list.push_back(frame_id);
        Self::deallocate_page(page_id);

        debug!(%page_id, %frame_id, "deleted page");
        true
    }

    /// Returns the number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.pages.len()
    }

    /// Returns the number of empty frames on the free list.
    pub fn free_frame_count(&self) -> usize {
        self.inner.lock().free_list.len()
    }

    /// Returns the number of unpinned frames the replacer could evict.
    pub fn evictable_count(&self) -> usize {
        self.replacer.size()
    }

    /// Returns a snapshot of the pool's operation counters.
    pub fn stats(&self) -> PoolStats {
        self.stats.clone()
    }

    /// Finds a frame to receive a page: the free list first, otherwise
    /// an eviction victim (written back if dirty, erased from the page
    /// table). Returns `None` when the pool is exhausted.
    fn acquire_frame(&self, inner: &mut PoolInner) -> Option<FrameId> {
        if let Some(frame_id) = inner.free_list.pop_front() {
            return Some(frame_id);
        }

        let frame_id = self.replacer.evict()?;
        let mut victim = self.pages[frame_id.as_usize()].write();
        let victim_id = victim.page_id();

        if victim.is_dirty() {
            if let Err(err) = self.disk.write_page(victim_id, victim.data()) {
                error!(page_id = %victim_id, %err, "write-back of eviction victim failed");
                // The victim stays resident: its page table entry was
                // never removed, so only its replacer record (erased by
                // evict) needs rebuilding.
                drop(victim);
                self.replacer.record_access(frame_id);
                self.replacer.set_evictable(frame_id, true);
                return None;
            }
            self.stats.record_disk_write();
            victim.set_dirty(false);
        }
        drop(victim);

        self.stats.record_eviction();
        self.page_table.remove(&victim_id);
        debug!(page_id = %victim_id, %frame_id, "evicted page");
        Some(frame_id)
    }

    /// Hands out the next page identifier, starting from `PageId::FIRST`.
    fn allocate_page(inner: &mut PoolInner) -> PageId {
        let page_id = inner.next_page_id;
        inner.next_page_id = page_id.next();
        page_id
    }

    /// Releases an on-disk page identifier.
    ///
    /// Identifier reuse and on-disk space reclamation are outside this
    /// revision; the hook exists so callers observe delete semantics.
    fn deallocate_page(_page_id: PageId) {}
}

impl std::fmt::Debug for BufferPoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPoolManager")
            .field("pool_size", &self.pages.len())
            .field("free_frames", &self.free_frame_count())
            .field("evictable", &self.evictable_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_storage::MemoryDiskManager;

    fn small_pool(pool_size: usize) -> BufferPoolManager {
        let config = BufferPoolConfig::default()
            .with_pool_size(pool_size)
            .with_replacer_k(2)
            .with_bucket_size(2);
        BufferPoolManager::new(config, Arc::new(MemoryDiskManager::new()))
    }

    #[test]
    fn test_new_page_pins_frame() {
        let pool = small_pool(3);

        let (page_id, handle) = pool.new_page().unwrap();
        assert_eq!(page_id, PageId::FIRST);

        let page = handle.read();
        assert_eq!(page.page_id(), page_id);
        assert_eq!(page.pin_count(), 1);
        assert!(!page.is_dirty());
        drop(page);

        assert_eq!(pool.free_frame_count(), 2);
        assert_eq!(pool.evictable_count(), 0);
    }

    #[test]
    fn test_page_ids_are_monotonic() {
        let pool = small_pool(3);
        let (p0, _) = pool.new_page().unwrap();
        let (p1, _) = pool.new_page().unwrap();
        let (p2, _) = pool.new_page().unwrap();
        assert_eq!(p0, PageId::FIRST);
        assert!(p0 < p1 && p1 < p2);
    }

    #[test]
    fn test_pool_exhaustion() {
        let pool = small_pool(3);
        for _ in 0..3 {
            pool.new_page().unwrap();
        }

        // All frames pinned: no new page, no fetch of a cold page.
        assert!(pool.new_page().is_none());
        assert!(pool.fetch_page(PageId::new(99)).is_none());
    }

    #[test]
    fn test_fetch_resident_page_is_a_hit() {
        let pool = small_pool(3);
        let (page_id, handle) = pool.new_page().unwrap();
        handle.write().data_mut()[0] = 0x42;

        let fetched = pool.fetch_page(page_id).unwrap();
        assert_eq!(fetched.read().pin_count(), 2);
        assert_eq!(fetched.read().data()[0], 0x42);

        let stats = pool.stats();
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.disk_reads(), 0);
    }

    #[test]
    fn test_unpin_and_evict_round_trip() {
        let pool = small_pool(1);

        let (p0, handle) = pool.new_page().unwrap();
        handle.write().data_mut()[..4].copy_from_slice(b"zero");
        drop(handle);
        assert!(pool.unpin_page(p0, true));
        assert_eq!(pool.evictable_count(), 1);

        // The single frame is reused; p0 is written back.
        let (p1, _) = pool.new_page().unwrap();
        assert_ne!(p0, p1);
        assert_eq!(pool.stats().disk_writes(), 1);
        assert!(pool.unpin_page(p1, false));

        // Fetching p0 reads the written-back payload.
        let fetched = pool.fetch_page(p0).unwrap();
        assert_eq!(&fetched.read().data()[..4], b"zero");
    }

    #[test]
    fn test_unpin_preconditions() {
        let pool = small_pool(3);
        let (page_id, _) = pool.new_page().unwrap();

        // Unknown page.
        assert!(!pool.unpin_page(PageId::new(777), false));

        assert!(pool.unpin_page(page_id, false));
        // Already at zero pins.
        assert!(!pool.unpin_page(page_id, false));
    }

    #[test]
    fn test_unpin_dirty_flag_is_sticky() {
        let pool = small_pool(3);
        let (page_id, handle) = pool.new_page().unwrap();

        // Pin twice, unpin once dirty and once clean: the clean unpin
        // must not clear the dirty flag.
        pool.fetch_page(page_id).unwrap();
        assert!(pool.unpin_page(page_id, true));
        assert!(pool.unpin_page(page_id, false));
        assert!(handle.read().is_dirty());
    }

    #[test]
    fn test_flush_page_clears_dirty() {
        let pool = small_pool(3);
        let (page_id, handle) = pool.new_page().unwrap();
        handle.write().data_mut()[0] = 1;
        pool.unpin_page(page_id, true);

        assert!(pool.flush_page(page_id));
        assert!(!handle.read().is_dirty());
        assert_eq!(pool.stats().disk_writes(), 1);

        // Invalid sentinel and unknown pages flush nothing.
        assert!(!pool.flush_page(PageId::INVALID));
        assert!(!pool.flush_page(PageId::new(555)));
        assert_eq!(pool.stats().disk_writes(), 1);
    }

    #[test]
    fn test_flush_all_is_idempotent() {
        let pool = small_pool(3);
        for _ in 0..3 {
            let (page_id, _) = pool.new_page().unwrap();
            pool.unpin_page(page_id, true);
        }

        pool.flush_all_pages();
        assert_eq!(pool.stats().disk_writes(), 3);

        // Every dirty flag was cleared; a second sweep writes nothing.
        pool.flush_all_pages();
        assert_eq!(pool.stats().disk_writes(), 3);
    }

    #[test]
    fn test_delete_pinned_page_fails() {
        let pool = small_pool(3);
        let (page_id, _) = pool.new_page().unwrap();

        assert!(!pool.delete_page(page_id));

        pool.unpin_page(page_id, false);
        assert!(pool.delete_page(page_id));
        assert_eq!(pool.free_frame_count(), 3);
        assert_eq!(pool.evictable_count(), 0);
    }

    #[test]
    fn test_delete_non_resident_page_succeeds() {
        let pool = small_pool(3);
        assert!(pool.delete_page(PageId::new(12)));
    }

    #[test]
    fn test_delete_zeroes_frame() {
        let pool = small_pool(1);
        let (page_id, handle) = pool.new_page().unwrap();
        handle.write().data_mut().fill(0xAA);
        drop(handle);
        pool.unpin_page(page_id, true);
        assert!(pool.delete_page(page_id));

        // The frame is handed out fresh and empty.
        let (_, handle) = pool.new_page().unwrap();
        assert!(handle.read().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_eviction_skips_pinned_frames() {
        let pool = small_pool(2);
        let (p0, _) = pool.new_page().unwrap();
        let (_p1, _) = pool.new_page().unwrap();
        pool.unpin_page(p0, false);

        // Only p0's frame is evictable; two allocations exhaust the pool.
        assert!(pool.new_page().is_some());
        assert!(pool.new_page().is_none());
    }

    #[test]
    fn test_clean_eviction_skips_disk_write() {
        let pool = small_pool(1);
        let (p0, _) = pool.new_page().unwrap();
        pool.unpin_page(p0, false);

        pool.new_page().unwrap();
        assert_eq!(pool.stats().disk_writes(), 0);
        assert_eq!(pool.stats().evictions(), 1);
    }

    #[test]
    fn test_fetch_invalid_sentinel() {
        let pool = small_pool(3);
        assert!(pool.fetch_page(PageId::INVALID).is_none());
    }

    #[test]
    #[should_panic(expected = "invalid buffer pool config")]
    fn test_zero_sized_pool_panics() {
        let config = BufferPoolConfig::default().with_pool_size(0);
        let _ = BufferPoolManager::new(config, Arc::new(MemoryDiskManager::new()));
    }
}
