//! In-memory disk manager for tests and benchmarks.

use std::collections::HashMap;

use hearth_common::constants::PAGE_SIZE;
use hearth_common::types::PageId;
use parking_lot::Mutex;

use super::error::{check_buffer, check_page_id, DiskResult};
use super::manager::DiskManager;

/// Disk manager that keeps all pages in memory.
///
/// Behaves like [`FileDiskManager`](super::FileDiskManager) over an empty
/// file: pages that were never written read back as zeroes. Useful for
/// unit tests and benchmarks that should not touch the filesystem.
#[derive(Default)]
pub struct MemoryDiskManager {
    pages: Mutex<HashMap<PageId, Box<[u8]>>>,
}

impl MemoryDiskManager {
    /// Creates an empty in-memory disk manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of pages ever written.
    pub fn page_count(&self) -> usize {
        self.pages.lock().len()
    }
}

impl DiskManager for MemoryDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> DiskResult<()> {
        check_page_id(page_id)?;
        check_buffer(buf.len(), PAGE_SIZE)?;

        match self.pages.lock().get(&page_id) {
            Some(data) => buf.copy_from_slice(data),
            None => buf.fill(0),
        }
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> DiskResult<()> {
        check_page_id(page_id)?;
        check_buffer(buf.len(), PAGE_SIZE)?;

        self.pages.lock().insert(page_id, buf.into());
        Ok(())
    }

    fn sync(&self) -> DiskResult<()> {
        Ok(())
    }
}

impl std::fmt::Debug for MemoryDiskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDiskManager")
            .field("page_count", &self.page_count())
            .finish()
    }
}
