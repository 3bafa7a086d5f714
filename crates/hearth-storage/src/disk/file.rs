//! File-backed disk manager over a single page file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use hearth_common::constants::PAGE_SIZE;
use hearth_common::types::PageId;
use parking_lot::Mutex;
use tracing::debug;

use super::error::{check_buffer, check_page_id, DiskError, DiskResult};
use super::manager::DiskManager;

/// Disk manager backed by a single page file.
///
/// Page `n` lives at byte offset `n * PAGE_SIZE`. Reads past the current
/// end of file zero-fill the buffer, so freshly allocated pages read back
/// as zeroes without the file being pre-extended.
///
/// The underlying file is wrapped in a mutex; reads and writes seek and
/// transfer under it. Writes go to the OS page cache; durability requires
/// an explicit [`sync`](DiskManager::sync).
pub struct FileDiskManager {
    /// The backing page file, guarded for seek+transfer atomicity.
    file: Mutex<File>,
    /// The page file path.
    path: PathBuf,
}

impl FileDiskManager {
    /// Opens (creating if necessary) the page file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DiskResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|_| DiskError::cannot_open(&path))?;

        debug!(path = %path.display(), "opened page file");

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Returns the page file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the byte offset of `page_id` in the page file.
    fn offset_of(page_id: PageId) -> u64 {
        page_id.as_u64() * PAGE_SIZE as u64
    }
}

impl DiskManager for FileDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> DiskResult<()> {
        check_page_id(page_id)?;
        check_buffer(buf.len(), PAGE_SIZE)?;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;

        // Read up to one page; a short read means the page lies partly or
        // wholly past EOF and the remainder reads as zeroes.
        let mut filled = 0;
        while filled < PAGE_SIZE {
            let n = file.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled < PAGE_SIZE {
            buf[filled..].fill(0);
        }

        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> DiskResult<()> {
        check_page_id(page_id)?;
        check_buffer(buf.len(), PAGE_SIZE)?;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        file.write_all(buf)?;

        Ok(())
    }

    fn sync(&self) -> DiskResult<()> {
        let file = self.file.lock();
        file.sync_all()?;
        Ok(())
    }
}

impl std::fmt::Debug for FileDiskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDiskManager")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn page_of(byte: u8) -> Vec<u8> {
        vec![byte; PAGE_SIZE]
    }

    #[test]
    fn test_open_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pages.db");

        let disk = FileDiskManager::open(&path).unwrap();
        assert_eq!(disk.path(), path);
    }

    #[test]
    fn test_write_and_read() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("rw.db")).unwrap();

        let data = page_of(0xAB);
        disk.write_page(PageId::new(0), &data).unwrap();

        let mut buf = page_of(0);
        disk.read_page(PageId::new(0), &mut buf).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn test_read_past_eof_zero_fills() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("eof.db")).unwrap();

        let mut buf = page_of(0xFF);
        disk.read_page(PageId::new(17), &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pages_are_independent() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("indep.db")).unwrap();

        disk.write_page(PageId::new(0), &page_of(1)).unwrap();
        disk.write_page(PageId::new(2), &page_of(3)).unwrap();

        let mut buf = page_of(0xFF);
        disk.read_page(PageId::new(0), &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 1));

        // The gap page was never written and reads as zeroes
        disk.read_page(PageId::new(1), &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));

        disk.read_page(PageId::new(2), &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 3));
    }

    #[test]
    fn test_rejects_bad_buffer() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("bad.db")).unwrap();

        let mut small = vec![0u8; 100];
        assert!(matches!(
            disk.read_page(PageId::new(0), &mut small),
            Err(DiskError::InvalidBufferSize { .. })
        ));
        assert!(matches!(
            disk.write_page(PageId::new(0), &small),
            Err(DiskError::InvalidBufferSize { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_page_id() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("inv.db")).unwrap();

        let mut buf = page_of(0);
        assert!(matches!(
            disk.read_page(PageId::INVALID, &mut buf),
            Err(DiskError::InvalidPageId)
        ));
    }

    #[test]
    fn test_sync() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("sync.db")).unwrap();

        disk.write_page(PageId::new(0), &page_of(7)).unwrap();
        disk.sync().unwrap();
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");

        {
            let disk = FileDiskManager::open(&path).unwrap();
            disk.write_page(PageId::new(4), &page_of(0x5A)).unwrap();
            disk.sync().unwrap();
        }

        let disk = FileDiskManager::open(&path).unwrap();
        let mut buf = page_of(0);
        disk.read_page(PageId::new(4), &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0x5A));
    }
}
