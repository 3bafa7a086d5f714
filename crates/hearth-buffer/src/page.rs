//! In-memory page frames and the handles callers hold on them.

use std::sync::Arc;

use hearth_common::constants::PAGE_SIZE;
use hearth_common::types::PageId;
use parking_lot::RwLock;

/// A shared handle to a frame in the buffer pool.
///
/// The buffer pool hands out clones of this handle rather than lock
/// guards, so callers can keep a pinned page across lock scopes. The
/// handle stays valid as long as the page is pinned: a non-zero pin
/// count forbids eviction, which is what keeps the frame's contents
/// stable. Using a handle after the last unpin is a caller contract
/// violation, not something the type system prevents.
pub type PageHandle = Arc<RwLock<Page>>;

/// A page frame: one page worth of payload plus residency metadata.
///
/// The payload buffer is allocated once, at pool construction, and
/// reused as pages move through the frame. On reuse the previous
/// occupant's bytes are retained until overwritten; callers of
/// `new_page` are expected to write before they read.
pub struct Page {
    /// The page payload.
    data: Box<[u8]>,
    /// Identifier of the occupying page, or `PageId::INVALID` when empty.
    page_id: PageId,
    /// Number of outstanding claims; zero means eligible for eviction.
    pin_count: u32,
    /// True when the in-memory payload diverges from disk.
    is_dirty: bool,
}

impl Page {
    /// Creates an empty frame.
    pub(crate) fn new() -> Self {
        Self {
            data: vec![0; PAGE_SIZE].into_boxed_slice(),
            page_id: PageId::INVALID,
            pin_count: 0,
            is_dirty: false,
        }
    }

    /// Returns the id of the occupying page, or `PageId::INVALID`.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Returns the current pin count.
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    /// Returns true if the payload has unwritten modifications.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Returns the page payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the page payload for writing.
    ///
    /// Mutating the payload does not mark the frame dirty; callers
    /// declare modifications through `unpin_page(.., is_dirty: true)`.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Re-initializes the frame's metadata for a new occupant.
    pub(crate) fn assign(&mut self, page_id: PageId) {
        self.page_id = page_id;
        self.pin_count = 1;
        self.is_dirty = false;
    }

    /// Clears the frame back to its empty state, zeroing the payload.
    pub(crate) fn reset(&mut self) {
        self.page_id = PageId::INVALID;
        self.pin_count = 0;
        self.is_dirty = false;
        self.data.fill(0);
    }

    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.is_dirty = dirty;
    }

    pub(crate) fn inc_pin(&mut self) {
        self.pin_count += 1;
    }

    pub(crate) fn dec_pin(&mut self) {
        debug_assert!(self.pin_count > 0);
        self.pin_count -= 1;
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("page_id", &self.page_id)
            .field("pin_count", &self.pin_count)
            .field("is_dirty", &self.is_dirty)
            .finish()
    }
}
