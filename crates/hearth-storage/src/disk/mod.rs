//! Page-granular disk I/O for HearthDB.
//!
//! This module provides the `DiskManager` trait for page-based I/O
//! operations, along with its two implementations:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           DiskManager Trait             │
//! │     (read_page, write_page, sync)       │
//! └─────────────────────────────────────────┘
//!              │                   │
//!              ▼                   ▼
//! ┌─────────────────────┐  ┌─────────────────────┐
//! │   FileDiskManager   │  │  MemoryDiskManager  │
//! │   (page file)       │  │  (tests, benches)   │
//! └─────────────────────┘  └─────────────────────┘
//! ```
//!
//! All transfers are exactly one page ([`PAGE_SIZE`] bytes); a page's
//! offset in the backing file is `page_id * PAGE_SIZE`. This layer does
//! no caching: caching is the responsibility of the buffer pool.
//!
//! [`PAGE_SIZE`]: hearth_common::constants::PAGE_SIZE

mod error;
mod file;
mod manager;
mod memory;

pub use error::{DiskError, DiskResult};
pub use file::FileDiskManager;
pub use manager::DiskManager;
pub use memory::MemoryDiskManager;
