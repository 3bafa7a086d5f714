//! # hearth-common
//!
//! Common types and constants for HearthDB.
//!
//! This crate provides the foundational pieces shared by the storage and
//! buffer crates:
//!
//! - **Types**: Core identifiers (`PageId`, `FrameId`)
//! - **Constants**: Page geometry and buffer pool defaults
//!
//! ## Example
//!
//! ```rust
//! use hearth_common::types::{FrameId, PageId};
//! use hearth_common::constants::PAGE_SIZE;
//!
//! let page = PageId::new(42);
//! let frame = FrameId::new(0);
//! assert!(page.is_valid());
//! assert_eq!(PAGE_SIZE, 8 * 1024);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::PAGE_SIZE;
pub use types::{FrameId, PageId};
