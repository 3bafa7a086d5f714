//! Type definitions for HearthDB.
//!
//! This module contains the core identifier types used across the database.

mod ids;

pub use ids::{FrameId, PageId};
