//! Content cache for fetched pages
//!
//! This module maps cache keys to local snapshots. It is consulted before any
//! detail page fetch and is the only durable state a crawl leaves behind
//! besides its output records.

mod layout;
mod store;

pub use layout::CacheLayout;
pub use store::{CacheResult, ContentCache};
