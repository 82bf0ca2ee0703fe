//! URL handling for the driver archive
//!
//! This module provides detail-link normalization, listing page tokens,
//! trailing-segment decomposition and the web-archive URL builders.

mod archive;
mod normalize;
mod segment;

pub use archive::{availability_query_url, snapshot_url};
pub use normalize::resolve_detail_url;
pub use segment::{decompose_trailing_segment, listing_page_token};
