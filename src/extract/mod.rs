//! HTML extraction for the driver archive
//!
//! Two page kinds are parsed here:
//! - Listing pages, which yield one `DriverEntry` per archived driver
//! - Detail pages, which yield one `GpuRecord` per supported GPU

mod arch;
mod detail;
mod listing;
mod text;

pub use arch::{Arch, EntryArch};
pub use detail::{
    extract_detail, normalize_release_date, parse_driver_spec, resync_spec, series_name,
    DriverSpec,
};
pub use listing::{extract_listing, ArchivePage};

use serde::Serialize;

/// One driver scraped from a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverEntry {
    /// Driver version, or `"unknown"`
    pub version: String,

    /// Lowercased operating system name
    pub os: String,

    pub arch: EntryArch,

    /// Release date as printed on the listing, or `"unknown"`
    pub release_date: String,

    /// Absolute URL of the detail page
    pub url: String,
}

impl DriverEntry {
    /// Canonical cache key: `nvidia_{version}_{os}_{arch}`
    ///
    /// The key doubles as the de-duplication key, so one key is fetched at
    /// most once.
    pub fn cache_key(&self) -> String {
        format!("nvidia_{}_{}_{}", self.version, self.os, self.arch)
    }
}

/// One output record: a GPU supported by a driver release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GpuRecord {
    pub series: String,
    pub gpu: String,
    /// ISO-8601, UTC, `Z` suffix
    pub release_date: String,
    pub version: String,
    pub os: String,
    pub arch: String,
}
