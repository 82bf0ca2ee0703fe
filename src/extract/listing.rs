//! Listing page extraction
//!
//! A listing page is a run of `div.pressItem` blocks. Each block links to a
//! detail page from `h4 a` and, on newer entries, describes the driver in
//! `key: value` lines of paragraph text. Older entries only have the link.

use crate::extract::arch::{Arch, EntryArch};
use crate::extract::text::own_text_within;
use crate::extract::DriverEntry;
use crate::url::{decompose_trailing_segment, resolve_detail_url};
use crate::{ExtractError, ExtractResult};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use url::Url;

const UNKNOWN: &str = "unknown";

/// One of the two archive index pages
#[derive(Debug, Clone)]
pub struct ArchivePage {
    /// URL the page lives at; relative detail links resolve against it
    pub url: Url,

    /// Architecture the whole page is about
    pub arch: Arch,

    /// Raw page markup
    pub content: String,
}

impl ArchivePage {
    /// Operating system assumed for entries that do not state one
    pub fn default_os(&self) -> String {
        format!("FreeBSD {}", self.arch.vendor_token())
    }
}

/// Extracts every driver entry from a listing page
///
/// Entries are extracted independently: a broken block yields an `Err` in
/// its slot and the remaining blocks are still returned.
///
/// # Entry Rules
///
/// 1. Blocks without `key: value` lines are decomposed from the trailing
///    segment of their link. Four parts give `(os, arch, version)`; two
///    parts give `(os, version)` plus a placeholder architecture numbered
///    per page (`unknown1`, `unknown2`, ...).
/// 2. Otherwise the lines are overlaid on the defaults and the
///    `Operating System` value is split into `(os, arch)`.
pub fn extract_listing(page: &ArchivePage) -> Vec<ExtractResult<DriverEntry>> {
    let document = Html::parse_document(&page.content);

    let (Ok(block_selector), Ok(line_selector), Ok(link_selector)) = (
        Selector::parse("div.pressItem"),
        Selector::parse("p"),
        Selector::parse("h4 a"),
    ) else {
        return Vec::new();
    };

    let mut unresolved_count = 0;
    let mut entries = Vec::new();

    for block in document.select(&block_selector) {
        let entry = extract_entry(
            page,
            block,
            &line_selector,
            &link_selector,
            &mut unresolved_count,
        );
        entries.push(entry);
    }

    tracing::debug!(
        "Extracted {} entries from listing {}",
        entries.len(),
        page.url
    );

    entries
}

fn extract_entry(
    page: &ArchivePage,
    block: ElementRef<'_>,
    line_selector: &Selector,
    link_selector: &Selector,
    unresolved_count: &mut u32,
) -> ExtractResult<DriverEntry> {
    let href = block
        .select(link_selector)
        .find_map(|link| link.value().attr("href"))
        .ok_or_else(|| ExtractError::MalformedEntry("entry has no detail link".to_string()))?;

    let url = resolve_detail_url(href, &page.url)
        .ok_or_else(|| ExtractError::MalformedEntry(format!("unusable detail link '{}'", href)))?;

    let lines = own_text_within(block, line_selector);

    if lines.iter().any(|line| line.contains(':')) {
        entry_from_lines(page, &lines, url)
    } else {
        entry_from_link(url, unresolved_count)
    }
}

/// Builds an entry from the `key: value` lines of a block
fn entry_from_lines(
    page: &ArchivePage,
    lines: &[String],
    url: String,
) -> ExtractResult<DriverEntry> {
    let mut spec: HashMap<String, String> = HashMap::from([
        ("Version".to_string(), UNKNOWN.to_string()),
        ("Operating System".to_string(), page.default_os()),
        ("Release Date".to_string(), UNKNOWN.to_string()),
    ]);

    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            spec.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    let os_arch = &spec["Operating System"];
    let mut parts = os_arch.split_whitespace();
    let os = parts
        .next()
        .ok_or_else(|| ExtractError::MalformedEntry("empty operating system".to_string()))?
        .to_lowercase();

    let (os, arch) = if os == "freebsd" {
        let token = parts.next().unwrap_or_default();
        ("freebsd".to_string(), Arch::from_vendor(token)?)
    } else {
        // The feed mislabels a handful of FreeBSD entries; they are all amd64.
        tracing::warn!(
            "Coercing operating system '{}' to freebsd/amd64 for {}",
            os_arch,
            url
        );
        ("freebsd".to_string(), Arch::Amd64)
    };

    Ok(DriverEntry {
        version: spec["Version"].clone(),
        os,
        arch: EntryArch::Mapped(arch),
        release_date: spec["Release Date"].clone(),
        url,
    })
}

/// Builds an entry from the trailing segment of its detail link
fn entry_from_link(url: String, unresolved_count: &mut u32) -> ExtractResult<DriverEntry> {
    let parts = decompose_trailing_segment(&url);

    let (os, arch, version) = match parts.as_slice() {
        [os, arch, version, _] => (
            os.to_lowercase(),
            EntryArch::Mapped(Arch::from_vendor(arch)?),
            version.clone(),
        ),
        [os, version] => {
            *unresolved_count += 1;
            (
                os.to_lowercase(),
                EntryArch::Unresolved(*unresolved_count),
                version.clone(),
            )
        }
        _ => {
            return Err(ExtractError::MalformedEntry(format!(
                "cannot decompose detail link '{}' ({} parts)",
                url,
                parts.len()
            )))
        }
    };

    Ok(DriverEntry {
        version,
        os,
        arch,
        release_date: UNKNOWN.to_string(),
        url,
    })
}
