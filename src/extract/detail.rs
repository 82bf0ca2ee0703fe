//! Detail page extraction

use crate::extract::arch::Arch;
use crate::extract::text::{own_text, own_text_trimmed};
use crate::extract::GpuRecord;
use crate::{ExtractError, ExtractResult};
use chrono::NaiveDate;
use scraper::Html;
use std::collections::HashMap;
use tracing::instrument;

const VERSION: &str = "Version";
const OPERATING_SYSTEM: &str = "Operating System";
const RELEASE_DATE: &str = "Release Date";
const REQUIRED_FIELDS: [&str; 3] = [VERSION, OPERATING_SYSTEM, RELEASE_DATE];

/// Label/value pairs read from the summary table of a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverSpec {
    fields: HashMap<String, String>,
}

impl DriverSpec {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }

    fn require(&self, label: &str) -> ExtractResult<&str> {
        self.get(label)
            .ok_or_else(|| ExtractError::MissingField(label.to_string()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Extracts one record per (series, GPU) pair from a detail page
///
/// # Errors
///
/// Returns an error if:
/// - `Version`, `Operating System` or `Release Date` is missing
/// - the architecture is neither `x86` nor `x64`
/// - the release date is not `YYYY.MM.DD`
/// - series headings and GPU lists differ in number
#[instrument(skip(html), fields(html_size = html.len()))]
pub fn extract_detail(html: &str) -> ExtractResult<Vec<GpuRecord>> {
    let document = Html::parse_document(html);

    let spec = parse_driver_spec(&document)?;
    let version = spec.require(VERSION)?;

    let mut os_arch = spec.require(OPERATING_SYSTEM)?.split_whitespace();
    let os = os_arch
        .next()
        .ok_or_else(|| ExtractError::MissingField(OPERATING_SYSTEM.to_string()))?;
    let arch = Arch::from_vendor(os_arch.next().unwrap_or_default())?;

    let release_date = normalize_release_date(spec.require(RELEASE_DATE)?)?;

    let series_list = own_text_trimmed(&document, "div#tab2_content b");
    let mut gpu_lists = own_text_trimmed(&document, "div#tab2_content p");
    if gpu_lists.is_empty() {
        gpu_lists = own_text_trimmed(&document, "div#tab2_content");
    }

    if series_list.len() != gpu_lists.len() {
        return Err(ExtractError::MalformedTable(format!(
            "{} series headings but {} GPU lists",
            series_list.len(),
            gpu_lists.len()
        )));
    }

    let mut records = Vec::new();
    for (heading, gpus) in series_list.iter().zip(&gpu_lists) {
        let series = series_name(heading);
        for gpu in gpus.split(',').map(str::trim).filter(|gpu| !gpu.is_empty()) {
            records.push(GpuRecord {
                series: series.clone(),
                gpu: gpu.to_string(),
                release_date: release_date.clone(),
                version: version.to_string(),
                os: os.to_string(),
                arch: arch.to_string(),
            });
        }
    }

    tracing::debug!(
        "Driver {} ({} {}) lists {} GPUs",
        version,
        os,
        arch,
        records.len()
    );

    Ok(records)
}

/// Reads the summary table of a detail page
///
/// Two markup generations exist: cells classed `contentsummaryleft` /
/// `contentsummaryright`, and older cells with those ids wrapping an `h2`.
pub fn parse_driver_spec(document: &Html) -> ExtractResult<DriverSpec> {
    let mut labels = own_text(document, "td.contentsummaryleft");
    if labels.is_empty() {
        labels = own_text(document, "td#contentsummaryleft h2");
    }

    let mut values = own_text(document, "td.contentsummaryright");
    if values.is_empty() {
        values = own_text(document, "td#contentsummaryright h2");
    }

    Ok(resync_spec(&labels, &values))
}

/// Pairs summary labels with their values
///
/// The value column contains stray empty cells, so each label takes the
/// first non-empty value at or after its aligned position, and every empty
/// cell skipped pushes the alignment of later labels one further. Walking
/// stops once the three required labels have been seen (the same labels
/// reappear further down the page) or the values run out.
///
/// # Examples
///
/// ```
/// use gpu_driver_specs::extract::resync_spec;
///
/// let labels = ["Version:", "Operating System:", "Release Date:"].map(String::from);
/// let values = ["304.88", "", "FreeBSD x64", " ", "2013.04.02"].map(String::from);
///
/// let spec = resync_spec(&labels, &values);
/// assert_eq!(spec.get("Operating System"), Some("FreeBSD x64"));
/// assert_eq!(spec.get("Release Date"), Some("2013.04.02"));
/// ```
pub fn resync_spec(labels: &[String], values: &[String]) -> DriverSpec {
    let mut spec = DriverSpec::default();
    let mut skipped = 0;

    'labels: for (idx, raw_label) in labels.iter().enumerate() {
        let label = raw_label.trim().trim_matches(':').trim();

        let value = loop {
            let Some(candidate) = values.get(idx + skipped) else {
                break 'labels;
            };
            let candidate = candidate.trim();
            if !candidate.is_empty() {
                break candidate;
            }
            skipped += 1;
        };

        if !label.is_empty() {
            spec.fields.insert(label.to_string(), value.to_string());
        }

        if REQUIRED_FIELDS
            .iter()
            .all(|field| spec.fields.contains_key(*field))
        {
            break;
        }
    }

    spec
}

/// Normalizes a `YYYY.MM.DD` release date to ISO-8601 at midnight UTC
///
/// # Examples
///
/// ```
/// use gpu_driver_specs::extract::normalize_release_date;
///
/// assert_eq!(normalize_release_date("2015.09.10").unwrap(), "2015-09-10T00:00:00Z");
/// ```
pub fn normalize_release_date(value: &str) -> ExtractResult<String> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y.%m.%d").map_err(|source| {
        ExtractError::InvalidDate {
            value: value.to_string(),
            source,
        }
    })?;
    Ok(date.format("%Y-%m-%dT00:00:00Z").to_string())
}

/// Strips the `Series` word and trailing colon from a series heading
///
/// `"GeForce 700 Series:"` becomes `"GeForce 700"`.
pub fn series_name(heading: &str) -> String {
    heading
        .trim()
        .trim_end_matches(':')
        .split_whitespace()
        .filter(|word| !matches!(*word, "Series" | "series" | "Series:" | "series:"))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(':')
        .to_string()
}
