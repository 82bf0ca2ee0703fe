use url::Url;

/// Derives the token naming a listing page snapshot in the cache
///
/// Live listing URLs end in a directory-style segment
/// (`.../unix/freebsd-x64-archive/` → `freebsd-x64-archive`). Replayed listing
/// files are flattened URLs whose last `_`-separated part carries the same
/// token (`https_www_nvidia.com_en-us_drivers_unix_freebsd-archive.html` →
/// `freebsd-archive`).
///
/// Returns `None` when no token can be found.
pub fn listing_page_token(location: &str, replayed: bool) -> Option<String> {
    let token = if replayed {
        replayed_token(location)?
    } else {
        live_token(location)?
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn replayed_token(location: &str) -> Option<String> {
    let file_name = location.rsplit(['/', '\\']).next()?;
    let last = file_name.rsplit('_').next()?;
    Some(last.strip_suffix(".html").unwrap_or(last).to_string())
}

/// Last non-empty path segment; the host never counts
fn live_token(location: &str) -> Option<String> {
    let url = Url::parse(location).ok()?;
    let segment = url
        .path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())?;
    Some(segment.to_string())
}

/// Splits the trailing path segment of a detail URL into its parts
///
/// Older archive entries carry no spec text, only a link such as
/// `.../object/freebsd-x86-313.18-driver` or `.../object/FreeBSD_173.14.31`.
/// The `_display` suffix is dropped and the segment is split on `_` and `-`.
///
/// # Examples
///
/// ```
/// use gpu_driver_specs::url::decompose_trailing_segment;
///
/// assert_eq!(
///     decompose_trailing_segment("https://www.nvidia.com/object/freebsd-x86-313.18-driver"),
///     vec!["freebsd", "x86", "313.18", "driver"]
/// );
/// ```
pub fn decompose_trailing_segment(url: &str) -> Vec<String> {
    let segment = url.trim_end_matches('/').rsplit('/').next().unwrap_or("");

    segment
        .replace("_display", "")
        .split(['_', '-'])
        .map(str::to_string)
        .collect()
}
