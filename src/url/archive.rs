use url::Url;

/// Builds the availability query for a page on the web archive
///
/// The original URL travels form-encoded in the `url` parameter, next to the
/// fixed `output=json` and `collection=web` parameters.
pub fn availability_query_url(endpoint: &str, original_url: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        endpoint,
        &[
            ("output", "json"),
            ("url", original_url),
            ("collection", "web"),
        ],
    )
}

/// Builds the snapshot URL for `original_url` captured at `last_ts`
///
/// # Examples
///
/// ```
/// use gpu_driver_specs::url::snapshot_url;
///
/// assert_eq!(
///     snapshot_url(
///         "https://web.archive.org/web",
///         "20151001000000",
///         "https://www.nvidia.com/object/freebsd-x86-313.18-driver"
///     ),
///     "https://web.archive.org/web/20151001000000/https://www.nvidia.com/object/freebsd-x86-313.18-driver"
/// );
/// ```
pub fn snapshot_url(prefix: &str, last_ts: &str, original_url: &str) -> String {
    format!("{}/{}/{}", prefix.trim_end_matches('/'), last_ts, original_url)
}
