use url::Url;

/// Resolves a detail-page href scraped from a listing page to an absolute URL
///
/// # Resolution Rules
///
/// 1. Protocol-relative hrefs (`//host/path`) get an `https:` scheme
/// 2. Absolute http(s) hrefs are kept as they are
/// 3. Anything else is joined onto the listing page URL
///
/// Returns `None` for empty hrefs, non-HTTP schemes and hrefs that do not
/// resolve.
///
/// # Examples
///
/// ```
/// use gpu_driver_specs::url::resolve_detail_url;
/// use url::Url;
///
/// let page = Url::parse("https://www.nvidia.com/en-us/drivers/unix/freebsd-archive/").unwrap();
/// assert_eq!(
///     resolve_detail_url("//www.nvidia.com/object/freebsd-x86-313.18-driver", &page).as_deref(),
///     Some("https://www.nvidia.com/object/freebsd-x86-313.18-driver")
/// );
/// ```
pub fn resolve_detail_url(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }

    let resolved = match Url::parse(href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => page_url.join(href).ok()?,
        Err(_) => return None,
    };

    if resolved.scheme() == "http" || resolved.scheme() == "https" {
        Some(resolved.to_string())
    } else {
        None
    }
}
