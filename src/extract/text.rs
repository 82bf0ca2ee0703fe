use scraper::{ElementRef, Html, Selector};

/// Collects the text nodes that are direct children of each matched element
///
/// Text inside nested elements is not included, so `<p><b>A</b>B</p>` gives
/// `["B"]` for `p`. Nodes come back untrimmed, in document order.
pub(crate) fn own_text(document: &Html, selector: &str) -> Vec<String> {
    match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).flat_map(child_text).collect(),
        Err(_) => Vec::new(),
    }
}

/// Same as [`own_text`], scoped to the descendants of `element`
pub(crate) fn own_text_within(element: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    element.select(selector).flat_map(child_text).collect()
}

/// [`own_text`] with whitespace-only nodes dropped and the rest trimmed
pub(crate) fn own_text_trimmed(document: &Html, selector: &str) -> Vec<String> {
    own_text(document, selector)
        .into_iter()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

fn child_text(element: ElementRef<'_>) -> Vec<String> {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|text| text.to_string()))
        .collect()
}
