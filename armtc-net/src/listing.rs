// armtc-net/src/listing.rs
//! Hyperlink scraping for release listing pages.

use armtc_common::error::{Result, ToolchainError};
use regex::Regex;

const HREF_PATTERN: &str = r#"(?i)href\s*=\s*(?:"([^"]*)"|'([^']*)')"#;

/// Every `href` target on the page matching `pattern`, in document order.
pub fn parse_links(html: &str, pattern: &str) -> Result<Vec<String>> {
    let href = Regex::new(HREF_PATTERN)
        .map_err(|e| ToolchainError::Generic(format!("Invalid href pattern: {e}")))?;
    let filter = Regex::new(pattern).map_err(|e| {
        ToolchainError::Config(format!("Invalid link pattern '{pattern}': {e}"))
    })?;

    let links = href
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().replace("&amp;", "&"))
        .filter(|link| !link.is_empty() && filter.is_match(link))
        .collect::<Vec<_>>();

    tracing::debug!(
        "Found {} link(s) matching '{}' on listing page",
        links.len(),
        pattern
    );
    Ok(links)
}

/// Last path segment of a link with any query string or fragment removed.
pub fn link_filename(link: &str) -> &str {
    let without_query = link.split(['?', '#']).next().unwrap_or(link);
    without_query
        .rsplit('/')
        .next()
        .unwrap_or(without_query)
}
