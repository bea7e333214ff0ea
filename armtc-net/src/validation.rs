// armtc-net/src/validation.rs
use armtc_common::error::{Result, ToolchainError};
use url::Url;

/// Parses a URL, accepting only the `http` and `https` schemes.
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).map_err(|e| {
        ToolchainError::Validation(format!("Failed to parse URL '{url_str}': {e}"))
    })?;
    match url.scheme() {
        "https" | "http" => Ok(url),
        other => Err(ToolchainError::Validation(format!(
            "Invalid URL scheme for '{url_str}': Must be http or https, but got '{other}'"
        ))),
    }
}
