//! Turning user input into a queryable hostname

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

use crate::detect::LookupError;

lazy_static! {
    static ref SCHEME_PREFIX: Regex = Regex::new(r"^[a-zA-Z]+://").unwrap();
}

/// Extract the hostname from a raw URL or bare domain
///
/// Input without a `scheme://` prefix is treated as `https://<input>`.
/// Paths, ports, credentials, queries and fragments are dropped; the host
/// comes back lowercased (and punycoded for IDNs) by the URL parser.
pub fn normalize_domain(raw: &str) -> Result<String, LookupError> {
    let trimmed = raw.trim();
    let candidate = if SCHEME_PREFIX.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let invalid = || LookupError::InvalidInput {
        input: raw.to_string(),
    };

    let url = Url::parse(&candidate).map_err(|e| {
        log::debug!("rejecting {:?}: {}", raw, e);
        invalid()
    })?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(host.to_string()),
        _ => Err(invalid()),
    }
}
