//! Utility functions and helpers.

pub mod http;
pub mod time;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Whether a link shares the origin (host) of the base URL.
///
/// Cross-origin announcement links are ignored during extraction.
pub fn same_origin(base: &Url, url_str: &str) -> bool {
    match Url::parse(url_str) {
        Ok(u) => u.host_str() == base.host_str(),
        // Relative links stay on the origin by definition.
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Sanitize a path component (course name, category, subfolder, filename).
///
/// Filesystem-invalid characters become `_` and embedded whitespace runs
/// collapse to a single `_`. Applied uniformly to every on-disk name so the
/// placement resolver and the download step always agree.
pub fn sanitize_component(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect();
    replaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Filename stem (name minus the final extension).
pub fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}
