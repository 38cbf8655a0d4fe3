// src/utils/http.rs

//! HTTP client utilities for file transfers.
//!
//! The browser session handles navigation; `reqwest` only moves file bytes,
//! either directly (external links) or with the session cookies attached
//! (same-origin links behind authentication).

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};

use crate::error::{AppError, Result};
use crate::models::PortalConfig;

/// Create a configured HTTP client for direct transfers.
pub fn create_client(config: &PortalConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.download_timeout_secs))
        .build()?;
    Ok(client)
}

/// Serialize session cookies into a single `Cookie` header value.
pub fn cookie_header(cookies: &[(String, String)]) -> Result<HeaderValue> {
    let joined = cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ");
    HeaderValue::from_str(&joined)
        .map_err(|e| AppError::config(format!("Invalid cookie header: {e}")))
}

/// Fetch a URL's bytes, optionally attaching session cookies.
pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    cookies: Option<&[(String, String)]>,
) -> Result<Vec<u8>> {
    let mut headers = HeaderMap::new();
    if let Some(cookies) = cookies {
        headers.insert(COOKIE, cookie_header(cookies)?);
    }

    let response = client.get(url).headers(headers).send().await?;
    let response = response.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}
