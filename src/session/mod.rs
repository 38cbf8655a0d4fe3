// src/session/mod.rs

//! Browser session abstraction.
//!
//! The scraper drives one real browser through WebDriver; extraction and
//! orchestration only see this trait, so tests replay canned page sources
//! without a browser.

pub mod webdriver;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use webdriver::WebDriverSession;

/// Portal login credentials.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One logged-in browser walking the portal.
///
/// Singly owned: navigation state lives in the browser, so concurrent use
/// would corrupt it.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate to a page.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// HTML source of the current page.
    async fn source(&self) -> Result<String>;

    /// Wait until an element matching `css` exists, up to `timeout`.
    /// Returns false on timeout instead of failing.
    async fn wait_for(&self, css: &str, timeout: Duration) -> Result<bool>;

    /// Session cookies, for handing the authenticated session to an HTTP
    /// client.
    async fn cookies(&self) -> Result<Vec<(String, String)>>;

    /// Navigate to a URL the browser will treat as a file download.
    async fn trigger_download(&self, url: &str) -> Result<()>;

    /// Quit the browser.
    async fn close(self: Box<Self>) -> Result<()>;
}
