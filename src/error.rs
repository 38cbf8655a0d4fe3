// src/error.rs

//! Unified error handling for the scraper application.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Authentication failed (bad credentials or login timeout).
    ///
    /// Fatal: aborts the whole run.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Expected DOM structure was absent. Recovered locally as
    /// "section/row skipped".
    #[error("Element not found for '{selector}' in {context}")]
    ElementNotFound { selector: String, context: String },

    /// A file transfer failed or timed out. Recorded as a per-file
    /// outcome, never fatal to the run.
    #[error("Transfer error for {name}: {message}")]
    Transfer { name: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebDriver command failed
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Calendar server error
    #[error("Server error: {0}")]
    Server(String),
}

impl AppError {
    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create an element-not-found error with context.
    pub fn element_not_found(selector: impl Into<String>, context: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
            context: context.into(),
        }
    }

    /// Create a transfer error for a named file.
    pub fn transfer(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transfer {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error must abort the whole run.
    ///
    /// Only authentication failure and output-root failure are fatal; the
    /// latter is raised as `Config` before any course loop runs.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Config(_))
    }
}
