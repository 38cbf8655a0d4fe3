//! Application configuration structures.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::PortalSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Portal endpoints and timing settings
    #[serde(default)]
    pub portal: PortalConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Calendar subscription server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Course name → abbreviated name, used ONLY in calendar event
    /// titles. Folder names and category tags always keep the full name.
    #[serde(default)]
    pub abbreviations: HashMap<String, String>,

    /// CSS selectors for the portal markup
    #[serde(default)]
    pub selectors: PortalSelectors,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if !path.as_ref().exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.portal.base_url.trim().is_empty() {
            return Err(AppError::validation("portal.base_url is empty"));
        }
        if self.portal.webdriver_url.trim().is_empty() {
            return Err(AppError::validation("portal.webdriver_url is empty"));
        }
        if self.portal.auth_timeout_secs == 0 {
            return Err(AppError::validation("portal.auth_timeout_secs must be > 0"));
        }
        if self.portal.download_timeout_secs == 0 {
            return Err(AppError::validation(
                "portal.download_timeout_secs must be > 0",
            ));
        }
        if self.output.root.trim().is_empty() {
            return Err(AppError::validation("output.root is empty"));
        }
        if self.server.port == 0 {
            return Err(AppError::validation("server.port must be > 0"));
        }
        Ok(())
    }

    /// Abbreviated course name for calendar titles, falling back to the
    /// full name when no mapping is configured.
    pub fn abbreviate<'a>(&'a self, course_name: &'a str) -> &'a str {
        self.abbreviations
            .get(course_name)
            .map(String::as_str)
            .unwrap_or(course_name)
    }
}

/// Portal endpoints and timing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal entry URL (also the login page)
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// WebDriver endpoint the browser session connects to
    #[serde(default = "defaults::webdriver_url")]
    pub webdriver_url: String,

    /// User-Agent header for direct HTTP transfers
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Wait for login confirmation, in seconds. Exceeding it with the
    /// login form still present is an authentication failure.
    #[serde(default = "defaults::auth_timeout")]
    pub auth_timeout_secs: u64,

    /// Wait for optional section content, in seconds. Exceeding it means
    /// "table absent", not an error.
    #[serde(default = "defaults::table_timeout")]
    pub table_timeout_secs: u64,

    /// Wait for a browser-triggered download to complete, in seconds
    #[serde(default = "defaults::download_timeout")]
    pub download_timeout_secs: u64,

    /// Settle time after each page navigation, in milliseconds
    #[serde(default = "defaults::page_settle")]
    pub page_settle_ms: u64,

    /// Pause after each successful transfer, in milliseconds. Skipped
    /// files incur no pause.
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            webdriver_url: defaults::webdriver_url(),
            user_agent: defaults::user_agent(),
            auth_timeout_secs: defaults::auth_timeout(),
            table_timeout_secs: defaults::table_timeout(),
            download_timeout_secs: defaults::download_timeout(),
            page_settle_ms: defaults::page_settle(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory of the Course/Category file tree
    #[serde(default = "defaults::output_root")]
    pub root: String,

    /// Calendar file name under the output root
    #[serde(default = "defaults::calendar_file")]
    pub calendar_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: defaults::output_root(),
            calendar_file: defaults::calendar_file(),
        }
    }
}

/// Calendar subscription server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "defaults::server_host")]
    pub host: String,

    /// Port number
    #[serde(default = "defaults::server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::server_host(),
            port: defaults::server_port(),
        }
    }
}

mod defaults {
    pub fn base_url() -> String {
        "https://www.u-cursos.cl".into()
    }
    pub fn webdriver_url() -> String {
        "http://localhost:9515".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; ucursos-scraper/0.1)".into()
    }
    pub fn auth_timeout() -> u64 {
        10
    }
    pub fn table_timeout() -> u64 {
        5
    }
    pub fn download_timeout() -> u64 {
        30
    }
    pub fn page_settle() -> u64 {
        1000
    }
    pub fn request_delay() -> u64 {
        500
    }
    pub fn output_root() -> String {
        "downloads".into()
    }
    pub fn calendar_file() -> String {
        "calendar.ics".into()
    }
    pub fn server_host() -> String {
        "localhost".into()
    }
    pub fn server_port() -> u16 {
        8000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_base_url() {
        let mut config = Config::default();
        config.portal.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.portal.auth_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_abbreviate_falls_back_to_full_name() {
        let mut config = Config::default();
        config
            .abbreviations
            .insert("Bases de Datos".to_string(), "Batos".to_string());

        assert_eq!(config.abbreviate("Bases de Datos"), "Batos");
        assert_eq!(
            config.abbreviate("Análisis Avanzado de Algoritmos"),
            "Análisis Avanzado de Algoritmos"
        );

        // The fallback borrows from the argument, not from the config.
        let name = String::from("Redes");
        assert_eq!(config.abbreviate(&name), "Redes");
    }

    #[test]
    fn test_parse_toml_sections() {
        let toml_str = r#"
            [portal]
            base_url = "https://portal.example"

            [output]
            root = "out"

            [abbreviations]
            "Bases de Datos" = "Batos"

            [selectors]
            term_container = "div#term"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.portal.base_url, "https://portal.example");
        assert_eq!(config.portal.auth_timeout_secs, 10);
        assert_eq!(config.output.root, "out");
        assert_eq!(config.abbreviate("Bases de Datos"), "Batos");
        assert_eq!(config.selectors.term_container, "div#term");
        assert_eq!(config.selectors.course_code, "h2");
    }
}
