// src/session/webdriver.rs

//! Chrome-over-WebDriver implementation of [`BrowserSession`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thirtyfour::prelude::*;

use crate::error::{AppError, Result};
use crate::models::{PortalConfig, PortalSelectors};
use crate::session::{BrowserSession, Credentials};

const USERNAME_INPUT: &str = r#"input[name="username"]"#;
const PASSWORD_INPUT: &str = r#"input[name="password"]"#;
const LOGIN_BUTTON: &str = r#"button[type="submit"].boton, button[type="submit"], input[type="submit"]"#;

/// Real browser session driven through a WebDriver endpoint.
pub struct WebDriverSession {
    driver: WebDriver,
}

impl WebDriverSession {
    /// Connect to the WebDriver endpoint and open a browser whose downloads
    /// land in `download_dir` without prompting.
    pub async fn connect(
        config: &PortalConfig,
        headless: bool,
        download_dir: &Path,
    ) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if headless {
            caps.add_arg("--headless=new")?;
        }
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-gpu")?;
        caps.add_arg(&format!("--user-agent={}", config.user_agent))?;
        caps.add_experimental_option(
            "prefs",
            json!({
                "download.default_directory": download_dir.to_string_lossy(),
                "download.prompt_for_download": false,
                "download.directory_upgrade": true,
                // PDFs must download instead of opening in the viewer.
                "plugins.always_open_pdf_externally": true,
            }),
        )?;

        let driver = WebDriver::new(&config.webdriver_url, caps).await?;
        log::debug!("Connected to WebDriver at {}", config.webdriver_url);
        Ok(Self { driver })
    }

    /// Log into the portal and wait for the course listing to confirm the
    /// session.
    pub async fn login(
        &self,
        config: &PortalConfig,
        selectors: &PortalSelectors,
        credentials: &Credentials,
    ) -> Result<()> {
        self.driver.goto(&config.base_url).await?;

        let username = self.driver.find(By::Css(USERNAME_INPUT)).await?;
        username.send_keys(&credentials.username).await?;
        let password = self.driver.find(By::Css(PASSWORD_INPUT)).await?;
        password.send_keys(&credentials.password).await?;
        self.driver.find(By::Css(LOGIN_BUTTON)).await?.click().await?;

        let timeout = Duration::from_secs(config.auth_timeout_secs);
        if self.wait_for(&selectors.course_item, timeout).await? {
            log::info!("Logged in as {}", credentials.username);
            return Ok(());
        }

        // The form sticking around means the portal rejected us. A timeout
        // with the form gone is a logged-in account with no courses.
        let form_present = self
            .driver
            .find_all(By::Css(USERNAME_INPUT))
            .await
            .map(|els| !els.is_empty())
            .unwrap_or(false);
        if form_present {
            return Err(AppError::auth("portal rejected the credentials"));
        }

        log::warn!(
            "Logged in, but no course listing appeared within {}s",
            config.auth_timeout_secs
        );
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn source(&self) -> Result<String> {
        Ok(self.driver.source().await?)
    }

    async fn wait_for(&self, css: &str, timeout: Duration) -> Result<bool> {
        let found = self
            .driver
            .query(By::Css(css))
            .wait(timeout, Duration::from_millis(250))
            .exists()
            .await?;
        Ok(found)
    }

    async fn cookies(&self) -> Result<Vec<(String, String)>> {
        let cookies = self.driver.get_all_cookies().await?;
        Ok(cookies
            .into_iter()
            .map(|c| (c.name, c.value))
            .collect())
    }

    async fn trigger_download(&self, url: &str) -> Result<()> {
        // Chrome converts the navigation into a download; the aborted
        // navigation some drivers report is not an error here.
        if let Err(e) = self.driver.goto(url).await {
            log::debug!("Navigation handed off to download: {e}");
        }
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}
