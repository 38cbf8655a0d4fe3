// src/pipeline/download.rs

//! File transfer step of the scraping pipeline.
//!
//! Three transfer paths: direct HTTP for external links, cookie-authenticated
//! HTTP for same-origin file endpoints, and an in-browser download (moved out
//! of a scratch directory) for everything the portal gates behind scripting.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::{Config, FileRecord, TransportHint};
use crate::session::BrowserSession;
use crate::storage::{move_into_place, record_path, save_bytes};
use crate::utils::http::{create_client, fetch_bytes};

const SCRATCH_POLL_MS: u64 = 500;
/// Partial-download suffixes browsers leave while a transfer is running.
const PARTIAL_SUFFIXES: &[&str] = &[".crdownload", ".part", ".tmp"];

/// Per-run transfer tally.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadStats {
    pub total: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DownloadStats {
    pub fn absorb(&mut self, other: DownloadStats) {
        self.total += other.total;
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Scratch directory for in-browser downloads.
///
/// Created fresh under the system temp dir per run and removed on drop, so
/// an interrupted run does not leak partial files.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn create() -> Result<Self> {
        let path = std::env::temp_dir().join(format!(
            "ucursos-scraper-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_millis()
        ));
        std::fs::create_dir_all(&path)?;
        log::debug!("Scratch download directory {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            log::warn!("Could not remove scratch dir {}: {e}", self.path.display());
        }
    }
}

/// Moves one course's file records onto disk.
pub struct Downloader<'a> {
    session: &'a dyn BrowserSession,
    client: reqwest::Client,
    config: &'a Config,
    scratch: &'a Path,
}

impl<'a> Downloader<'a> {
    pub fn new(session: &'a dyn BrowserSession, config: &'a Config, scratch: &'a Path) -> Result<Self> {
        Ok(Self {
            session,
            client: create_client(&config.portal)?,
            config,
            scratch,
        })
    }

    /// Transfer every record into `course_folder`.
    ///
    /// Existing files are skipped without re-fetching, and a single failed
    /// transfer never aborts the batch. Successful transfers are followed by
    /// a short pause so the portal's rate limiting stays quiet; skips pause
    /// nothing.
    pub async fn download_all(&self, course_folder: &Path, files: &[FileRecord]) -> DownloadStats {
        let mut stats = DownloadStats::default();
        for record in files {
            stats.total += 1;
            let target = record_path(course_folder, record);
            if target.exists() {
                log::debug!("Skipping existing {}", target.display());
                stats.skipped += 1;
                continue;
            }

            match self.transfer(record, &target).await {
                Ok(()) => {
                    log::info!("Downloaded {}", target.display());
                    stats.downloaded += 1;
                    tokio::time::sleep(Duration::from_millis(
                        self.config.portal.request_delay_ms,
                    ))
                    .await;
                }
                Err(e) => {
                    log::warn!("{}", AppError::transfer(record.name.as_str(), e));
                    stats.failed += 1;
                }
            }
        }
        stats
    }

    async fn transfer(&self, record: &FileRecord, target: &Path) -> Result<()> {
        match record.transport {
            TransportHint::Direct => {
                let bytes = fetch_bytes(&self.client, &record.download_url, None).await?;
                save_bytes(target, &bytes).await
            }
            TransportHint::Authenticated => {
                let cookies = self.session.cookies().await?;
                let bytes =
                    fetch_bytes(&self.client, &record.download_url, Some(&cookies)).await?;
                save_bytes(target, &bytes).await
            }
            TransportHint::Browser => {
                self.session.trigger_download(&record.download_url).await?;
                let timeout = Duration::from_secs(self.config.portal.download_timeout_secs);
                let completed = wait_for_scratch_file(self.scratch, timeout).await?;
                move_into_place(&completed, target).await
            }
        }
    }
}

/// Poll the scratch directory until a completed download shows up.
///
/// A file still carrying a partial-download suffix does not count. Exceeding
/// the timeout fails this file only.
pub async fn wait_for_scratch_file(scratch: &Path, timeout: Duration) -> Result<PathBuf> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(path) = completed_file(scratch)? {
            return Ok(path);
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(AppError::transfer(
                scratch.display().to_string(),
                format!("no completed download within {}s", timeout.as_secs()),
            ));
        }
        tokio::time::sleep(Duration::from_millis(SCRATCH_POLL_MS)).await;
    }
}

fn completed_file(scratch: &Path) -> Result<Option<PathBuf>> {
    for entry in std::fs::read_dir(scratch)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if PARTIAL_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            continue;
        }
        return Ok(Some(path));
    }
    Ok(None)
}
