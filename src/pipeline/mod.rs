// src/pipeline/mod.rs

//! Scraping pipeline: course walk, extraction, file transfers, calendar
//! export.

pub mod download;
pub mod scrape;

pub use download::{DownloadStats, Downloader, ScratchDir};
pub use scrape::{run, ScrapeOptions};
