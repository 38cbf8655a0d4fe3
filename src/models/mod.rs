// src/models/mod.rs

//! Domain models for the scraper application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod course;
mod event;
mod file;
mod selectors;

// Re-export all public types
pub use config::{Config, OutputConfig, PortalConfig, ServerConfig};
pub use course::{Course, Section};
pub use event::{
    naive_from_timestamp, CompletionState, ControlEvent, EventSet, SubmissionState, TareaEvent,
};
pub use file::{FileRecord, TransportHint};
pub use selectors::PortalSelectors;
