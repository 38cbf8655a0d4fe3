// src/storage/mod.rs

//! File system persistence for downloaded material.

pub mod layout;

use std::path::Path;

use crate::error::Result;

pub use layout::{
    ensure_category_folders, ensure_course_folders, record_path, resolve_course_folder, FolderStats,
};

/// Write downloaded bytes to their final path, creating parent folders.
pub async fn save_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    log::debug!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Move a file that a browser download dropped in the scratch directory to
/// its final path. Falls back to copy-and-remove across filesystems.
pub async fn move_into_place(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    match tokio::fs::rename(source, target).await {
        Ok(()) => Ok(()),
        Err(_) => {
            tokio::fs::copy(source, target).await?;
            tokio::fs::remove_file(source).await?;
            Ok(())
        }
    }
}
