// src/storage/layout.rs

//! On-disk layout for downloaded course material.
//!
//! Layout is `root/<course>/<category>/[subfolder/]<file>`. Placement is
//! additive: existing folders are reused, never renamed or removed, so a
//! tree built before an abbreviation was configured keeps working.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{Course, FileRecord};
use crate::utils::sanitize_component;

/// Folder bookkeeping for one scrape run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FolderStats {
    pub created: usize,
    pub existing: usize,
}

/// Pick the on-disk folder for a course.
///
/// An existing folder wins over creating a new one, and the configured
/// abbreviation wins over the full course name. In order: existing
/// abbreviated folder, existing full-name folder, new abbreviated folder,
/// new full-name folder.
pub fn resolve_course_folder(root: &Path, course_name: &str, abbrev: Option<&str>) -> PathBuf {
    let abbrev_dir = abbrev.map(sanitize_component);
    let full_dir = sanitize_component(course_name);

    if let Some(dir) = &abbrev_dir {
        if root.join(dir).is_dir() {
            return root.join(dir);
        }
    }
    if root.join(&full_dir).is_dir() {
        return root.join(full_dir);
    }
    root.join(abbrev_dir.unwrap_or(full_dir))
}

/// Create the per-course folders under `root`, reusing any that exist.
pub fn ensure_course_folders(
    root: &Path,
    courses: &[Course],
    abbrev_for: impl Fn(&str) -> Option<String>,
) -> Result<FolderStats> {
    std::fs::create_dir_all(root)?;

    let mut stats = FolderStats::default();
    for course in courses {
        let folder = resolve_course_folder(root, &course.name, abbrev_for(&course.name).as_deref());
        if folder.is_dir() {
            stats.existing += 1;
        } else {
            std::fs::create_dir_all(&folder)?;
            stats.created += 1;
            log::info!("Created course folder {}", folder.display());
        }
    }
    Ok(stats)
}

/// Pre-create the category subfolders inside a course folder, tallying how
/// many already existed.
pub fn ensure_category_folders(course_folder: &Path, categories: &[String]) -> Result<FolderStats> {
    let mut stats = FolderStats::default();
    for category in categories {
        let folder = course_folder.join(sanitize_component(category));
        if folder.is_dir() {
            stats.existing += 1;
        } else {
            std::fs::create_dir_all(&folder)?;
            stats.created += 1;
        }
    }
    Ok(stats)
}

/// Final path for a downloaded file inside its course folder.
pub fn record_path(course_folder: &Path, record: &FileRecord) -> PathBuf {
    let mut path = course_folder.join(sanitize_component(&record.category));
    if let Some(subfolder) = &record.subfolder {
        path = path.join(sanitize_component(subfolder));
    }
    path.join(sanitize_component(&record.name))
}
