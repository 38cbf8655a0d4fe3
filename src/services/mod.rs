//! Section extractors for the scraper application.
//!
//! Each submodule turns one section's rendered markup into typed records:
//! - Course listing (`courses`)
//! - Control events from Calendario (`calendario`)
//! - Assignment deadlines from Tareas (`tareas`)
//! - Teaching material files (`material`)
//! - Announcement attachments from Novedades (`novedades`)
//!
//! Extractors are pure functions of a parsed page snapshot; navigation and
//! waits belong to the pipeline layer.

mod calendario;
mod courses;
mod material;
mod novedades;
mod tareas;

pub use calendario::extract_control_events;
pub use courses::extract_courses;
pub use material::extract_material_files;
pub use novedades::{extract_novedades, novedades_page_indices};
pub use tareas::extract_tarea_events;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{PortalSelectors, TransportHint};

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Collect an element's text with whitespace normalized.
pub(crate) fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Category named by a separator row, if this table group is a separator.
///
/// Prefers the category attribute; falls back to the label cell text.
pub(crate) fn separator_category(
    group: &ElementRef,
    selectors: &PortalSelectors,
) -> Result<Option<String>> {
    let separator_sel = parse_selector(&selectors.separator_row)?;
    let Some(separator) = group.select(&separator_sel).next() else {
        return Ok(None);
    };

    if let Some(category) = separator.value().attr(&selectors.category_attr) {
        let category = category.trim();
        if !category.is_empty() {
            return Ok(Some(category.to_string()));
        }
    }

    let label_sel = parse_selector(&selectors.separator_label)?;
    let label = separator
        .select(&label_sel)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    Ok(Some(label))
}

/// Decide how a file link's bytes should be transferred.
///
/// External links are fetched directly. Same-origin links with a plain file
/// extension go through the authenticated HTTP client; same-origin download
/// endpoints without one need the browser to trigger the transfer.
pub(crate) fn classify_transport(base: &Url, url_str: &str) -> TransportHint {
    if !crate::utils::same_origin(base, url_str) {
        return TransportHint::Direct;
    }

    let path = Url::parse(url_str)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url_str.split(['?', '#']).next().unwrap_or("").to_string());

    let has_extension = path
        .rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(stem, ext)| !stem.is_empty() && !ext.is_empty() && ext.len() <= 5)
        .unwrap_or(false);

    if has_extension {
        TransportHint::Authenticated
    } else {
        TransportHint::Browser
    }
}
