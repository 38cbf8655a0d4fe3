// src/services/material.rs

//! File extractor for the Material Docente section.
//!
//! Separator rows organize the listing into categories; every item row is
//! keyed by a stable identifier that its download link embeds.

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{FileRecord, PortalSelectors};
use crate::services::{classify_transport, element_text, parse_selector, separator_category};
use crate::utils::resolve_url;

/// Sentinel category for rows that appear before any separator.
const DEFAULT_CATEGORY: &str = "Otros";

/// Extract downloadable files from a Material Docente page.
///
/// A row missing its identifier, filename, size label, or download link is
/// dropped on its own; the rest of the page still parses.
pub fn extract_material_files(
    html: &Html,
    selectors: &PortalSelectors,
    base_url: &Url,
) -> Result<Vec<FileRecord>> {
    let table_sel = parse_selector(&selectors.section_table)?;
    let group_sel = parse_selector(&selectors.table_group)?;
    let row_sel = parse_selector("tr[id]")?;
    let name_sel = parse_selector(&selectors.material_name)?;
    let size_sel = parse_selector(&selectors.material_size)?;

    let Some(table) = html.select(&table_sel).next() else {
        log::debug!("No material table on page");
        return Ok(Vec::new());
    };

    let mut files = Vec::new();
    let mut current_category: Option<String> = None;

    for group in table.select(&group_sel) {
        if let Some(category) = separator_category(&group, selectors)? {
            current_category = Some(category);
            continue;
        }

        for row in group.select(&row_sel) {
            let Some(row_id) = row.value().attr("id") else {
                continue;
            };

            // The download link embeds the row's identifier.
            let link_selector = format!(r#"a[href*="{}"]"#, row_key(row_id));
            let Ok(link_sel) = parse_selector(&link_selector) else {
                log::debug!("Unusable row identifier '{row_id}', row dropped");
                continue;
            };

            let name = row.select(&name_sel).next().map(|el| element_text(&el));
            let size = row.select(&size_sel).next().map(|el| element_text(&el));
            // The detail link under the title can embed the identifier too;
            // the download link is the last match in the row.
            let href = row
                .select(&link_sel)
                .last()
                .and_then(|el| el.value().attr("href"));

            let (Some(name), Some(size), Some(href)) = (name, size, href) else {
                log::debug!("Incomplete material row '{row_id}' dropped");
                continue;
            };
            if name.is_empty() {
                continue;
            }

            let download_url = resolve_url(base_url, href);
            let transport = classify_transport(base_url, &download_url);
            files.push(FileRecord {
                name,
                download_url,
                category: current_category
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                subfolder: None,
                size_label: size,
                transport,
            });
        }
    }

    Ok(files)
}

/// Numeric tail of a row identifier like "material.456"; the full id when
/// it carries no digits.
fn row_key(id: &str) -> &str {
    match id.find(|c: char| c.is_ascii_digit()) {
        Some(i) => &id[i..],
        None => id,
    }
}
