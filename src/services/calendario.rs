// src/services/calendario.rs

//! Control event extractor for the Calendario section.
//!
//! The calendar table is a sequence of groups; a separator group names the
//! category for every following data group. Only rows under the "Control"
//! category become events, every other category is skipped entirely.

use std::collections::HashSet;

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::{naive_from_timestamp, ControlEvent, Course, PortalSelectors};
use crate::services::{element_text, parse_selector, separator_category};
use crate::utils::resolve_url;
use crate::utils::time::parse_time_range;

/// Category whose rows are extracted; all others are skipped.
const CONTROL_CATEGORY: &str = "Control";

/// Extract Control events from a course's Calendario page.
///
/// The same event often appears nested in several table groups, so duplicate
/// (title, timestamp, time-range) keys within one pass are discarded. Rows
/// whose companion text fails the "(H:MM - H:MM)" pattern are dropped
/// silently.
pub fn extract_control_events(
    html: &Html,
    selectors: &PortalSelectors,
    course: &Course,
    base_url: &Url,
) -> Result<Vec<ControlEvent>> {
    let table_sel = parse_selector(&selectors.section_table)?;
    let group_sel = parse_selector(&selectors.table_group)?;
    let row_sel = parse_selector("tr")?;
    let cell_sel = parse_selector(&selectors.event_cell)?;
    let title_sel = parse_selector(&selectors.title_link)?;
    let time_sel = parse_selector(&selectors.time_range)?;

    let Some(table) = html.select(&table_sel).next() else {
        log::debug!("No calendar table for {}", course.code);
        return Ok(Vec::new());
    };

    let mut events = Vec::new();
    let mut seen: HashSet<(String, i64, String)> = HashSet::new();

    // Running category accumulator over groups in document order.
    let mut current_category: Option<String> = None;

    for group in table.select(&group_sel) {
        if let Some(category) = separator_category(&group, selectors)? {
            current_category = Some(category);
            continue;
        }

        if current_category.as_deref() != Some(CONTROL_CATEGORY) {
            continue;
        }

        for row in group.select(&row_sel) {
            let Some(cell) = row.select(&cell_sel).next() else {
                continue;
            };

            let Some(timestamp) = cell
                .value()
                .attr(&selectors.timestamp_attr)
                .and_then(|v| v.trim().parse::<i64>().ok())
            else {
                continue;
            };
            let Some(event_date) = naive_from_timestamp(timestamp) else {
                continue;
            };

            let Some(title_link) = cell.select(&title_sel).next() else {
                continue;
            };
            let title = element_text(&title_link);
            let url = title_link
                .value()
                .attr("href")
                .map(|href| resolve_url(base_url, href))
                .unwrap_or_default();

            let Some(time_text) = cell.select(&time_sel).next().map(|el| element_text(&el))
            else {
                continue;
            };
            let Some(range) = parse_time_range(&time_text) else {
                continue;
            };

            // Start and end share the calendar date of the origin timestamp.
            let date = event_date.date();
            let (Some(start_time), Some(end_time)) = (
                date.and_hms_opt(range.start_hour, range.start_minute, 0),
                date.and_hms_opt(range.end_hour, range.end_minute, 0),
            ) else {
                continue;
            };
            if end_time <= start_time {
                continue;
            }
            let duration_minutes = (end_time - start_time).num_minutes();

            let event = ControlEvent {
                title,
                course_code: course.code.clone(),
                course_name: course.name.clone(),
                origin_timestamp: timestamp,
                start_time,
                end_time,
                duration_minutes,
                url,
            };

            if seen.insert(event.dedup_key()) {
                events.push(event);
            }
        }
    }

    Ok(events)
}
