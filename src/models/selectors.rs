// src/models/selectors.rs

//! CSS selectors for scraping the portal pages.
//!
//! Every selector is overridable from `config.toml` so a portal markup
//! change does not require a rebuild.

use serde::{Deserialize, Serialize};

/// CSS selectors for the portal's section pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSelectors {
    /// Container of the current academic term's course listing.
    /// Sibling containers (communities, institutions) are ignored.
    #[serde(default = "defaults::term_container")]
    pub term_container: String,

    /// One course element inside the term container
    #[serde(default = "defaults::course_item")]
    pub course_item: String,

    /// The course's canonical link within a course element
    #[serde(default = "defaults::course_link")]
    pub course_link: String,

    /// The course name element within a course element
    #[serde(default = "defaults::course_name")]
    pub course_name: String,

    /// The course code element within a course element
    #[serde(default = "defaults::course_code")]
    pub course_code: String,

    /// Section table holding separator/data groups
    #[serde(default = "defaults::section_table")]
    pub section_table: String,

    /// One group (separator or data) within a section table
    #[serde(default = "defaults::table_group")]
    pub table_group: String,

    /// A separator row establishing the current category
    #[serde(default = "defaults::separator_row")]
    pub separator_row: String,

    /// The label cell within a separator row
    #[serde(default = "defaults::separator_label")]
    pub separator_label: String,

    /// Attribute carrying a separator's category name, when present
    #[serde(default = "defaults::category_attr")]
    pub category_attr: String,

    /// Calendar event cell within a data row
    #[serde(default = "defaults::event_cell")]
    pub event_cell: String,

    /// Attribute carrying a row's origin Unix timestamp
    #[serde(default = "defaults::timestamp_attr")]
    pub timestamp_attr: String,

    /// Event/assignment title link
    #[serde(default = "defaults::title_link")]
    pub title_link: String,

    /// Companion text element carrying the "(H:MM - H:MM)" time range
    #[serde(default = "defaults::time_range")]
    pub time_range: String,

    /// Timestamp sub-elements of a tarea row (start, deadline, late)
    #[serde(default = "defaults::tarea_timestamp")]
    pub tarea_timestamp: String,

    /// Submission status indicator within a tarea row
    #[serde(default = "defaults::tarea_status")]
    pub tarea_status: String,

    /// Filename element within a material row
    #[serde(default = "defaults::material_name")]
    pub material_name: String,

    /// Size label element within a material row
    #[serde(default = "defaults::material_size")]
    pub material_size: String,

    /// One announcement post block on the Novedades page
    #[serde(default = "defaults::post_block")]
    pub post_block: String,

    /// Candidate attachment links within a post block
    #[serde(default = "defaults::post_link")]
    pub post_link: String,

    /// Page-index links of the pagination widget
    #[serde(default = "defaults::page_list")]
    pub page_list: String,
}

impl Default for PortalSelectors {
    fn default() -> Self {
        Self {
            term_container: defaults::term_container(),
            course_item: defaults::course_item(),
            course_link: defaults::course_link(),
            course_name: defaults::course_name(),
            course_code: defaults::course_code(),
            section_table: defaults::section_table(),
            table_group: defaults::table_group(),
            separator_row: defaults::separator_row(),
            separator_label: defaults::separator_label(),
            category_attr: defaults::category_attr(),
            event_cell: defaults::event_cell(),
            timestamp_attr: defaults::timestamp_attr(),
            title_link: defaults::title_link(),
            time_range: defaults::time_range(),
            tarea_timestamp: defaults::tarea_timestamp(),
            tarea_status: defaults::tarea_status(),
            material_name: defaults::material_name(),
            material_size: defaults::material_size(),
            post_block: defaults::post_block(),
            post_link: defaults::post_link(),
            page_list: defaults::page_list(),
        }
    }
}

mod defaults {
    pub fn term_container() -> String {
        "div#cursos".into()
    }
    pub fn course_item() -> String {
        r#"li[id^="curso."]"#.into()
    }
    pub fn course_link() -> String {
        "a[title]".into()
    }
    pub fn course_name() -> String {
        "h1 span".into()
    }
    pub fn course_code() -> String {
        "h2".into()
    }
    pub fn section_table() -> String {
        "table.sortable".into()
    }
    pub fn table_group() -> String {
        "tbody".into()
    }
    pub fn separator_row() -> String {
        "tr.separador".into()
    }
    pub fn separator_label() -> String {
        "td".into()
    }
    pub fn category_attr() -> String {
        "data-categoria".into()
    }
    pub fn event_cell() -> String {
        "td.string".into()
    }
    pub fn timestamp_attr() -> String {
        "rel".into()
    }
    pub fn title_link() -> String {
        "h1 a".into()
    }
    pub fn time_range() -> String {
        "h2".into()
    }
    pub fn tarea_timestamp() -> String {
        "td[rel]".into()
    }
    pub fn tarea_status() -> String {
        "td.estado".into()
    }
    pub fn material_name() -> String {
        "h1 a".into()
    }
    pub fn material_size() -> String {
        "td.tamano".into()
    }
    pub fn post_block() -> String {
        "div.post".into()
    }
    pub fn post_link() -> String {
        "a[href]".into()
    }
    pub fn page_list() -> String {
        "ul.paginas a".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_default_selectors_parse() {
        let s = PortalSelectors::default();
        for sel in [
            &s.term_container,
            &s.course_item,
            &s.course_link,
            &s.course_name,
            &s.course_code,
            &s.section_table,
            &s.table_group,
            &s.separator_row,
            &s.separator_label,
            &s.event_cell,
            &s.title_link,
            &s.time_range,
            &s.tarea_timestamp,
            &s.tarea_status,
            &s.material_name,
            &s.material_size,
            &s.post_block,
            &s.post_link,
            &s.page_list,
        ] {
            assert!(Selector::parse(sel).is_ok(), "selector failed: {sel}");
        }
    }
}
