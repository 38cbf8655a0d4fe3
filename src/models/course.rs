//! Course data structure.

use serde::{Deserialize, Serialize};

/// A course read from the academic-term listing page.
///
/// Immutable once parsed; the single source of truth for one scraping run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Course {
    /// Course code (e.g. "CC3001-1")
    pub code: String,

    /// Full course name
    pub name: String,

    /// Canonical URL of the course home page
    pub url: String,

    /// Opaque identifier from the listing element (e.g. "curso.123456")
    pub external_id: String,
}

impl Course {
    /// Build the URL for a course section (calendario, tareas, ...).
    pub fn section_url(&self, section: &str) -> String {
        format!("{}/{}/", self.url.trim_end_matches('/'), section)
    }

    /// Case-insensitive substring match against the course name.
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.name.to_lowercase().contains(&filter.to_lowercase())
    }
}

/// The four scrapeable course sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Calendario,
    MaterialDocente,
    Novedades,
    Tareas,
}

impl Section {
    /// All sections, in scraping order.
    pub const ALL: [Section; 4] = [
        Section::Calendario,
        Section::MaterialDocente,
        Section::Novedades,
        Section::Tareas,
    ];

    /// The URL path segment for this section.
    pub fn path(&self) -> &'static str {
        match self {
            Section::Calendario => "calendario",
            Section::MaterialDocente => "material_docente",
            Section::Novedades => "novedades",
            Section::Tareas => "tareas",
        }
    }
}
